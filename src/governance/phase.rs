//! Deployment phase lifecycle and operation gating.
//!
//! Phases order by protectedness: DEV → ALPHA → BETA → GA → PROD, plus the
//! terminal ARCHIVED. Phasegate implements no promotion transitions — any
//! phase may be written by registration or an explicit `set-phase` call.
//! The contract enforced here is solely: given a phase, which operations
//! are permitted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    /// The only phase permitting in-place mutation. New artifacts start here.
    #[default]
    Dev,
    Alpha,
    Beta,
    Ga,
    Prod,
    /// Terminal. Not even clonable; resurrect by creating a new DEV copy.
    Archived,
}

/// Operations gated by the lifecycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Edit the artifact in place.
    Mutate,
    /// Copy into a new DEV artifact.
    Clone,
    /// Remove the artifact. Blocked in every phase.
    Delete,
}

impl Phase {
    pub const PROTECTED: [Phase; 4] = [Phase::Alpha, Phase::Beta, Phase::Ga, Phase::Prod];

    /// Immutable-in-place but clonable.
    pub fn is_protected(self) -> bool {
        Self::PROTECTED.contains(&self)
    }

    /// Operation legality table.
    pub fn permits(self, op: Operation) -> bool {
        match op {
            Operation::Mutate => self == Phase::Dev,
            Operation::Clone => self != Phase::Archived,
            Operation::Delete => false,
        }
    }

    /// Comma-separated protected phase names, for block messages.
    pub fn protected_list() -> String {
        Self::PROTECTED
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Dev => "DEV",
            Phase::Alpha => "ALPHA",
            Phase::Beta => "BETA",
            Phase::Ga => "GA",
            Phase::Prod => "PROD",
            Phase::Archived => "ARCHIVED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Phase, String> {
        match s.to_ascii_uppercase().as_str() {
            "DEV" => Ok(Phase::Dev),
            "ALPHA" => Ok(Phase::Alpha),
            "BETA" => Ok(Phase::Beta),
            "GA" => Ok(Phase::Ga),
            "PROD" => Ok(Phase::Prod),
            "ARCHIVED" => Ok(Phase::Archived),
            other => Err(format!(
                "unknown phase '{}' (expected DEV, ALPHA, BETA, GA, PROD or ARCHIVED)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 6] = [
        Phase::Dev,
        Phase::Alpha,
        Phase::Beta,
        Phase::Ga,
        Phase::Prod,
        Phase::Archived,
    ];

    #[test]
    fn test_mutate_only_in_dev() {
        for p in ALL {
            assert_eq!(p.permits(Operation::Mutate), p == Phase::Dev);
        }
    }

    #[test]
    fn test_clone_everywhere_but_archived() {
        for p in ALL {
            assert_eq!(p.permits(Operation::Clone), p != Phase::Archived);
        }
    }

    #[test]
    fn test_delete_never_permitted() {
        for p in ALL {
            assert!(!p.permits(Operation::Delete));
        }
    }

    #[test]
    fn test_protected_set() {
        assert!(!Phase::Dev.is_protected());
        assert!(Phase::Prod.is_protected());
        assert!(!Phase::Archived.is_protected());
    }

    #[test]
    fn test_phase_round_trip() {
        for p in ALL {
            assert_eq!(p.to_string().parse::<Phase>().unwrap(), p);
        }
        assert!("STAGING".parse::<Phase>().is_err());
    }

    #[test]
    fn test_yaml_repr_is_uppercase() {
        let s = serde_yaml::to_string(&Phase::Prod).unwrap();
        assert_eq!(s.trim(), "PROD");
    }
}
