//! Store abstraction for Phasegate's on-disk state.
//!
//! All governed state lives under a single `.phasegate/` directory at the
//! project root: one governance document per artifact kind, an append-only
//! deployment log, and a diagnostic log for hook debugging.

use crate::governance::kind::ArtifactKind;
use std::path::{Path, PathBuf};

/// Store handle representing a resolved `.phasegate/` workspace.
///
/// The store is the only shared mutable resource in the system. Each hook
/// invocation reads the relevant document fully, mutates in memory, and
/// writes it back fully. Concurrent invocations are last-writer-wins.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the `.phasegate/` directory.
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Governance document for one artifact kind, e.g. `data/workflows.governance.yaml`.
    pub fn governance_path(&self, kind: ArtifactKind) -> PathBuf {
        self.data_dir().join(kind.governance_file())
    }

    /// Append-only deployment log, one JSON object per line.
    pub fn deploy_log_path(&self) -> PathBuf {
        self.data_dir().join("deploy.events.jsonl")
    }

    /// Diagnostic stream for hook debugging. Best-effort only.
    pub fn diag_log_path(&self) -> PathBuf {
        self.logs_dir().join("hooks.log.jsonl")
    }
}
