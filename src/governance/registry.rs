//! Governance document: the durable mapping from artifact id to lifecycle
//! metadata.
//!
//! One YAML document per artifact kind, versioned alongside the project so
//! diffs stay reviewable. The engine exclusively owns writes; readers get a
//! snapshot. Load and save never propagate errors — a missing or corrupt
//! document degrades to the empty default, and a failed save reports
//! `false` (the external mutation it records has already happened).

use crate::core::diag::Diag;
use crate::core::time;
use crate::governance::phase::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryEntry {
    pub action: String,
    pub phase: Phase,
    pub timestamp: String,
}

/// One governed artifact. The id is the map key; it is assigned by the
/// external system at creation time and immutable afterwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ArtifactRecord {
    pub name: String,
    pub phase: Phase,
    #[serde(default)]
    pub description: String,
    /// Leading slice of the artifact body (workflow summary, system prompt).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_snippet: String,
    pub created: String,
    pub modified: String,
    /// Append-only. Never truncated or rewritten.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ArtifactRecord {
    pub fn new(name: &str, description: &str) -> ArtifactRecord {
        let now = time::now_epoch_z();
        ArtifactRecord {
            name: name.to_string(),
            phase: Phase::Dev,
            description: description.to_string(),
            content_snippet: String::new(),
            created: now.clone(),
            modified: now.clone(),
            history: vec![HistoryEntry {
                action: "created".to_string(),
                phase: Phase::Dev,
                timestamp: now,
            }],
        }
    }

    /// Free text the similarity matcher runs against.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.content_snippet)
    }
}

/// Full governance document for one artifact kind.
///
/// `BTreeMap` keeps serialization deterministic and makes "first match"
/// mean lowest id in lexicographic order, both for the name-fallback
/// lookup and for similarity tie-breaks.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GovernanceDoc {
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactRecord>,
}

/// Handle on one kind's governance document.
pub struct Registry {
    path: PathBuf,
    diag: Diag,
}

impl Registry {
    pub fn new(path: PathBuf, diag: Diag) -> Registry {
        Registry { path, diag }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the document. Missing file, unreadable file, and malformed
    /// YAML all yield the empty default; read failures are logged to the
    /// diagnostic stream and never surfaced.
    pub fn load(&self) -> GovernanceDoc {
        if !self.path.exists() {
            return GovernanceDoc::default();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                self.diag.log(
                    "registry",
                    "failed to read governance document",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                return GovernanceDoc::default();
            }
        };
        match serde_yaml::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                self.diag.log(
                    "registry",
                    "malformed governance document, substituting empty default",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                GovernanceDoc::default()
            }
        }
    }

    /// Write the full document back. Creates the file (and parents) on
    /// first write. Returns `false` on failure, never errors.
    pub fn save(&self, doc: &GovernanceDoc) -> bool {
        let yaml = match serde_yaml::to_string(doc) {
            Ok(y) => y,
            Err(e) => {
                self.diag.log(
                    "registry",
                    "failed to serialize governance document",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                return false;
            }
        };
        if let Some(parent) = self.path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return false;
            }
        }
        match std::fs::write(&self.path, yaml) {
            Ok(()) => true,
            Err(e) => {
                self.diag.log(
                    "registry",
                    "failed to save governance document",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                false
            }
        }
    }
}
