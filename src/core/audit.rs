//! Append-only deployment log.
//!
//! One JSON object per observed mutation attempt, independent of the
//! governance decision and never referencing the governance document.
//! The log is never read by any component; its purpose is historical
//! reconstruction only.

use crate::core::store::Store;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeployEvent {
    pub ts: String,
    /// "create" or "update".
    pub action: String,
    pub name: String,
    pub id: Option<String>,
    pub success: bool,
}

impl DeployEvent {
    /// Build an entry from an observed post-hook outcome. An errored
    /// output is never a success; a create whose output hands back no id
    /// produced nothing trackable. Updates carry no id requirement.
    pub fn observed(action: &str, name: &str, id: Option<String>, has_error: bool) -> DeployEvent {
        let success = !has_error && (action != "create" || id.is_some());
        DeployEvent {
            ts: time::now_epoch_z(),
            action: action.to_string(),
            name: if name.is_empty() {
                "unnamed".to_string()
            } else {
                name.to_string()
            },
            id,
            success,
        }
    }
}

/// Appender for the deployment log.
pub struct DeployLog {
    path: PathBuf,
}

impl DeployLog {
    pub fn new(store: &Store) -> Self {
        Self {
            path: store.deploy_log_path(),
        }
    }

    /// Append one entry. Existing lines are never rewritten or truncated,
    /// and the log is never read back. Write failures are swallowed:
    /// the mutation this entry records has already happened externally.
    pub fn append(&self, event: &DeployEvent) {
        use std::fs::OpenOptions;
        use std::io::Write;

        let Ok(json) = serde_json::to_string(event) else {
            return;
        };
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{}", json);
        }
    }
}
