//! Diagnostic stream for hook debugging.
//!
//! Every governance check writes one structured line here: component name,
//! decision inputs, decision outcome. The stream is telemetry only — a
//! failure to write must never change a governance decision, so every
//! error on this path is swallowed.

use crate::core::store::Store;
use crate::core::time;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::PathBuf;

#[derive(Serialize, Debug)]
struct DiagLine<'a> {
    ts: String,
    event_id: String,
    component: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

/// Handle on the process-wide diagnostic log.
#[derive(Debug, Clone)]
pub struct Diag {
    path: PathBuf,
}

impl Diag {
    pub fn new(store: &Store) -> Self {
        Self {
            path: store.diag_log_path(),
        }
    }

    /// Append one diagnostic line. Never fails.
    pub fn log(&self, component: &str, message: &str, data: Option<JsonValue>) {
        use std::fs::OpenOptions;
        use std::io::Write;

        let line = DiagLine {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            component,
            message,
            data,
        };

        let Ok(json) = serde_json::to_string(&line) else {
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
