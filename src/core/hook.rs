//! Hook invocation envelope.
//!
//! An external orchestrating host intercepts artifact-mutation tool calls
//! and invokes Phasegate once per call: one JSON request on stdin, one JSON
//! response on stdout, exit code 0 (allow/neutral) or 2 (block).
//!
//! The triggering `(event, tool name)` pair is classified into a typed
//! [`HookOp`] exactly once, here at the boundary. Nothing downstream
//! matches on tool-name strings.

use crate::governance::engine::Decision;
use crate::governance::kind::ArtifactKind;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::io::Read;

/// Request envelope delivered once per invocation.
///
/// Fields beyond these are ignored. A missing or unparseable envelope
/// degrades to the empty default, which classifies as [`HookOp::Observe`]
/// and produces a neutral allow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookRequest {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Proposed mutation parameters (`id`, `name`, body fields per kind).
    #[serde(default)]
    pub tool_input: JsonValue,
    /// Result of an already-executed operation, present for post-hooks.
    #[serde(default)]
    pub tool_output: JsonValue,
}

impl HookRequest {
    /// Read the envelope from a stream. Malformed input yields the empty
    /// default request rather than an error: the invocation proceeds as a
    /// no-op allow.
    pub fn read_from<R: Read>(reader: &mut R) -> HookRequest {
        let mut buf = String::new();
        if reader.read_to_string(&mut buf).is_err() {
            return HookRequest::default();
        }
        serde_json::from_str(&buf).unwrap_or_default()
    }
}

/// Hook firing point, as named by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
}

impl HookEvent {
    /// Hosts send `PreToolUse` / `PostToolUse`; anything else is treated
    /// as a pre-hook, matching the original default.
    pub fn parse(s: &str) -> HookEvent {
        if s.eq_ignore_ascii_case("PostToolUse") {
            HookEvent::PostToolUse
        } else {
            HookEvent::PreToolUse
        }
    }
}

/// Typed governance operation, determined once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOp {
    PreCreate,
    PreUpdate,
    PreDelete,
    PostCreate,
    PostUpdate,
    /// Not a governed mutation; pass through with a neutral allow.
    Observe,
}

/// Classify an `(event, tool name)` pair into a [`HookOp`].
pub fn classify(event: HookEvent, tool_name: &str) -> HookOp {
    let tool = tool_name.to_ascii_lowercase();
    let create = tool.contains("create_workflow") || tool.contains("create_agent");
    let update = tool.contains("update");
    let delete = tool.contains("delete");

    match event {
        HookEvent::PreToolUse => {
            if create {
                HookOp::PreCreate
            } else if update {
                HookOp::PreUpdate
            } else if delete {
                HookOp::PreDelete
            } else {
                HookOp::Observe
            }
        }
        HookEvent::PostToolUse => {
            if create {
                HookOp::PostCreate
            } else if update {
                HookOp::PostUpdate
            } else {
                HookOp::Observe
            }
        }
    }
}

/// Infer which artifact kind a tool operates on. `--kind` overrides this.
pub fn kind_for_tool(tool_name: &str) -> ArtifactKind {
    if tool_name.to_ascii_lowercase().contains("agent") {
        ArtifactKind::Agent
    } else {
        ArtifactKind::Workflow
    }
}

/// Response envelope written once to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookResponse {
    /// `false` blocks the intercepted tool call.
    #[serde(rename = "continue")]
    pub continue_: bool,
    /// Human-readable advisory or rejection reason.
    #[serde(rename = "systemMessage", skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

impl HookResponse {
    pub fn allow() -> HookResponse {
        HookResponse {
            continue_: true,
            system_message: None,
        }
    }

    /// Process exit code convention: 0 = allow/neutral, 2 = block.
    pub fn exit_code(&self) -> i32 {
        if self.continue_ { 0 } else { 2 }
    }
}

impl From<Decision> for HookResponse {
    fn from(d: Decision) -> HookResponse {
        HookResponse {
            continue_: d.allow,
            system_message: d.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pre_ops() {
        let e = HookEvent::PreToolUse;
        assert_eq!(classify(e, "mcp__n8n__n8n_create_workflow"), HookOp::PreCreate);
        assert_eq!(classify(e, "n8n_update_partial_workflow"), HookOp::PreUpdate);
        assert_eq!(classify(e, "n8n_delete_workflow"), HookOp::PreDelete);
        assert_eq!(classify(e, "n8n_get_workflow"), HookOp::Observe);
        assert_eq!(
            classify(e, "mcp__elevenlabs-mcp__create_agent"),
            HookOp::PreCreate
        );
    }

    #[test]
    fn test_classify_post_ops() {
        let e = HookEvent::PostToolUse;
        assert_eq!(classify(e, "n8n_create_workflow"), HookOp::PostCreate);
        assert_eq!(classify(e, "n8n_update_full_workflow"), HookOp::PostUpdate);
        // Deletion has no post-hook: the pre-hook always blocks it.
        assert_eq!(classify(e, "n8n_delete_workflow"), HookOp::Observe);
    }

    #[test]
    fn test_kind_inference() {
        assert_eq!(kind_for_tool("n8n_create_workflow"), ArtifactKind::Workflow);
        assert_eq!(kind_for_tool("create_agent"), ArtifactKind::Agent);
    }

    #[test]
    fn test_malformed_request_degrades_to_default() {
        let mut bad = "{not json".as_bytes();
        let req = HookRequest::read_from(&mut bad);
        assert!(req.tool_name.is_none());
        assert!(req.tool_input.is_null());
    }

    #[test]
    fn test_response_exit_codes() {
        assert_eq!(HookResponse::allow().exit_code(), 0);
        let block = HookResponse {
            continue_: false,
            system_message: Some("blocked".into()),
        };
        assert_eq!(block.exit_code(), 2);
    }
}
