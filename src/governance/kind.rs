//! Artifact kind configuration.
//!
//! The same engine governs two external resource types that differ only in
//! field names and terminology: orchestration workflows and conversational
//! voice agents. One tagged configuration enum carries those differences;
//! there is no per-kind engine.

use clap::ValueEnum;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArtifactKind {
    /// Automation workflow (n8n-style node graph).
    Workflow,
    /// Conversational voice agent (system-prompt driven).
    Agent,
}

impl ArtifactKind {
    /// Governance document file name under the store's `data/` directory.
    pub fn governance_file(self) -> &'static str {
        match self {
            ArtifactKind::Workflow => "workflows.governance.yaml",
            ArtifactKind::Agent => "agents.governance.yaml",
        }
    }

    /// Lowercase noun used in advisory and block messages.
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Workflow => "workflow",
            ArtifactKind::Agent => "agent",
        }
    }

    /// Message prefix, mirroring the per-kind hook banners.
    pub fn banner(self) -> &'static str {
        match self {
            ArtifactKind::Workflow => "GOVERNANCE",
            ArtifactKind::Agent => "AGENT GOVERNANCE",
        }
    }

    /// Diagnostic component name.
    pub fn component(self) -> &'static str {
        match self {
            ArtifactKind::Workflow => "workflow-governance",
            ArtifactKind::Agent => "agent-governance",
        }
    }

    /// Descriptive text carried by the proposed mutation's `tool_input`.
    /// Workflows describe themselves; agents carry a system prompt.
    pub fn content_text(self, tool_input: &JsonValue) -> String {
        let field = match self {
            ArtifactKind::Workflow => "description",
            ArtifactKind::Agent => "system_prompt",
        };
        tool_input
            .get(field)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Extract the externally-assigned artifact id from a post-hook
    /// `tool_output`. Workflow hosts return structured ids; agent hosts
    /// bury the id inside free text.
    pub fn extract_id(self, tool_output: &JsonValue) -> Option<String> {
        match self {
            ArtifactKind::Workflow => tool_output
                .get("id")
                .or_else(|| tool_output.get("workflow").and_then(|w| w.get("id")))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            ArtifactKind::Agent => {
                static AGENT_ID: OnceLock<Regex> = OnceLock::new();
                let re = AGENT_ID
                    .get_or_init(|| Regex::new(r"(?i)agent_[a-z0-9]+").expect("static regex"));
                let text = tool_output.get("text").and_then(|v| v.as_str())?;
                re.find(text).map(|m| m.as_str().to_string())
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_id_extraction() {
        let k = ArtifactKind::Workflow;
        assert_eq!(k.extract_id(&json!({"id": "wf_1"})), Some("wf_1".into()));
        assert_eq!(
            k.extract_id(&json!({"workflow": {"id": "wf_2"}})),
            Some("wf_2".into())
        );
        assert_eq!(k.extract_id(&json!({"error": "boom"})), None);
    }

    #[test]
    fn test_agent_id_extraction_from_text() {
        let k = ArtifactKind::Agent;
        let out = json!({"text": "Created Agent_a1b2c3 successfully"});
        assert_eq!(k.extract_id(&out), Some("Agent_a1b2c3".into()));
        assert_eq!(k.extract_id(&json!({"text": "no id here"})), None);
    }

    #[test]
    fn test_content_text_per_kind() {
        let input = json!({"description": "wf text", "system_prompt": "agent text"});
        assert_eq!(ArtifactKind::Workflow.content_text(&input), "wf text");
        assert_eq!(ArtifactKind::Agent.content_text(&input), "agent text");
        assert_eq!(ArtifactKind::Workflow.content_text(&json!({})), "");
    }
}
