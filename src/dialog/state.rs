//! Dialog state machine: which step of which flow is waiting.

use serde::{Deserialize, Serialize};

use super::flows::FlowKind;
use super::prompts::PendingPrompt;

/// Persisted dialog state for one conversation.
///
/// At most one flow is suspended at a time. A finished flow goes back to
/// `Empty`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DialogState {
    #[default]
    Empty,
    Suspended {
        flow: FlowKind,
        step: usize,
        prompt: PendingPrompt,
    },
}

impl DialogState {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Outcome of beginning or continuing a dialog within one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// Nothing was suspended, so nothing ran.
    Empty,
    /// A step prompted and the flow is waiting for the next reply.
    Waiting,
    /// The flow ran its last step.
    Complete,
}

impl std::fmt::Display for DialogTurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Waiting => "waiting",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Conversation-scoped record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationData {
    #[serde(default)]
    pub dialog_state: DialogState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::prompts::PromptKind;

    #[test]
    fn default_is_empty() {
        assert!(DialogState::default().is_empty());
        assert!(ConversationData::default().dialog_state.is_empty());
    }

    #[test]
    fn suspended_state_is_tagged() {
        let state = DialogState::Suspended {
            flow: FlowKind::Quick,
            step: 1,
            prompt: PendingPrompt {
                kind: PromptKind::DateTime,
                text: "Please enter your birthdate.".to_string(),
            },
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "suspended");
        assert_eq!(json["flow"], "quick");
        assert_eq!(json["step"], 1);

        let parsed: DialogState = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, state);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn empty_state_json() {
        let json = serde_json::to_value(DialogState::Empty).unwrap();
        assert_eq!(json, serde_json::json!({"status": "empty"}));
        let data: ConversationData = serde_json::from_str("{}").unwrap();
        assert!(data.dialog_state.is_empty());
    }

    #[test]
    fn status_display() {
        assert_eq!(DialogTurnStatus::Empty.to_string(), "empty");
        assert_eq!(DialogTurnStatus::Waiting.to_string(), "waiting");
        assert_eq!(DialogTurnStatus::Complete.to_string(), "complete");
    }
}
