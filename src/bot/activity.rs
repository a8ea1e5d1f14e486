//! Inbound activities and outbound replies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MESSAGE: &str = "message";
pub const CONVERSATION_UPDATE: &str = "conversationUpdate";

/// A participant in a conversation (user or bot).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
}

/// One inbound event.
///
/// `type` is kept as received so unknown kinds can be reported back by
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_added: Option<Vec<ChannelAccount>>,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
}

fn default_channel_id() -> String {
    "default".to_string()
}

/// Activity kinds the dispatcher distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind<'a> {
    Message,
    ConversationUpdate,
    Other(&'a str),
}

impl Activity {
    fn new(kind: &str, conversation_id: &str, from_id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(Uuid::new_v4().to_string()),
            text: None,
            members_added: None,
            from: ChannelAccount::new(from_id),
            recipient: ChannelAccount::new(crate::config::DEFAULT_BOT_ID),
            conversation: ConversationAccount {
                id: conversation_id.to_string(),
            },
            channel_id: default_channel_id(),
        }
    }

    /// A text message from `from_id`.
    pub fn message(conversation_id: &str, from_id: &str, text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::new(MESSAGE, conversation_id, from_id)
        }
    }

    /// A conversation update announcing `members` joined.
    pub fn members_added(conversation_id: &str, members: &[&str]) -> Self {
        Self {
            members_added: Some(members.iter().map(|m| ChannelAccount::new(*m)).collect()),
            ..Self::new(CONVERSATION_UPDATE, conversation_id, "")
        }
    }

    /// Any other activity type.
    pub fn event(kind: &str, conversation_id: &str, from_id: &str) -> Self {
        Self::new(kind, conversation_id, from_id)
    }

    pub fn with_channel(mut self, channel_id: &str) -> Self {
        self.channel_id = channel_id.to_string();
        self
    }

    pub fn with_recipient(mut self, bot_id: &str) -> Self {
        self.recipient = ChannelAccount::new(bot_id);
        self
    }

    pub fn activity_kind(&self) -> ActivityKind<'_> {
        match self.kind.as_str() {
            MESSAGE => ActivityKind::Message,
            CONVERSATION_UPDATE => ActivityKind::ConversationUpdate,
            other => ActivityKind::Other(other),
        }
    }

    /// Message text, or empty when the activity carries none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// A reply produced during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingResponse {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    pub conversation_id: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_shape() {
        let json = r#"{
            "type": "conversationUpdate",
            "membersAdded": [{"id": "u1"}, {"id": "bot", "name": "Baby bot"}],
            "recipient": {"id": "bot"},
            "conversation": {"id": "c9"},
            "channelId": "webchat"
        }"#;
        let a: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(a.activity_kind(), ActivityKind::ConversationUpdate);
        assert_eq!(a.members_added.as_ref().unwrap().len(), 2);
        assert_eq!(a.recipient.id, "bot");
        assert_eq!(a.conversation.id, "c9");
        assert_eq!(a.channel_id, "webchat");
        assert!(a.text.is_none());
    }

    #[test]
    fn unknown_kind_keeps_its_name() {
        let a: Activity = serde_json::from_str(r#"{"type":"typing"}"#).unwrap();
        assert_eq!(a.activity_kind(), ActivityKind::Other("typing"));
        assert_eq!(a.channel_id, "default");
        assert_eq!(a.text_or_empty(), "");
    }

    #[test]
    fn message_builder() {
        let a = Activity::message("c1", "u1", "Hallo").with_channel("cli");
        assert_eq!(a.activity_kind(), ActivityKind::Message);
        assert_eq!(a.text_or_empty(), "Hallo");
        assert_eq!(a.from.id, "u1");
        assert_eq!(a.channel_id, "cli");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["channelId"], "cli");
    }
}
