//! Per-turn context: the inbound activity plus the replies produced for it.

use uuid::Uuid;

use super::activity::{Activity, OutgoingResponse};

pub struct TurnContext {
    activity: Activity,
    responses: Vec<OutgoingResponse>,
}

impl TurnContext {
    pub fn new(activity: Activity) -> Self {
        Self {
            activity,
            responses: Vec::new(),
        }
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Queue a text reply to the inbound activity.
    pub fn send_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(
            conversation = %self.activity.conversation.id,
            reply = %text,
            "Queued reply"
        );
        self.responses.push(OutgoingResponse {
            id: Uuid::new_v4(),
            reply_to_id: self.activity.id.clone(),
            conversation_id: self.activity.conversation.id.clone(),
            text,
        });
    }

    pub fn responses(&self) -> &[OutgoingResponse] {
        &self.responses
    }

    pub fn reply_texts(&self) -> Vec<String> {
        self.responses.iter().map(|r| r.text.clone()).collect()
    }

    pub fn into_responses(self) -> Vec<OutgoingResponse> {
        self.responses
    }
}
