//! Turn dispatcher: the per-activity entry point.
//!
//! For each activity: load conversation and user state, resume a
//! suspended flow or start one on the trigger phrase (otherwise echo),
//! welcome new members, report other activity types, then flush state.

use std::sync::Arc;

use tracing::Instrument;

use super::activity::{Activity, ActivityKind, OutgoingResponse};
use super::turn::TurnContext;
use super::welcome::send_welcome_messages;
use crate::config::BotConfig;
use crate::dialog::{
    ConversationData, DialogContext, DialogTurnStatus, FlowKind, QuestionSet, UserProfile,
};
use crate::error::{Error, Result};
use crate::store::{BotState, Database};

/// The bot: trigger, flow, question list and state containers.
pub struct TurnDispatcher {
    trigger: String,
    flow: FlowKind,
    welcome_text: String,
    questions: Option<QuestionSet>,
    conversation_state: BotState,
    user_state: BotState,
}

impl TurnDispatcher {
    pub fn new(
        config: &BotConfig,
        flow: FlowKind,
        questions: Option<QuestionSet>,
        db: Arc<dyn Database>,
    ) -> Self {
        Self {
            trigger: config.trigger.clone(),
            flow,
            welcome_text: config.welcome_text.clone(),
            questions,
            conversation_state: BotState::conversation(Arc::clone(&db)),
            user_state: BotState::user(db),
        }
    }

    /// Handle one activity and return the replies it produced.
    ///
    /// `None` is rejected with [`Error::InvalidArgument`].
    pub async fn on_turn(&self, activity: Option<&Activity>) -> Result<Vec<OutgoingResponse>> {
        let activity = activity.ok_or_else(|| Error::invalid_argument("activity"))?;
        let span = tracing::info_span!(
            "turn",
            kind = %activity.kind,
            channel = %activity.channel_id,
            conversation = %activity.conversation.id,
        );
        self.handle(activity).instrument(span).await
    }

    async fn handle(&self, activity: &Activity) -> Result<Vec<OutgoingResponse>> {
        let mut conversation = self
            .conversation_state
            .load::<ConversationData>(activity)
            .await?;
        let mut profile = self.user_state.load::<Option<UserProfile>>(activity).await?;
        let mut turn = TurnContext::new(activity.clone());

        match activity.activity_kind() {
            ActivityKind::Message => {
                let mut dc = DialogContext::new(
                    &mut conversation.value.dialog_state,
                    &mut profile.value,
                    &mut turn,
                    self.questions.as_ref(),
                );
                let status = dc.continue_dialog()?;
                tracing::debug!(status = %status, "Dialog continued");
                if status == DialogTurnStatus::Empty {
                    if activity.text_or_empty() == self.trigger {
                        dc.begin_dialog(self.flow)?;
                    } else {
                        let text = format!("You said {}.", activity.text_or_empty());
                        turn.send_text(text);
                    }
                }
            }
            ActivityKind::ConversationUpdate => {
                let welcomed = send_welcome_messages(&mut turn, &self.welcome_text);
                tracing::debug!(welcomed, "Conversation update handled");
            }
            ActivityKind::Other(kind) => {
                turn.send_text(format!("{kind} event detected"));
            }
        }

        self.conversation_state
            .save_changes(&mut conversation, false)
            .await?;
        self.user_state.save_changes(&mut profile, false).await?;

        Ok(turn.into_responses())
    }
}
