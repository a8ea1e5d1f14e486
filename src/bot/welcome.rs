//! Welcome message for newly joined participants.

use super::turn::TurnContext;

pub const WELCOME_TEXT: &str = "Welcome to EchoBot. This bot will introduce multiple turns using prompts.  Type anything to get started.";

/// Send `text` once for every added member other than the bot itself.
///
/// Returns how many welcomes were queued.
pub fn send_welcome_messages(turn: &mut TurnContext, text: &str) -> usize {
    let bot_id = turn.activity().recipient.id.clone();
    let newcomers: Vec<String> = turn
        .activity()
        .members_added
        .iter()
        .flatten()
        .filter(|m| m.id != bot_id)
        .map(|m| m.id.clone())
        .collect();

    for member in &newcomers {
        tracing::debug!(member = %member, "Welcoming member");
        turn.send_text(text);
    }
    newcomers.len()
}
