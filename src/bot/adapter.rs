//! Adapter: drives a channel's activity stream through the dispatcher.

use std::sync::Arc;

use futures::StreamExt;

use super::activity::OutgoingResponse;
use super::dispatcher::TurnDispatcher;
use crate::channels::Channel;
use crate::error::Error;

pub struct BotAdapter {
    bot: Arc<TurnDispatcher>,
    channel: Box<dyn Channel>,
}

impl BotAdapter {
    pub fn new(bot: Arc<TurnDispatcher>, channel: Box<dyn Channel>) -> Self {
        Self { bot, channel }
    }

    /// Process activities one at a time until the stream ends or Ctrl+C.
    pub async fn run(self) -> Result<(), Error> {
        let mut activities = self.channel.start().await?;
        tracing::info!(channel = self.channel.name(), "Bot ready and listening");

        loop {
            let activity = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                next = activities.next() => {
                    match next {
                        Some(a) => a,
                        None => {
                            tracing::info!("Channel stream ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            match self.bot.on_turn(Some(&activity)).await {
                Ok(replies) => {
                    for reply in &replies {
                        self.channel.respond(&activity, reply).await?;
                    }
                }
                Err(e) => {
                    tracing::error!("Error handling activity: {}", e);
                    let notice = OutgoingResponse {
                        id: uuid::Uuid::new_v4(),
                        reply_to_id: activity.id.clone(),
                        conversation_id: activity.conversation.id.clone(),
                        text: format!("Error: {e}"),
                    };
                    if let Err(e) = self.channel.respond(&activity, &notice).await {
                        tracing::warn!("Failed to deliver error notice: {}", e);
                    }
                }
            }
        }

        self.channel.shutdown().await?;
        Ok(())
    }
}
