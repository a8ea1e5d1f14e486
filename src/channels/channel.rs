//! The `Channel` trait: a source of activities and a sink for replies.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::bot::{Activity, OutgoingResponse};
use crate::error::ChannelError;

/// Stream of inbound activities from a channel.
pub type ActivityStream = Pin<Box<dyn Stream<Item = Activity> + Send>>;

#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel identifier, also used as the activity `channelId`.
    fn name(&self) -> &str;

    /// Start receiving. The stream ends when the channel closes.
    async fn start(&self) -> Result<ActivityStream, ChannelError>;

    /// Deliver one reply to the conversation `activity` came from.
    async fn respond(
        &self,
        activity: &Activity,
        response: &OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
