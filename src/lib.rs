//! Baby bot: a small profile-collecting conversational bot.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod store;
