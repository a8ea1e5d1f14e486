//! Bot surface: activities, turn handling, welcome and HTTP routes.

pub mod activity;
pub mod adapter;
pub mod dispatcher;
pub mod routes;
pub mod turn;
pub mod welcome;

pub use activity::{Activity, ActivityKind, ChannelAccount, ConversationAccount, OutgoingResponse};
pub use adapter::BotAdapter;
pub use dispatcher::TurnDispatcher;
pub use routes::{BotRouteState, bot_routes};
pub use turn::TurnContext;
