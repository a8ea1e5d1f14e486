//! Dialog engine: linear question flows that collect a `UserProfile`.
//!
//! A flow is a fixed list of steps. Steps prompt the user, and the flow is
//! suspended between turns as persisted `DialogState` (flow + step index +
//! pending prompt). The next reply is recognized according to the pending
//! prompt's kind and fed to the following step.

pub mod context;
pub mod flows;
pub mod model;
pub mod prompts;
pub mod questions;
pub mod state;

pub use context::DialogContext;
pub use flows::{FlowKind, StepKind};
pub use model::UserProfile;
pub use prompts::{DateTimeResolution, PendingPrompt, PromptKind, StepValue};
pub use questions::{Question, QuestionSet};
pub use state::{ConversationData, DialogState, DialogTurnStatus};
