//! Configuration types.

use std::path::PathBuf;

use crate::bot::welcome::WELCOME_TEXT;
use crate::dialog::{FlowKind, QuestionSet};
use crate::error::ConfigError;

pub const DEFAULT_TRIGGER: &str = "Hallo";
pub const DEFAULT_BOT_ID: &str = "baby-bot";
pub const DEFAULT_DB_PATH: &str = "./data/baby-bot.db";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Message text that starts the flow (case-sensitive).
    pub trigger: String,
    /// Flow started by the trigger when no question file is configured.
    pub flow: FlowKind,
    /// Optional question file; its `flowId` overrides `flow`.
    pub questions_path: Option<PathBuf>,
    /// libSQL database file, or `:memory:`.
    pub db_path: String,
    /// Port for the HTTP endpoint; disabled when `None`.
    pub http_port: Option<u16>,
    /// Account id the bot uses as recipient.
    pub bot_id: String,
    /// Greeting for newly joined members.
    pub welcome_text: String,
    /// Directory for daily log files; stderr only when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            flow: FlowKind::default(),
            questions_path: None,
            db_path: DEFAULT_DB_PATH.to_string(),
            http_port: None,
            bot_id: DEFAULT_BOT_ID.to_string(),
            welcome_text: WELCOME_TEXT.to_string(),
            log_dir: None,
        }
    }
}

impl BotConfig {
    /// Build from `BABY_BOT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let flow = match get("BABY_BOT_FLOW") {
            Some(v) => v.parse()?,
            None => defaults.flow,
        };

        let http_port = match get("BABY_BOT_HTTP_PORT") {
            Some(v) => Some(v.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "BABY_BOT_HTTP_PORT".to_string(),
                message: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            trigger: get("BABY_BOT_TRIGGER").unwrap_or(defaults.trigger),
            flow,
            questions_path: get("BABY_BOT_QUESTIONS").map(PathBuf::from),
            db_path: get("BABY_BOT_DB_PATH").unwrap_or(defaults.db_path),
            http_port,
            bot_id: get("BABY_BOT_ID").unwrap_or(defaults.bot_id),
            welcome_text: get("BABY_BOT_WELCOME").unwrap_or(defaults.welcome_text),
            log_dir: get("BABY_BOT_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Load the question file, if one is configured.
    pub fn load_questions(&self) -> Result<Option<QuestionSet>, ConfigError> {
        self.questions_path
            .as_deref()
            .map(QuestionSet::load)
            .transpose()
    }

    /// The flow the trigger starts, given the loaded questions.
    ///
    /// Fails when the flow needs a question file and none was loaded.
    pub fn resolve_flow(&self, questions: Option<&QuestionSet>) -> Result<FlowKind, ConfigError> {
        let flow = questions.map(|q| q.flow).unwrap_or(self.flow);
        if flow.questions_required() > 0 && questions.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "BABY_BOT_QUESTIONS".to_string(),
                message: format!("flow {flow} needs a question file"),
            });
        }
        Ok(flow)
    }
}
