//! Error types for the bot.

/// Top-level error type for a turn or for startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {name} must be provided")]
    InvalidArgument { name: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),
}

impl Error {
    pub fn invalid_argument(name: impl Into<String>) -> Self {
        Self::InvalidArgument { name: name.into() }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read question file {path}: {source}")]
    QuestionFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse question file {path}: {source}")]
    QuestionFileParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid question file: {0}")]
    InvalidQuestions(String),

    #[error("Unknown flow: {0}")]
    UnknownFlow(String),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },
}

/// Dialog engine errors.
///
/// `UnexpectedResult` means a step received a value of the wrong shape,
/// which the prompt recognizers are supposed to rule out.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Flow {flow} is already waiting at step {step}")]
    AlreadyActive { flow: String, step: usize },

    #[error("Step {step} of flow {flow} expected a {expected} result")]
    UnexpectedResult {
        flow: String,
        step: String,
        expected: &'static str,
    },

    #[error("Flow {flow} has no question at position {index}")]
    MissingQuestion { flow: String, index: usize },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
