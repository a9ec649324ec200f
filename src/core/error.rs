//! Error types for the console core.

use thiserror::Error;

/// Error returned by a command handler.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A plain failure message.
    #[error("{0}")]
    Message(String),

    /// Any other error raised by the handler.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CommandError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for CommandError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// Result type returned by command handlers.
pub type CommandResult = Result<(), CommandError>;

/// Errors surfaced by the console while dispatching input.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A resource the console depends on was not inserted into the world.
    #[error("console is missing required resource `{0}`")]
    MissingResource(&'static str),

    /// A command handler failed. Later handlers for the same alias were not run.
    #[error("command \"{alias}\" failed: {source}")]
    Handler {
        alias: String,
        #[source]
        source: CommandError,
    },
}
