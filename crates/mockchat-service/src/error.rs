use thiserror::Error;

use mockchat_net::NetError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{op}: {source}")]
    Network {
        op: &'static str,
        #[source]
        source: NetError,
    },

    /// Saved session data is missing a required key.
    #[error("invalid session")]
    InvalidSession,

    /// A configuration value did not parse or was out of range.
    #[error("invalid config at {key}: {message}")]
    Config { key: &'static str, message: String },

    #[error("Usage: {0}")]
    Usage(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub(crate) fn network(op: &'static str) -> impl FnOnce(NetError) -> Self {
        move |source| ServiceError::Network { op, source }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    pub(crate) fn config(key: &'static str, message: impl ToString) -> Self {
        ServiceError::Config {
            key,
            message: message.to_string(),
        }
    }
}
