use thiserror::Error;

use mockchat_net::NetError;

use crate::capability::Capability;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// A simulated call failed; `op` says which operation it belonged to.
    #[error("{op}: {source}")]
    Network {
        op: &'static str,
        #[source]
        source: NetError,
    },

    #[error("message {0} not found")]
    NotFound(u32),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("channel does not support {0}")]
    Unsupported(Capability),

    /// The channel has not been joined yet.
    #[error("channel is not active")]
    Inactive,

    /// The channel's event loop has stopped; it cannot be joined again.
    #[error("channel is closed")]
    Closed,
}

impl ChannelError {
    pub(crate) fn network(op: &'static str) -> impl FnOnce(NetError) -> Self {
        move |source| ChannelError::Network { op, source }
    }

    pub(crate) fn invalid_id(id: &str) -> Self {
        ChannelError::InvalidInput(format!("invalid message id {id:?}"))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ChannelError::Network {
                source: NetError::Cancelled,
                ..
            }
        )
    }

    /// Whether the same call may succeed if simply tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChannelError::Network { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
