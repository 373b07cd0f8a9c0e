use serde::Serialize;

use crate::models::{Header, Message, Typer};

/// Everything a channel can tell its observers about, in one enum.
///
/// The channel actor itself talks to observers through method calls; this is
/// the serialisable form frontends and logs use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ChannelEvent {
    /// A message was appended to the channel
    MessageCreate { channel_id: u32, message: Message },

    /// A stored message changed content
    MessageUpdate { channel_id: u32, message: Message },

    /// A message was removed from the channel
    MessageDelete { channel_id: u32, header: Header },

    /// Someone started typing
    TypingStart { channel_id: u32, typer: Typer },
}

impl ChannelEvent {
    pub fn channel_id(&self) -> u32 {
        match self {
            Self::MessageCreate { channel_id, .. }
            | Self::MessageUpdate { channel_id, .. }
            | Self::MessageDelete { channel_id, .. }
            | Self::TypingStart { channel_id, .. } => *channel_id,
        }
    }

    /// The message id this event concerns, if any.
    pub fn message_id(&self) -> Option<u32> {
        match self {
            Self::MessageCreate { message, .. } | Self::MessageUpdate { message, .. } => {
                Some(message.id())
            }
            Self::MessageDelete { header, .. } => Some(header.id),
            Self::TypingStart { .. } => None,
        }
    }
}
