//! Mockchat channels.
//!
//! A [`Channel`] owns a [`Messenger`], the actor that keeps a bounded backlog
//! of messages, generates synthetic traffic on timers, and applies caller
//! sends, edits, deletions and typing signals one at a time. Everything that
//! pretends to be I/O goes through the simulated network first.

pub mod actions;
pub mod author;
pub mod capability;
pub mod channel;
pub mod completer;
pub mod container;
pub mod error;
pub mod messenger;
pub mod store;
pub mod typing;

pub use actions::{BEST_TRAP, MessageAction};
pub use author::{AuthorStreak, SAME_AUTHOR_LIMIT};
pub use capability::{Capabilities, Capability};
pub use channel::Channel;
pub use completer::CompletionEntry;
pub use container::{EventLog, MessagesContainer, TypingContainer};
pub use error::ChannelError;
pub use messenger::{FETCH_BACKLOG, Messenger, MessengerConfig};
pub use store::MessageStore;
pub use typing::{StopHandle, TypingSubscriber};
