//! Plain data shared by every mockchat crate.
//!
//! Nothing in here does I/O or holds locks: messages, authors, typers and
//! the observer events a channel emits, plus the random content generators
//! the synthetic participants draw from.

pub mod events;
pub mod models;
pub mod random;
pub mod rich;

pub use events::ChannelEvent;
pub use models::{AVATAR_URL, Author, Header, Message, TYPING_TIMEOUT, Typer, parse_id};
pub use random::Persona;
pub use rich::{RichText, Segment};
