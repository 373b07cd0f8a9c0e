//! Observer interfaces a frontend implements to receive channel traffic.
//!
//! The messenger calls these from its event loop with no lock held, so an
//! implementation may call straight back into read operations such as
//! `raw_content` or `complete`.

use std::sync::Mutex;

use mockchat_types::{ChannelEvent, Header, Message, Typer};

pub trait MessagesContainer: Send + Sync {
    fn create_message(&self, msg: Message);
    fn update_message(&self, msg: Message);
    fn delete_message(&self, header: Header);
}

pub trait TypingContainer: Send + Sync {
    fn add_typer(&self, typer: Typer);
}

/// Container that just keeps every event it sees, tagged with a channel id.
#[derive(Debug, Default)]
pub struct EventLog {
    channel_id: u32,
    events: Mutex<Vec<ChannelEvent>>,
}

impl EventLog {
    pub fn new(channel_id: u32) -> Self {
        Self {
            channel_id,
            events: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, event: ChannelEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessagesContainer for EventLog {
    fn create_message(&self, message: Message) {
        self.push(ChannelEvent::MessageCreate {
            channel_id: self.channel_id,
            message,
        });
    }

    fn update_message(&self, message: Message) {
        self.push(ChannelEvent::MessageUpdate {
            channel_id: self.channel_id,
            message,
        });
    }

    fn delete_message(&self, header: Header) {
        self.push(ChannelEvent::MessageDelete {
            channel_id: self.channel_id,
            header,
        });
    }
}

impl TypingContainer for EventLog {
    fn add_typer(&self, typer: Typer) {
        self.push(ChannelEvent::TypingStart {
            channel_id: self.channel_id,
            typer,
        });
    }
}
