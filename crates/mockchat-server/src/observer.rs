use tracing::{debug, info, trace, warn};

use mockchat_channel::{MessagesContainer, TypingContainer};
use mockchat_types::{ChannelEvent, Header, Message, Typer};

/// Writes every event of one channel to the log as a JSON line.
pub struct LogObserver {
    channel_id: u32,
}

impl LogObserver {
    pub fn new(channel_id: u32) -> Self {
        Self { channel_id }
    }

    fn emit(&self, event: ChannelEvent) {
        let channel_id = event.channel_id();
        let message_id = event.message_id();
        match serde_json::to_string(&event) {
            Ok(json) => info!(channel_id, message_id, "{json}"),
            Err(e) => warn!(channel_id, "Failed to serialize event: {e}"),
        }
    }
}

impl MessagesContainer for LogObserver {
    fn create_message(&self, message: Message) {
        if message.mentioned() {
            debug!(
                channel_id = self.channel_id,
                author = message.author_name(),
                "author mentions themselves"
            );
        }
        self.emit(ChannelEvent::MessageCreate {
            channel_id: self.channel_id,
            message,
        });
    }

    fn update_message(&self, message: Message) {
        self.emit(ChannelEvent::MessageUpdate {
            channel_id: self.channel_id,
            message,
        });
    }

    fn delete_message(&self, header: Header) {
        self.emit(ChannelEvent::MessageDelete {
            channel_id: self.channel_id,
            header,
        });
    }
}

impl TypingContainer for LogObserver {
    fn add_typer(&self, typer: Typer) {
        if typer.is_stale() {
            trace!(channel_id = self.channel_id, "stale typer skipped");
            return;
        }
        self.emit(ChannelEvent::TypingStart {
            channel_id: self.channel_id,
            typer,
        });
    }
}
