use tokio_util::sync::CancellationToken;

use mockchat_net::Network;
use mockchat_types::{Author, RichText, random};

use crate::capability::{Capabilities, Capability};
use crate::error::ChannelError;
use crate::messenger::{Messenger, MessengerConfig};

/// Colour of the local user's name in every channel.
pub const USER_COLOR: u32 = 0xE88AF8;

/// A chat channel: identity, the local user's name in it, and its messenger.
#[derive(Clone)]
pub struct Channel {
    id: u32,
    name: String,
    messenger: Messenger,
}

impl Channel {
    /// A channel with a random `#noun` name and every capability.
    pub fn new(id: u32, username: &str, network: Network) -> Self {
        Self::with_config(
            id,
            username,
            network,
            MessengerConfig::default(),
            Capabilities::all(),
        )
    }

    pub fn with_config(
        id: u32,
        username: &str,
        network: Network,
        config: MessengerConfig,
        capabilities: Capabilities,
    ) -> Self {
        let name = format!("#{}", random::noun(&mut rand::rng()));
        let user = Author::new(RichText::colored(username, USER_COLOR));
        Self {
            id,
            name,
            messenger: Messenger::new(id, user, network, config, capabilities),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> RichText {
        RichText::plain(self.name.as_str())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.messenger.capabilities()
    }

    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }

    fn gated(&self, cap: Capability) -> Option<&Messenger> {
        self.capabilities().has(cap).then_some(&self.messenger)
    }

    pub fn sender(&self) -> Option<&Messenger> {
        self.gated(Capability::Send)
    }

    pub fn editor(&self) -> Option<&Messenger> {
        self.gated(Capability::Edit)
    }

    pub fn actioner(&self) -> Option<&Messenger> {
        self.gated(Capability::Act)
    }

    pub fn typer(&self) -> Option<&Messenger> {
        self.gated(Capability::Typing)
    }

    pub fn completer(&self) -> Option<&Messenger> {
        self.gated(Capability::Complete)
    }

    /// The local user's display name here. Waits on the simulated network,
    /// giving up if `cancel` fires.
    pub async fn nickname(&self, cancel: &CancellationToken) -> Result<RichText, ChannelError> {
        self.messenger.require(Capability::Nickname)?;
        self.messenger
            .network()
            .simulate_with(cancel)
            .await
            .map_err(ChannelError::network("failed to fetch nickname"))?;
        Ok(self.messenger.user().name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channel_is_inactive() {
        let channel = Channel::new(3, "alice", Network::instant());
        assert_eq!(channel.id(), 3);
        assert!(channel.name().content.starts_with('#'));
        assert!(!channel.messenger().is_active());
        assert_eq!(channel.messenger().user().id(), "alice");
    }

    #[test]
    fn accessors_follow_capabilities() {
        let channel = Channel::with_config(
            1,
            "alice",
            Network::instant(),
            MessengerConfig::default(),
            Capabilities::read_only(),
        );
        assert!(channel.sender().is_none());
        assert!(channel.editor().is_none());
        assert!(channel.actioner().is_none());
        assert!(channel.completer().is_none());
        assert!(channel.typer().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn nickname_is_coloured_username() {
        let channel = Channel::new(1, "alice", Network::instant());
        let nick = channel.nickname(&CancellationToken::new()).await.unwrap();
        assert_eq!(nick.content, "alice");
        assert_eq!(nick.segments[0].color, 0xE88AF8FF);
    }

    #[tokio::test(start_paused = true)]
    async fn nickname_respects_capabilities() {
        let channel = Channel::with_config(
            1,
            "alice",
            Network::instant(),
            MessengerConfig::default(),
            Capabilities::all().without(Capability::Nickname),
        );
        let err = channel.nickname(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Unsupported(Capability::Nickname)));
    }
}
