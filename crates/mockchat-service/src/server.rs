use rand::Rng;

use mockchat_channel::Channel;
use mockchat_net::Network;
use mockchat_types::{RichText, random};

use crate::error::ServiceError;
use crate::state::SessionState;

/// A named group of channels.
#[derive(Clone)]
pub struct Server {
    id: u32,
    name: RichText,
    network: Network,
    channels: Vec<Channel>,
}

impl Server {
    /// A server with a random palette-coloured name and 5 to 16 channels. The server and each
    /// of its channels take the next id from `state`.
    pub fn random(state: &SessionState, network: &Network) -> Self {
        let id = state.next_id();
        let (name, count) = {
            let mut rng = rand::rng();
            (random::noun(&mut rng), rng.random_range(5..=16))
        };

        let channels = (0..count)
            .map(|_| Channel::new(state.next_id(), state.username(), network.clone()))
            .collect();

        Self {
            id,
            name: RichText::palette(name),
            network: network.clone(),
            channels,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &RichText {
        &self.name
    }

    /// List the channels, after a simulated call.
    pub async fn channels(&self) -> Result<&[Channel], ServiceError> {
        self.network
            .simulate()
            .await
            .map_err(ServiceError::network("failed to list channels"))?;
        Ok(&self.channels)
    }
}
