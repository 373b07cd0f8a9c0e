use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::info;

use mockchat_net::Network;
use mockchat_types::{AVATAR_URL, RichText};

use crate::commander::Commander;
use crate::error::ServiceError;
use crate::icon::StaticIcon;
use crate::server::Server;
use crate::state::{SessionState, SharedState};

/// A logged-in user and the server tree generated for them.
pub struct Session {
    state: SharedState,
    network: Network,
    servers: Vec<Server>,
}

impl Session {
    /// Generates 10 to 44 servers up front.
    pub fn new(state: SessionState, network: Network) -> Self {
        let state = Arc::new(state);
        let count = rand::rng().random_range(10..=44);
        let servers = (0..count)
            .map(|_| Server::random(&state, &network))
            .collect::<Vec<_>>();

        info!(
            session_id = %state.session_id(),
            username = state.username(),
            servers = servers.len(),
            "session created"
        );

        Self {
            state,
            network,
            servers,
        }
    }

    pub fn id(&self) -> String {
        self.state.session_id()
    }

    pub fn name(&self) -> RichText {
        RichText::plain(self.state.username())
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn save(&self) -> HashMap<String, String> {
        self.state.save()
    }

    pub async fn servers(&self) -> Result<&[Server], ServiceError> {
        self.network
            .simulate()
            .await
            .map_err(ServiceError::network("failed to list servers"))?;
        Ok(&self.servers)
    }

    /// Forget the session id and restart the id counter. The local state is
    /// cleared even when the simulated call then fails.
    pub async fn disconnect(&self) -> Result<(), ServiceError> {
        self.state.clear_session_id();
        self.state.reset_id();
        info!(username = self.state.username(), "session disconnected");

        self.network
            .simulate()
            .await
            .map_err(ServiceError::network("failed to disconnect"))
            .map(drop)
    }

    pub async fn icon(&self, cancel: &CancellationToken) -> Result<&'static str, ServiceError> {
        StaticIcon::new(AVATAR_URL).fetch(&self.network, cancel).await
    }

    pub fn commander(&self) -> Commander {
        Commander::new(self.network.clone())
    }
}
