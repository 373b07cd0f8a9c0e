use std::collections::HashMap;

use tracing::info;

use mockchat_net::Network;
use mockchat_types::RichText;

use crate::auth::Authenticator;
use crate::config::Configurator;
use crate::error::ServiceError;
use crate::session::Session;
use crate::state::SessionState;

/// Entry point of the mock backend. Everything it hands out shares one
/// simulated network.
#[derive(Debug, Clone, Default)]
pub struct Service {
    network: Network,
}

impl Service {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn name(&self) -> RichText {
        RichText::plain("Mock")
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn authenticators(&self) -> [Authenticator; 2] {
        [Authenticator::Slow, Authenticator::Fast]
    }

    pub async fn authenticate(
        &self,
        authenticator: Authenticator,
        form: &[&str],
    ) -> Result<Session, ServiceError> {
        authenticator.authenticate(&self.network, form).await
    }

    /// Rebuild a session from what [`Session::save`] produced. The server
    /// tree is regenerated; only identity survives.
    pub async fn restore_session(
        &self,
        store: &HashMap<String, String>,
    ) -> Result<Session, ServiceError> {
        self.network
            .simulate()
            .await
            .map_err(ServiceError::network("restore failed"))?;

        let state = SessionState::restore(store)?;
        info!(session_id = %state.session_id(), "session restored");
        Ok(Session::new(state, self.network.clone()))
    }

    pub fn configurator(&self) -> Configurator {
        Configurator::new(self.network.clone())
    }
}
