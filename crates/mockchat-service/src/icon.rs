use tokio_util::sync::CancellationToken;

use mockchat_net::Network;

use crate::error::ServiceError;

/// An icon that never changes; fetching it still costs a simulated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIcon {
    url: &'static str,
}

impl StaticIcon {
    pub const fn new(url: &'static str) -> Self {
        Self { url }
    }

    pub async fn fetch(
        &self,
        network: &Network,
        cancel: &CancellationToken,
    ) -> Result<&'static str, ServiceError> {
        network
            .simulate_with(cancel)
            .await
            .map_err(ServiceError::network("failed to query for icon"))?;
        Ok(self.url)
    }
}
