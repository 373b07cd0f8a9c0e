use mockchat_net::Network;

use crate::error::ServiceError;
use crate::session::Session;
use crate::state::SessionState;

/// One field of an authentication form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthEntry {
    pub name: &'static str,
    pub secret: bool,
    pub multiline: bool,
}

impl AuthEntry {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            secret: false,
            multiline: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authenticator {
    /// Pays a simulated round trip, which may fail.
    Slow,
    /// Logs in immediately and never fails.
    Fast,
}

impl Authenticator {
    pub fn name(self) -> &'static str {
        match self {
            Authenticator::Slow => "Slow Authentication",
            Authenticator::Fast => "Fast Authenticator",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Authenticator::Slow => "",
            Authenticator::Fast => "Internet fails and slow-downs disabled.",
        }
    }

    pub fn form(self) -> Vec<AuthEntry> {
        match self {
            Authenticator::Slow => vec![
                AuthEntry::text("Username"),
                AuthEntry {
                    secret: true,
                    ..AuthEntry::text("Password (ignored)")
                },
                AuthEntry {
                    multiline: true,
                    ..AuthEntry::text("Paragraph (ignored)")
                },
            ],
            Authenticator::Fast => vec![AuthEntry::text("Username (fast)")],
        }
    }

    /// Log in with the filled-in form. Only the username is read.
    pub async fn authenticate(
        self,
        network: &Network,
        form: &[&str],
    ) -> Result<Session, ServiceError> {
        let username = form
            .first()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("username is required".into()))?;

        if self == Authenticator::Slow {
            network
                .simulate()
                .await
                .map_err(ServiceError::network("authentication failed"))?;
        }

        Ok(Session::new(
            SessionState::new(username, ""),
            network.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms() {
        let slow = Authenticator::Slow.form();
        assert_eq!(slow.len(), 3);
        assert!(slow[1].secret && !slow[1].multiline);
        assert!(slow[2].multiline && !slow[2].secret);
        assert_eq!(Authenticator::Fast.form().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_login_skips_the_network() {
        let network = Network::default();
        network.config().set_min_latency_ms(60_000);
        network.config().set_max_latency_ms(60_000);

        let started = tokio::time::Instant::now();
        let session = Authenticator::Fast
            .authenticate(&network, &["bob"])
            .await
            .unwrap();
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
        assert_eq!(session.name().content, "bob");
        assert!(!session.id().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_login_waits() {
        let network = Network::default();
        network.config().set_failures_enabled(false);

        let started = tokio::time::Instant::now();
        Authenticator::Slow
            .authenticate(&network, &["bob", "hunter2", ""])
            .await
            .unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn username_is_required() {
        let err = Authenticator::Fast
            .authenticate(&Network::instant(), &["  "])
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
