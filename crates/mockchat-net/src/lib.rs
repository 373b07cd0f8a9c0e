//! Simulated network for mockchat.
//!
//! Every operation that pretends to do I/O calls [`Network::simulate`] (or
//! [`Network::simulate_with`] when the caller can cancel) before doing its
//! real work. A call sleeps for a latency drawn uniformly from the configured
//! range, then fails with [`NetError::Unavailable`] 20% of the time when
//! failures are enabled.
//!
//! The parameters live in a shared [`NetworkConfig`] read with atomic loads
//! on every call, so operators can retune them while channels are running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Percent of completed calls that fail when failures are enabled.
pub const FAILURE_PERCENT: u32 = 20;

pub const DEFAULT_MIN_LATENCY_MS: u64 = 500;
pub const DEFAULT_MAX_LATENCY_MS: u64 = 3000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// The simulated link dropped the call.
    #[error("network unavailable")]
    Unavailable,

    /// The caller's cancellation fired before the latency elapsed.
    #[error("operation cancelled")]
    Cancelled,
}

impl NetError {
    /// Only transient failures are worth retrying; cancellation never is.
    pub fn is_retryable(self) -> bool {
        matches!(self, NetError::Unavailable)
    }
}

/// Process-wide tuning knobs.
///
/// Fields are independent atomics: updates are last-writer-wins and there is
/// no ordering between fields, so a reader may briefly see a new minimum with
/// an old maximum.
#[derive(Debug)]
pub struct NetworkConfig {
    failures_enabled: AtomicBool,
    min_latency_ms: AtomicU64,
    max_latency_ms: AtomicU64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            failures_enabled: AtomicBool::new(true),
            min_latency_ms: AtomicU64::new(DEFAULT_MIN_LATENCY_MS),
            max_latency_ms: AtomicU64::new(DEFAULT_MAX_LATENCY_MS),
        }
    }
}

impl NetworkConfig {
    pub fn failures_enabled(&self) -> bool {
        self.failures_enabled.load(Ordering::Relaxed)
    }

    pub fn set_failures_enabled(&self, enabled: bool) {
        self.failures_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn min_latency_ms(&self) -> u64 {
        self.min_latency_ms.load(Ordering::Relaxed)
    }

    pub fn set_min_latency_ms(&self, ms: u64) {
        self.min_latency_ms.store(ms, Ordering::Relaxed);
    }

    pub fn max_latency_ms(&self) -> u64 {
        self.max_latency_ms.load(Ordering::Relaxed)
    }

    pub fn set_max_latency_ms(&self, ms: u64) {
        self.max_latency_ms.store(ms, Ordering::Relaxed);
    }

    /// Draw one latency. A range with `max <= min` always yields `min`.
    fn draw_latency<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_latency_ms();
        let max = self.max_latency_ms();
        let ms = if max <= min {
            min
        } else {
            rng.random_range(min..=max)
        };
        Duration::from_millis(ms)
    }
}

/// Cheap, cloneable handle to the shared simulated network.
#[derive(Debug, Clone, Default)]
pub struct Network {
    config: Arc<NetworkConfig>,
}

impl Network {
    pub fn new(config: Arc<NetworkConfig>) -> Self {
        Self { config }
    }

    /// A network with no latency that never fails. Handy for tests and the
    /// "fast" paths.
    pub fn instant() -> Self {
        let config = NetworkConfig::default();
        config.set_failures_enabled(false);
        config.set_min_latency_ms(0);
        config.set_max_latency_ms(0);
        Self::new(Arc::new(config))
    }

    pub fn config(&self) -> &Arc<NetworkConfig> {
        &self.config
    }

    /// Simulate one round trip that nobody can cancel.
    pub async fn simulate(&self) -> Result<Duration, NetError> {
        self.simulate_with(&CancellationToken::new()).await
    }

    /// Simulate one round trip, giving up early if `cancel` fires.
    ///
    /// Returns the time spent waiting.
    pub async fn simulate_with(&self, cancel: &CancellationToken) -> Result<Duration, NetError> {
        let latency = self.config.draw_latency(&mut rand::rng());
        let started = Instant::now();

        // A token that already fired must win even against a zero latency.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!(waited_ms = started.elapsed().as_millis() as u64, "simulated call cancelled");
                return Err(NetError::Cancelled);
            }
            _ = tokio::time::sleep(latency) => {}
        }

        let failed = self.config.failures_enabled()
            && rand::rng().random_ratio(FAILURE_PERCENT, 100);
        if failed {
            trace!(latency_ms = latency.as_millis() as u64, "simulated call dropped");
            return Err(NetError::Unavailable);
        }

        Ok(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn latency_stays_in_range() {
        let config = NetworkConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let d = config.draw_latency(&mut rng);
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn inverted_range_uses_minimum() {
        let config = NetworkConfig::default();
        config.set_min_latency_ms(800);
        config.set_max_latency_ms(100);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(config.draw_latency(&mut rng), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn never_fails_when_failures_disabled() {
        let network = Network::default();
        network.config().set_failures_enabled(false);

        for _ in 0..1000 {
            assert!(network.simulate().await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_drawn_latency() {
        let network = Network::default();
        network.config().set_failures_enabled(false);
        network.config().set_min_latency_ms(1200);
        network.config().set_max_latency_ms(1200);

        let elapsed = network.simulate().await.unwrap();
        assert!(elapsed >= Duration::from_millis(1200));
        assert!(elapsed < Duration::from_millis(1250));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_latency() {
        let network = Network::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = network.simulate_with(&cancel).await.unwrap_err();
        assert_eq!(err, NetError::Cancelled);
        assert!(!err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn fired_token_beats_zero_latency() {
        let network = Network::instant();
        let cancel = CancellationToken::new();
        cancel.cancel();

        for _ in 0..200 {
            assert_eq!(network.simulate_with(&cancel).await, Err(NetError::Cancelled));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failures_happen_when_enabled() {
        let network = Network::default();
        network.config().set_min_latency_ms(1);
        network.config().set_max_latency_ms(2);

        let mut failures = 0;
        for _ in 0..500 {
            if let Err(e) = network.simulate().await {
                assert_eq!(e, NetError::Unavailable);
                failures += 1;
            }
        }
        // 20% of 500 is 100; this is far outside any plausible deviation.
        assert!(failures > 40 && failures < 180, "failures = {failures}");
    }
}
