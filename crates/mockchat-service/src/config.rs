//! Runtime tuning of the simulated network through a flat string map.
//!
//! Values are JSON scalars (`true`, `750`). A batch is parsed and checked in
//! full before anything is applied, so a bad value leaves the network as it
//! was. Keys that are absent keep their current value.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use tracing::info;

use mockchat_net::Network;

use crate::error::ServiceError;

pub const FAILURES_ENABLED: &str = "network.failuresEnabled";
pub const MIN_LATENCY_MS: &str = "network.minLatencyMs";
pub const MAX_LATENCY_MS: &str = "network.maxLatencyMs";

#[derive(Debug, Clone)]
pub struct Configurator {
    network: Network,
}

fn field<T: DeserializeOwned>(
    config: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, ServiceError> {
    config
        .get(key)
        .map(|raw| serde_json::from_str(raw).map_err(|e| ServiceError::config(key, e)))
        .transpose()
}

impl Configurator {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// Current values, rendered the way `set_configuration` accepts them.
    pub fn configuration(&self) -> BTreeMap<String, String> {
        let config = self.network.config();
        BTreeMap::from([
            (
                FAILURES_ENABLED.to_string(),
                config.failures_enabled().to_string(),
            ),
            (
                MIN_LATENCY_MS.to_string(),
                config.min_latency_ms().to_string(),
            ),
            (
                MAX_LATENCY_MS.to_string(),
                config.max_latency_ms().to_string(),
            ),
        ])
    }

    pub fn set_configuration(&self, config: &HashMap<String, String>) -> Result<(), ServiceError> {
        let failures: Option<bool> = field(config, FAILURES_ENABLED)?;
        let min: Option<u64> = field(config, MIN_LATENCY_MS)?;
        let max: Option<u64> = field(config, MAX_LATENCY_MS)?;

        let current = self.network.config();
        let lo = min.unwrap_or_else(|| current.min_latency_ms());
        let hi = max.unwrap_or_else(|| current.max_latency_ms());
        if lo > hi {
            return Err(ServiceError::config(
                MAX_LATENCY_MS,
                format!("{hi} is below the minimum latency {lo}"),
            ));
        }

        if let Some(enabled) = failures {
            current.set_failures_enabled(enabled);
        }
        if let Some(ms) = min {
            current.set_min_latency_ms(ms);
        }
        if let Some(ms) = max {
            current.set_max_latency_ms(ms);
        }

        info!(
            failures_enabled = current.failures_enabled(),
            min_latency_ms = current.min_latency_ms(),
            max_latency_ms = current.max_latency_ms(),
            "network configuration changed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reports_defaults() {
        let cfg = Configurator::new(Network::default()).configuration();
        assert_eq!(cfg[FAILURES_ENABLED], "true");
        assert_eq!(cfg[MIN_LATENCY_MS], "500");
        assert_eq!(cfg[MAX_LATENCY_MS], "3000");
    }

    #[test]
    fn applies_all_keys() {
        let network = Network::default();
        let configurator = Configurator::new(network.clone());
        configurator
            .set_configuration(&map(&[
                (FAILURES_ENABLED, "false"),
                (MIN_LATENCY_MS, "10"),
                (MAX_LATENCY_MS, "20"),
            ]))
            .unwrap();

        assert!(!network.config().failures_enabled());
        assert_eq!(network.config().min_latency_ms(), 10);
        assert_eq!(network.config().max_latency_ms(), 20);
        assert_eq!(configurator.configuration()[MAX_LATENCY_MS], "20");
    }

    #[test]
    fn missing_keys_are_left_alone() {
        let network = Network::default();
        Configurator::new(network.clone())
            .set_configuration(&map(&[(MAX_LATENCY_MS, "4000")]))
            .unwrap();

        assert!(network.config().failures_enabled());
        assert_eq!(network.config().min_latency_ms(), 500);
        assert_eq!(network.config().max_latency_ms(), 4000);
    }

    #[test]
    fn malformed_value_names_its_key_and_applies_nothing() {
        let network = Network::default();
        let err = Configurator::new(network.clone())
            .set_configuration(&map(&[
                (FAILURES_ENABLED, "false"),
                (MIN_LATENCY_MS, "soon"),
            ]))
            .unwrap_err();

        assert!(matches!(err, ServiceError::Config { key, .. } if key == MIN_LATENCY_MS));
        assert!(network.config().failures_enabled());
        assert_eq!(network.config().min_latency_ms(), 500);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let network = Network::default();
        let err = Configurator::new(network.clone())
            .set_configuration(&map(&[(MIN_LATENCY_MS, "5000")]))
            .unwrap_err();

        assert!(matches!(err, ServiceError::Config { key, .. } if key == MAX_LATENCY_MS));
        assert_eq!(network.config().min_latency_ms(), 500);
    }
}
