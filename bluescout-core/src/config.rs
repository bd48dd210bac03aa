use std::time::Duration;

use serde::Deserialize;

/// Tunables for the discovery coordinator.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Hard cap on one low-energy pass. The platform never ends an
    /// advertisement scan on its own, so this bound is load-bearing.
    pub low_energy_timeout: Duration,
    /// Capacity of the consumer-facing broadcast channel.
    pub event_capacity: usize,
    /// Capacity of the internal found-device channel between a scanner pass
    /// and the coordinator pump.
    pub found_capacity: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            low_energy_timeout: Duration::from_secs(12),
            event_capacity: 64,
            found_capacity: 32,
        }
    }
}
