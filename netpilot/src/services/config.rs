//! Endpoints and poll settings.

use std::time::Duration;

/// Voice service list of aliased stations.
pub const DEFAULT_ALIAS_URL: &str = "https://voice1.vatsim.net/api/v1/stations/aliased";

/// Network server list.
pub const DEFAULT_SERVER_LIST_URL: &str = "https://data.vatsim.net/vatsim-servers.json";

/// The alias table changes rarely.
pub const DEFAULT_ALIAS_POLL_INTERVAL_SECS: u64 = 300;

/// Configuration for the alias table adapter.
#[derive(Debug, Clone)]
pub struct AliasAdapterConfig {
    pub url: String,
    pub poll_interval: Duration,
}

impl Default for AliasAdapterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ALIAS_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_ALIAS_POLL_INTERVAL_SECS),
        }
    }
}
