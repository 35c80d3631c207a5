use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub poll: PollConfig,
}

/// Which implementation of the valve API the dashboard talks to.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Sim {
        /// Number of simulated valves
        valve_count: usize,
    },
    Http {
        /// Base URL of the platform API, e.g. `https://api.example.com/api`
        base_url: String,
        /// Bearer token attached to every request
        token: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds between single-valve refreshes in watch mode
    pub status_interval_secs: u64,
    /// Seconds between fleet overview refreshes in watch mode
    pub fleet_interval_secs: u64,
    /// Milliseconds to wait after an accepted command before re-polling
    pub command_repoll_ms: u64,
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Sim { valve_count: 12 },
            poll: PollConfig {
                status_interval_secs: 10,
                fleet_interval_secs: 30,
                command_repoll_ms: 1000,
            },
        }
    }
}
