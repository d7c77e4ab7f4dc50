// Shared transport configuration for building reqwest::Client instances.
//
// The cloud API sits behind a public TLS endpoint, so there is no
// certificate wrangling here -- just timeout and user-agent tuning kept
// in one place so every client is built the same way.

use std::time::Duration;

const USER_AGENT: &str = concat!("pentair-cloud/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        Ok(reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?)
    }
}
