// ── Runtime account configuration ──
//
// These types describe *how* to reach the Pentair cloud for one account.
// They carry credential data and polling tuning, but never touch disk.
// The embedding host (or pentair-config) constructs an `AccountConfig`
// and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Production cloud endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.pentair.cloud";

/// Default polling cadence for the background refresh task.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// How to authenticate with the cloud.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Username + password login.
    Password {
        username: String,
        password: SecretString,
    },
    /// A saved session token triple from a previous login.
    Tokens {
        access_token: SecretString,
        id_token: SecretString,
        refresh_token: SecretString,
    },
}

/// Configuration for one cloud account.
///
/// Built by the host or by `pentair-config` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Cloud base URL. Overridable for testing.
    pub base_url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// Request timeout.
    pub timeout: Duration,
    /// How often the background task refreshes (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl AccountConfig {
    /// Config for the production cloud with the default 30s cadence.
    pub fn new(auth: AuthCredentials) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            auth,
            timeout: Duration::from_secs(30),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}
