//! Shared configuration for Pentair cloud tools.
//!
//! TOML accounts, credential resolution (env + plaintext), and
//! translation to `pentair_core::AccountConfig`. Host runtimes that
//! manage their own credentials can skip this crate and build an
//! `AccountConfig` directly.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pentair_core::{AccountConfig, AuthCredentials, DEFAULT_BASE_URL, DEFAULT_REFRESH_INTERVAL_SECS};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no account named '{account}' in config")]
    UnknownAccount { account: String },

    #[error("no credentials configured for account '{account}'")]
    NoCredentials { account: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default account name.
    pub default_account: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named cloud accounts.
    #[serde(default)]
    pub accounts: HashMap<String, Account>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_account: Some("default".into()),
            defaults: Defaults::default(),
            accounts: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

/// A named cloud account.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Account {
    /// Cloud base URL override. Defaults to the production endpoint.
    pub base_url: Option<String>,

    /// Account email / username.
    pub username: Option<String>,

    /// Password (plaintext — prefer env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Saved session tokens from a previous login. When all three are
    /// present they take priority over the password chain.
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override refresh cadence (seconds). 0 disables background polling.
    pub refresh_interval_secs: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "poolhouse", "pentair-cloud").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pentair-cloud");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from an explicit file + environment.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PENTAIR_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve credentials for an account.
///
/// A complete saved token triple wins; otherwise the password comes
/// from the first source that yields one: the account's `password_env`
/// variable, `PENTAIR_PASSWORD`, then the plaintext `password` field.
pub fn resolve_credentials(
    account: &Account,
    account_name: &str,
) -> Result<AuthCredentials, ConfigError> {
    if let (Some(access), Some(id), Some(refresh)) = (
        account.access_token.as_ref(),
        account.id_token.as_ref(),
        account.refresh_token.as_ref(),
    ) {
        return Ok(AuthCredentials::Tokens {
            access_token: SecretString::from(access.clone()),
            id_token: SecretString::from(id.clone()),
            refresh_token: SecretString::from(refresh.clone()),
        });
    }

    let username = account
        .username
        .clone()
        .or_else(|| std::env::var("PENTAIR_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            account: account_name.into(),
        })?;

    let password = account
        .password_env
        .as_ref()
        .and_then(|env_name| std::env::var(env_name).ok())
        .or_else(|| std::env::var("PENTAIR_PASSWORD").ok())
        .or_else(|| account.password.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            account: account_name.into(),
        })?;

    Ok(AuthCredentials::Password {
        username,
        password: SecretString::from(password),
    })
}

// ── Translation to core config ──────────────────────────────────────

/// Build an `AccountConfig` from a named account entry.
pub fn account_to_config(
    cfg: &Config,
    account_name: &str,
) -> Result<AccountConfig, ConfigError> {
    let account = cfg
        .accounts
        .get(account_name)
        .ok_or_else(|| ConfigError::UnknownAccount {
            account: account_name.into(),
        })?;

    let base_url: url::Url = account
        .base_url
        .as_deref()
        .unwrap_or(DEFAULT_BASE_URL)
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!(
                "invalid URL: {}",
                account.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
            ),
        })?;

    let auth = resolve_credentials(account, account_name)?;

    Ok(AccountConfig {
        base_url,
        auth,
        timeout: Duration::from_secs(account.timeout.unwrap_or(cfg.defaults.timeout)),
        refresh_interval_secs: account
            .refresh_interval_secs
            .unwrap_or(cfg.defaults.refresh_interval_secs),
    })
}

/// Build an `AccountConfig` for the default account.
pub fn default_account_config(cfg: &Config) -> Result<AccountConfig, ConfigError> {
    let name = cfg.default_account.as_deref().unwrap_or("default");
    account_to_config(cfg, name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            let cfg = load_config_from(std::path::Path::new("config.toml")).unwrap();
            assert_eq!(cfg.default_account.as_deref(), Some("default"));
            assert_eq!(cfg.defaults.timeout, 30);
            assert_eq!(cfg.defaults.refresh_interval_secs, 30);
            assert!(cfg.accounts.is_empty());
            Ok(())
        });
    }

    #[test]
    fn account_entry_round_trips() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_account = "home"

                [accounts.home]
                username = "pool@example.com"
                password = "hunter2"
                refresh_interval_secs = 60
                "#,
            )?;
            let cfg = load_config_from(std::path::Path::new("config.toml")).unwrap();
            let account = account_to_config(&cfg, "home").unwrap();

            assert_eq!(account.base_url.as_str(), "https://api.pentair.cloud/");
            assert_eq!(account.refresh_interval_secs, 60);
            assert_eq!(account.timeout, Duration::from_secs(30));
            match account.auth {
                AuthCredentials::Password { username, password } => {
                    assert_eq!(username, "pool@example.com");
                    assert_eq!(password.expose_secret(), "hunter2");
                }
                AuthCredentials::Tokens { .. } => panic!("expected password credentials"),
            }
            Ok(())
        });
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [accounts.home]
                username = "pool@example.com"
                password = "stale"
                password_env = "POOL_PASSWORD"
                "#,
            )?;
            jail.set_env("POOL_PASSWORD", "fresh");

            let cfg = load_config_from(std::path::Path::new("config.toml")).unwrap();
            let auth = resolve_credentials(cfg.accounts.get("home").unwrap(), "home").unwrap();
            match auth {
                AuthCredentials::Password { password, .. } => {
                    assert_eq!(password.expose_secret(), "fresh");
                }
                AuthCredentials::Tokens { .. } => panic!("expected password credentials"),
            }
            Ok(())
        });
    }

    #[test]
    fn saved_tokens_win_over_password() {
        let account = Account {
            username: Some("pool@example.com".into()),
            password: Some("hunter2".into()),
            access_token: Some("acc".into()),
            id_token: Some("id".into()),
            refresh_token: Some("ref".into()),
            ..Account::default()
        };
        let auth = resolve_credentials(&account, "home").unwrap();
        match auth {
            AuthCredentials::Tokens { id_token, .. } => {
                assert_eq!(id_token.expose_secret(), "id");
            }
            AuthCredentials::Password { .. } => panic!("expected token credentials"),
        }
    }

    #[test]
    fn missing_credentials_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [accounts.home]
                base_url = "https://pool.example.test"
                "#,
            )?;
            let cfg = load_config_from(std::path::Path::new("config.toml")).unwrap();
            let err = account_to_config(&cfg, "home").unwrap_err();
            assert!(matches!(err, ConfigError::NoCredentials { ref account } if account == "home"));
            Ok(())
        });
    }

    #[test]
    fn unknown_account_is_an_error() {
        let cfg = Config::default();
        let err = account_to_config(&cfg, "nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAccount { ref account } if account == "nope"));
    }

    #[test]
    fn invalid_base_url_is_a_validation_error() {
        let mut cfg = Config::default();
        cfg.accounts.insert(
            "home".into(),
            Account {
                base_url: Some("not a url".into()),
                username: Some("pool@example.com".into()),
                password: Some("hunter2".into()),
                ..Account::default()
            },
        );
        let err = account_to_config(&cfg, "home").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "base_url"));
    }
}
