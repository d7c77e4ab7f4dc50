// ── Core error types ──
//
// User-facing errors from pentair-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<pentair_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants. The three-way setup/refresh taxonomy drives host behavior:
// fatal auth failures need reconfiguration, everything else is
// retryable at the host's cadence.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Setup errors ─────────────────────────────────────────────────
    /// Credentials were rejected. Fatal: requires user reconfiguration.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Setup failed for a non-auth reason. Transient: retry setup later.
    #[error("Setup failed: {message}")]
    SetupFailed { message: String },

    // ── Refresh errors ───────────────────────────────────────────────
    /// A refresh cycle failed as a whole. The previous device collection
    /// remains published; the host applies its own retry policy.
    #[error("Device update failed: {message}")]
    UpdateFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    // ── Command errors ───────────────────────────────────────────────
    /// Connection-level failure reaching the cloud.
    #[error("Cannot reach the Pentair cloud: {reason}")]
    ConnectionFailed { reason: String },

    /// Structured error from the cloud API.
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the host should stop retrying and ask the user
    /// to reconfigure credentials.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pentair_api::Error> for CoreError {
    fn from(err: pentair_api::Error) -> Self {
        match err {
            pentair_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            pentair_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            pentair_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "No session tokens configured".into(),
            },
            pentair_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            pentair_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pentair_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            pentair_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
