// Session token handling for the Pentair cloud.
//
// The cloud issues a Cognito-style token triple on login. The id token
// authorizes API calls; the refresh token mints a new triple when the
// id token expires. Expiry is tracked locally from `expiresIn` --
// restored sessions without a known expiry are trusted until the API
// rejects them.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

use crate::types::TokenResponse;

/// Refresh this long before the tracked expiry to avoid racing the clock.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A session token triple plus its locally tracked expiry.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: SecretString,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
    /// `None` for restored sessions whose expiry is unknown.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthTokens {
    /// Build tokens from a restored session (expiry unknown).
    pub fn restored(
        access_token: SecretString,
        id_token: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            access_token,
            id_token,
            refresh_token,
            expires_at: None,
        }
    }

    /// Whether the id token is expired (or about to be).
    ///
    /// Tokens with unknown expiry are never considered expired here;
    /// the API's 401 is the backstop for those.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= at,
            None => false,
        }
    }

    pub(crate) fn from_response(resp: TokenResponse, previous_refresh: Option<SecretString>) -> Self {
        // Refresh responses omit the refresh token; keep the one we have.
        let refresh_token = resp
            .refresh_token
            .map(SecretString::from)
            .or(previous_refresh)
            .unwrap_or_else(|| SecretString::from(String::new()));

        Self {
            access_token: SecretString::from(resp.access_token),
            id_token: SecretString::from(resp.id_token),
            refresh_token,
            expires_at: resp
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn restored_tokens_are_not_expired() {
        let tokens = AuthTokens::restored(secret("a"), secret("i"), secret("r"));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn tokens_within_margin_are_expired() {
        let mut tokens = AuthTokens::restored(secret("a"), secret("i"), secret("r"));
        tokens.expires_at = Some(Utc::now() + Duration::seconds(30));
        assert!(tokens.is_expired());
    }

    #[test]
    fn tokens_past_expiry_are_expired() {
        let mut tokens = AuthTokens::restored(secret("a"), secret("i"), secret("r"));
        tokens.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(tokens.is_expired());
    }

    #[test]
    fn fresh_tokens_are_valid() {
        let mut tokens = AuthTokens::restored(secret("a"), secret("i"), secret("r"));
        tokens.expires_at = Some(Utc::now() + Duration::seconds(3600));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn refresh_response_keeps_previous_refresh_token() {
        use secrecy::ExposeSecret;

        let resp = TokenResponse {
            access_token: "new-access".into(),
            id_token: "new-id".into(),
            refresh_token: None,
            expires_in: Some(3600),
        };
        let tokens = AuthTokens::from_response(resp, Some(secret("old-refresh")));
        assert_eq!(tokens.refresh_token.expose_secret(), "old-refresh");
        assert!(tokens.expires_at.is_some());
    }
}
