// Pentair cloud HTTP client
//
// Wraps `reqwest::Client` with envelope unwrapping, bearer-token
// injection, and session token management. Endpoint coverage is small
// by design: the cloud exposes a device list, a per-device detail
// record, and one writable control (the active pump program).

use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::AuthTokens;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{ApiErrorBody, DeviceDetails, DeviceStub, Envelope, TokenResponse};

/// Raw HTTP client for the Pentair cloud API.
///
/// Handles the `{ "data": ... }` envelope and the bearer-token header.
/// All methods return unwrapped `data` payloads -- the envelope is
/// stripped before the caller sees it. Session tokens live behind an
/// interior lock so the client can be shared across tasks.
pub struct PentairClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: RwLock<Option<AuthTokens>>,
}

impl PentairClient {
    /// Create a new client from a `TransportConfig`. Does not perform I/O.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            tokens: RwLock::new(None),
        })
    }

    /// The cloud base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session management ───────────────────────────────────────────

    /// Log in with username and password, storing the issued tokens.
    ///
    /// `POST auth/login`
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url("auth/login")?;
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp: TokenResponse = self.post(url, &body).await?;
        self.store_tokens(AuthTokens::from_response(resp, None));
        Ok(())
    }

    /// Resume a previously saved session.
    pub fn restore_tokens(&self, tokens: AuthTokens) {
        self.store_tokens(tokens);
    }

    /// The current session tokens, if any.
    pub fn tokens(&self) -> Option<AuthTokens> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mint a new token triple from the stored refresh token.
    ///
    /// `POST auth/refresh`
    pub async fn refresh_session(&self) -> Result<(), Error> {
        let refresh_token = self
            .tokens()
            .map(|t| t.refresh_token)
            .ok_or(Error::NotAuthenticated)?;

        let url = self.api_url("auth/refresh")?;
        debug!("refreshing session tokens");

        let body = json!({ "refreshToken": refresh_token.expose_secret() });

        let resp: TokenResponse = self.post(url, &body).await.map_err(|e| {
            if e.is_auth() {
                Error::SessionExpired
            } else {
                e
            }
        })?;

        self.store_tokens(AuthTokens::from_response(resp, Some(refresh_token)));
        Ok(())
    }

    /// Ensure a usable session: error if no tokens are stored, refresh
    /// if the tracked expiry has passed, otherwise a no-op.
    pub async fn authenticate(&self) -> Result<(), Error> {
        let tokens = self.tokens().ok_or(Error::NotAuthenticated)?;
        if tokens.is_expired() {
            self.refresh_session().await?;
        }
        Ok(())
    }

    // ── Device endpoints ─────────────────────────────────────────────

    /// List the account's devices (identity and type only).
    ///
    /// `GET devices`
    pub async fn get_devices(&self) -> Result<Vec<DeviceStub>, Error> {
        let url = self.api_url("devices")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// Fetch the full detail record for one device.
    ///
    /// `GET devices/{id}`
    pub async fn get_device(&self, device_id: &str) -> Result<DeviceDetails, Error> {
        let url = self.api_url(&format!("devices/{device_id}"))?;
        debug!(device_id, "fetching device detail");
        self.get(url).await
    }

    /// Set the active pump program on a pump controller.
    ///
    /// `PUT devices/{id}` with `{"payload": {"activeProgram": n}}`
    pub async fn set_active_program(&self, device_id: &str, program: u32) -> Result<(), Error> {
        let url = self.api_url(&format!("devices/{device_id}"))?;
        debug!(device_id, program, "setting active pump program");

        let body = json!({ "payload": { "activeProgram": program } });
        let _: serde_json::Value = self.put(url, &body).await?;
        Ok(())
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'));
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn store_tokens(&self, tokens: AuthTokens) {
        *self
            .tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    fn bearer(&self) -> Option<String> {
        self.tokens()
            .map(|t| format!("Bearer {}", t.id_token.expose_secret()))
    }

    /// Send a GET request and unwrap the envelope.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let mut req = self.http.get(url);
        if let Some(bearer) = self.bearer() {
            req = req.header(reqwest::header::AUTHORIZATION, bearer);
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let mut req = self.http.post(url).json(body);
        if let Some(bearer) = self.bearer() {
            req = req.header(reqwest::header::AUTHORIZATION, bearer);
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Send a PUT request with JSON body and unwrap the envelope.
    async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, Error> {
        debug!("PUT {url}");

        let mut req = self.http.put(url).json(body);
        if let Some(bearer) = self.bearer() {
            req = req.header(reqwest::header::AUTHORIZATION, bearer);
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Parse the `{ "data": ... }` envelope, returning `data` on success
    /// or a typed error for 401 / non-2xx / undecodable bodies.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let err: ApiErrorBody = serde_json::from_str(&body).unwrap_or(ApiErrorBody {
                code: None,
                message: None,
            });
            return Err(Error::Api {
                message: err.message.unwrap_or_else(|| format!("HTTP {status}")),
                code: err.code,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        Ok(envelope.data)
    }
}
