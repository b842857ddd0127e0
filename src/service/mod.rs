//! # Resolution Service Module
//!
//! Typed client for the remote service that lists playlist tracks and
//! resolves them into audio. Every endpoint has exactly one request builder
//! here, all of them relative to the configured base URL.
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Used by |
//! |---|---|---|
//! | `are-credentials-set` | GET | `auth` preflight, `status` |
//! | `is-authenticated` | GET | [`auth::AuthPoller`] |
//! | `start-auth` | GET | [`auth::AuthPoller`] |
//! | `playlists` | GET | `playlists` command |
//! | `playlist-info` | POST | header of `tracks`, summary of `export` |
//! | `playlist-tracks` | POST | batch listing for `export` and `tracks` |
//! | acquisition endpoints | POST | [`acquire::EndpointStrategy`] |
//!
//! ## Base URL
//!
//! The base URL already contains any API path segment
//! (`http://127.0.0.1:8000/api`). Endpoint paths are appended with a single
//! slash and never prefixed again.

pub mod acquire;
pub mod auth;
pub mod tracks;

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    config,
    error::{AcquireError, Result},
    types::{AuthStatusResponse, CredentialsStatusResponse, ErrorBody},
    utils,
};

pub const CREDENTIALS_ENDPOINT: &str = "are-credentials-set";
pub const AUTH_STATUS_ENDPOINT: &str = "is-authenticated";
pub const START_AUTH_ENDPOINT: &str = "start-auth";
pub const PLAYLISTS_ENDPOINT: &str = "playlists";
pub const PLAYLIST_INFO_ENDPOINT: &str = "playlist-info";
pub const PLAYLIST_TRACKS_ENDPOINT: &str = "playlist-tracks";

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bound to one resolution service.
///
/// Cheap to clone; clones share the underlying connection pool. Every
/// request carries a timeout. Status checks use a short fixed one, capped by
/// the configured request timeout that listing calls use. Acquisition calls
/// take the timeout of their attempt.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ServiceClient {
    /// Creates a client for the service reachable at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Full base of the service including any API path
    ///   segment, e.g. `http://127.0.0.1:8000/api`
    ///
    /// # Example
    ///
    /// ```
    /// let client = ServiceClient::new("http://127.0.0.1:8000/api");
    /// assert_eq!(
    ///     client.endpoint("playlist-tracks"),
    ///     "http://127.0.0.1:8000/api/playlist-tracks"
    /// );
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            request_timeout: Duration::from_millis(config::DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Creates a client from `TRACKPORT_SERVICE_URL` and
    /// `TRACKPORT_REQUEST_TIMEOUT_MS`, falling back to their defaults.
    pub fn from_env() -> Self {
        Self::new(config::service_url()).with_request_timeout(config::request_timeout())
    }

    /// Sets the timeout applied to listing and authorization requests.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL of an endpoint.
    ///
    /// The path is joined to the base URL with exactly one slash. No other
    /// segment is ever prefixed.
    pub fn endpoint(&self, path: &str) -> String {
        utils::join_endpoint(&self.base_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Timeout for quick status calls, never longer than the request timeout.
    pub(crate) fn status_timeout(&self) -> Duration {
        STATUS_TIMEOUT.min(self.request_timeout)
    }

    /// Asks whether the service has API credentials configured.
    ///
    /// Used as a preflight before starting an authorization: without
    /// credentials the service cannot hand out an authorization URL.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(true)` - Credentials are set on the service
    /// - `Ok(false)` - The service still needs to be configured
    ///
    /// # Errors
    ///
    /// - [`AcquireError::Transport`] when the service cannot be reached or
    ///   does not answer within the status timeout
    /// - [`AcquireError::NonSuccessStatus`] for a non-2xx answer, carrying the
    ///   service's `error` or `detail` message
    /// - [`AcquireError::Decode`] when the body is not the expected JSON
    pub async fn credentials_configured(&self) -> Result<bool> {
        let res = self
            .http
            .get(self.endpoint(CREDENTIALS_ENDPOINT))
            .timeout(self.status_timeout())
            .send()
            .await?;
        let body: CredentialsStatusResponse = json_or_error(res).await?;
        Ok(body.credentials_set)
    }

    /// Asks whether the service currently holds a valid authorization.
    ///
    /// This is the check the authorization poller repeats while waiting for
    /// the user to complete the handoff.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(true)` - The service is authorized
    /// - `Ok(false)` - No authorization yet
    ///
    /// # Errors
    ///
    /// Same as [`ServiceClient::credentials_configured`].
    pub async fn is_authenticated(&self) -> Result<bool> {
        let res = self
            .http
            .get(self.endpoint(AUTH_STATUS_ENDPOINT))
            .timeout(self.status_timeout())
            .send()
            .await?;
        let body: AuthStatusResponse = json_or_error(res).await?;
        Ok(body.authenticated)
    }
}

/// Decodes a JSON body, turning non-2xx answers into
/// [`AcquireError::NonSuccessStatus`] with the service's error message.
pub(crate) async fn json_or_error<T: DeserializeOwned>(res: Response) -> Result<T> {
    if !res.status().is_success() {
        return Err(status_error(res).await);
    }
    res.json::<T>()
        .await
        .map_err(|e| AcquireError::Decode(e.to_string()))
}

/// Extracts the message of a failed answer: `error`, then `detail`, then the
/// raw body, then the HTTP reason phrase.
pub(crate) async fn status_error(res: Response) -> AcquireError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    AcquireError::NonSuccessStatus {
        status: status.as_u16(),
        message,
    }
}
