use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{sync::watch, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    config,
    error::{AcquireError, Result},
    types::{AuthSession, AuthState, StartAuthResponse},
};

use super::{START_AUTH_ENDPOINT, ServiceClient, json_or_error};

/// The two service calls the authorization flow needs.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn start_authorization(&self) -> Result<StartAuthResponse>;

    async fn is_authenticated(&self) -> Result<bool>;
}

#[async_trait]
impl AuthBackend for ServiceClient {
    async fn start_authorization(&self) -> Result<StartAuthResponse> {
        let res = self
            .http()
            .get(self.endpoint(START_AUTH_ENDPOINT))
            .timeout(self.status_timeout())
            .send()
            .await?;
        json_or_error(res).await
    }

    async fn is_authenticated(&self) -> Result<bool> {
        ServiceClient::is_authenticated(self).await
    }
}

/// Waits for an out-of-band authorization to complete.
///
/// The flow is:
/// 1. **Handoff**: request an authorization URL and hand it to the caller
/// 2. **Polling**: check the authentication status at a fixed interval
/// 3. **Terminal state**: `authenticated`, `timed_out` or `failed`
///
/// Transport errors while polling are logged and polling goes on. No status
/// check is issued once the timeout has elapsed. Cancelling discards the
/// session and returns it reset to `idle`.
///
/// Every transition is published, see [`AuthPoller::subscribe`]. A raised
/// cancel signal only discards the flow it interrupted, the next call to
/// [`AuthPoller::begin_authorization`] runs with a fresh one.
pub struct AuthPoller {
    backend: Arc<dyn AuthBackend>,
    interval: Duration,
    timeout: Duration,
    cancel: Mutex<CancellationToken>,
    session: watch::Sender<AuthSession>,
}

impl AuthPoller {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (session, _) = watch::channel(AuthSession::default());
        Self {
            backend,
            interval: Duration::from_millis(config::DEFAULT_AUTH_POLL_MS),
            timeout: Duration::from_millis(config::DEFAULT_AUTH_TIMEOUT_MS),
            cancel: Mutex::new(CancellationToken::new()),
            session,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(config::MIN_WAIT_MS));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Mutex::new(cancel);
        self
    }

    /// Signal that discards the running flow, or the next one if none runs.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.session.subscribe()
    }

    /// Runs the flow to a terminal state. `on_handoff` receives the URL the
    /// user has to visit.
    pub async fn begin_authorization<F>(&self, on_handoff: F) -> AuthSession
    where
        F: FnOnce(&str),
    {
        let cancel = self.cancel_token();
        let session = self.run(&cancel, on_handoff).await;
        self.rearm();
        session
    }

    async fn run<F>(&self, cancel: &CancellationToken, on_handoff: F) -> AuthSession
    where
        F: FnOnce(&str),
    {
        self.publish(AuthSession::default());

        let started = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.discard(),
            started = self.backend.start_authorization() => started,
        };

        let auth_url = match started {
            Ok(StartAuthResponse {
                success: true,
                auth_url: Some(url),
                ..
            }) if !url.trim().is_empty() => url,
            Ok(StartAuthResponse { error, .. }) => {
                return self.finish_failed(
                    AuthState::Failed,
                    error.unwrap_or_else(|| "Authentication failed".to_string()),
                );
            }
            Err(e) => return self.finish_failed(AuthState::Failed, e.to_string()),
        };

        self.publish(AuthSession {
            state: AuthState::AwaitingAuthorization,
            auth_url: Some(auth_url.clone()),
            ..AuthSession::default()
        });
        on_handoff(&auth_url);

        let polling_since = Instant::now();
        self.publish(AuthSession {
            state: AuthState::Polling,
            auth_url: Some(auth_url.clone()),
            deadline: chrono::Duration::from_std(self.timeout)
                .ok()
                .map(|timeout| Utc::now() + timeout),
            failure: None,
        });

        loop {
            let remaining = self.timeout.saturating_sub(polling_since.elapsed());
            if remaining.is_zero() {
                return self.finish_timed_out();
            }

            let tick = tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                _ = tokio::time::sleep(self.interval.min(remaining)) => true,
            };
            if !tick {
                return self.discard();
            }

            let remaining = self.timeout.saturating_sub(polling_since.elapsed());
            if remaining.is_zero() {
                return self.finish_timed_out();
            }

            let checked = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.discard(),
                checked = tokio::time::timeout(remaining, self.backend.is_authenticated()) => checked,
            };

            match checked {
                Ok(Ok(true)) => {
                    tracing::info!("authorization completed");
                    return self.finish(AuthState::Authenticated, None);
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "authorization status check failed"),
                Err(_) => return self.finish_timed_out(),
            }
        }
    }

    fn finish_timed_out(&self) -> AuthSession {
        tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "authorization timed out");
        self.finish_failed(
            AuthState::TimedOut,
            AcquireError::AuthorizationTimeout.to_string(),
        )
    }

    fn finish_failed(&self, state: AuthState, reason: String) -> AuthSession {
        self.finish(state, Some(reason))
    }

    fn finish(&self, state: AuthState, failure: Option<String>) -> AuthSession {
        let mut session = self.session.borrow().clone();
        session.state = state;
        session.failure = failure;
        self.publish(session.clone());
        session
    }

    fn discard(&self) -> AuthSession {
        tracing::info!("authorization cancelled");
        self.publish(AuthSession::default());
        AuthSession::default()
    }

    fn rearm(&self) {
        let mut cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if cancel.is_cancelled() {
            *cancel = CancellationToken::new();
        }
    }

    fn publish(&self, session: AuthSession) {
        self.session.send_replace(session);
    }
}
