use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    acquisition::{AcquisitionOutcome, Strategy, StrategyChain},
    error::{AcquireError, Result},
    types::{AcquireRequest, TrackDescriptor},
};

use super::{ServiceClient, status_error};

impl ServiceClient {
    /// Asks one acquisition endpoint for the audio of a track.
    ///
    /// POSTs `{ track_name, artist }` to the endpoint and reads the whole
    /// answer body as the payload. This is a single attempt; retries and
    /// fallback to other endpoints belong to the orchestrator.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path of the acquisition endpoint, e.g. `stream-track`
    /// * `track` - Track to resolve
    /// * `timeout` - Budget of this attempt, covering connect and body
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<u8>)` - Non-empty audio payload
    /// - `Err(AcquireError)` - The attempt failed
    ///
    /// # Errors
    ///
    /// - [`AcquireError::Timeout`] when the attempt exceeds `timeout`
    /// - [`AcquireError::Transport`] for connection failures
    /// - [`AcquireError::NonSuccessStatus`] for a non-2xx answer, carrying the
    ///   service's `error` or `detail` message
    /// - [`AcquireError::EmptyPayload`] for a success status with no bytes
    ///
    /// All of them are retryable.
    pub async fn acquire(
        &self,
        endpoint: &str,
        track: &TrackDescriptor,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let res = self
            .http()
            .post(self.endpoint(endpoint))
            .json(&AcquireRequest::from(track))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        if !res.status().is_success() {
            return Err(status_error(res).await);
        }

        let payload = res.bytes().await.map_err(|e| transport_error(e, timeout))?;
        if payload.is_empty() {
            return Err(AcquireError::EmptyPayload);
        }

        Ok(payload.to_vec())
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> AcquireError {
    if err.is_timeout() {
        AcquireError::Timeout(timeout)
    } else {
        AcquireError::Transport(err.to_string())
    }
}

/// Strategy bound to a single acquisition endpoint of the service.
#[derive(Debug, Clone)]
pub struct EndpointStrategy {
    endpoint: String,
    client: ServiceClient,
}

impl EndpointStrategy {
    pub fn new(client: ServiceClient, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl Strategy for EndpointStrategy {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn attempt(&self, track: &TrackDescriptor, timeout: Duration) -> AcquisitionOutcome {
        self.client
            .acquire(&self.endpoint, track, timeout)
            .await
            .into()
    }
}

/// Builds the chain from an ordered list of endpoint names.
///
/// The first endpoint is tried first. Each one becomes an
/// [`EndpointStrategy`] sharing the client's connection pool.
pub fn endpoint_chain(client: &ServiceClient, endpoints: &[String]) -> StrategyChain {
    endpoints
        .iter()
        .map(|endpoint| {
            Arc::new(EndpointStrategy::new(client.clone(), endpoint.clone())) as Arc<dyn Strategy>
        })
        .collect()
}
