use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{error::AcquireError, types::TrackDescriptor};

/// Result of a single strategy attempt.
#[derive(Debug)]
pub enum AcquisitionOutcome {
    Success { payload: Vec<u8> },
    Failure { reason: AcquireError },
}

impl AcquisitionOutcome {
    pub fn payload_size(&self) -> Option<usize> {
        match self {
            AcquisitionOutcome::Success { payload } => Some(payload.len()),
            AcquisitionOutcome::Failure { .. } => None,
        }
    }

    /// A success with no bytes is a failure like any transport error.
    pub fn normalized(self) -> Self {
        match self {
            AcquisitionOutcome::Success { payload } if payload.is_empty() => {
                AcquisitionOutcome::Failure {
                    reason: AcquireError::EmptyPayload,
                }
            }
            other => other,
        }
    }
}

impl From<Result<Vec<u8>, AcquireError>> for AcquisitionOutcome {
    fn from(result: Result<Vec<u8>, AcquireError>) -> Self {
        match result {
            Ok(payload) => AcquisitionOutcome::Success { payload },
            Err(reason) => AcquisitionOutcome::Failure { reason },
        }
    }
}

/// One named way of acquiring a track.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    async fn attempt(&self, track: &TrackDescriptor, timeout: Duration) -> AcquisitionOutcome;
}

/// Ordered strategies, the first one is tried first.
#[derive(Clone, Default)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Strategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }
}

impl FromIterator<Arc<dyn Strategy>> for StrategyChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Strategy>>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_success_is_normalized_to_failure() {
        let outcome = AcquisitionOutcome::Success {
            payload: Vec::new(),
        }
        .normalized();
        assert!(matches!(
            outcome,
            AcquisitionOutcome::Failure {
                reason: AcquireError::EmptyPayload
            }
        ));
    }

    #[test]
    fn payload_size_reports_bytes() {
        let outcome = AcquisitionOutcome::from(Ok(vec![1, 2, 3]));
        assert_eq!(outcome.payload_size(), Some(3));
    }
}
