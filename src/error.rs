//! Error types for track acquisition and authorization.
//!
//! A single taxonomy covers everything that can go wrong while talking to
//! the resolution service. Whether an error is retried, escalated to the
//! next strategy, recorded per track or treated as fatal is decided by the
//! caller, see [`AcquireError::is_retryable`].

use std::time::Duration;

use thiserror::Error;

/// Result type alias for acquisition operations.
pub type Result<T> = std::result::Result<T, AcquireError>;

#[derive(Debug, Error)]
pub enum AcquireError {
    /// Connection level failure talking to the resolution service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within its own timeout.
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The service answered with a success status but no bytes.
    #[error("empty payload received")]
    EmptyPayload,

    /// The service reported a failure for this request.
    #[error("service returned {status}: {message}")]
    NonSuccessStatus { status: u16, message: String },

    #[error("authentication timed out, please try again")]
    AuthorizationTimeout,

    #[error("authorization rejected: {0}")]
    AuthorizationRejected(String),

    /// Listing the batch failed, nothing was attempted.
    #[error("{0}")]
    BatchListingFailure(String),

    /// Every strategy in the chain gave up on the track.
    #[error("all sources failed after {attempts} attempts ({last_error})")]
    PerTrackExhausted { attempts: u32, last_error: String },

    /// Writing the payload to its destination failed.
    #[error("could not save file: {0}")]
    Delivery(#[from] std::io::Error),

    /// The service answered with a body that could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl AcquireError {
    /// Returns true for failures of a single strategy attempt that the retry
    /// policy is allowed to repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AcquireError::Transport(_)
                | AcquireError::Timeout(_)
                | AcquireError::EmptyPayload
                | AcquireError::NonSuccessStatus { .. }
                | AcquireError::Decode(_)
        )
    }
}

impl From<reqwest::Error> for AcquireError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AcquireError::Decode(err.to_string())
        } else {
            AcquireError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_failures_are_retryable() {
        assert!(AcquireError::EmptyPayload.is_retryable());
        assert!(AcquireError::Transport("reset".into()).is_retryable());
        assert!(AcquireError::Timeout(Duration::from_secs(45)).is_retryable());
        assert!(
            AcquireError::NonSuccessStatus {
                status: 500,
                message: "blocked".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn terminal_failures_are_not_retryable() {
        assert!(!AcquireError::AuthorizationTimeout.is_retryable());
        assert!(!AcquireError::BatchListingFailure("nope".into()).is_retryable());
        assert!(
            !AcquireError::PerTrackExhausted {
                attempts: 6,
                last_error: "empty payload received".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn batch_listing_message_is_verbatim() {
        let err = AcquireError::BatchListingFailure("Invalid Spotify playlist URL".into());
        assert_eq!(err.to_string(), "Invalid Spotify playlist URL");
    }
}
