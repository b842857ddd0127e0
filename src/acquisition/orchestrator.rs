//! Sequential batch acquisition.
//!
//! Tracks are processed one at a time in input order. For each track the
//! strategy chain is walked with the retry policy applied per strategy, the
//! payload is handed to the sink and progress is published. A pacing delay
//! separates two tracks so the upstream sources do not throttle us.
//!
//! Cancellation is checked before every track and also interrupts in-flight
//! attempts, backoff waits and the pacing delay. An interrupted track is
//! neither counted as successful nor recorded as failed.
//!
//! A raised cancel signal belongs to the run it stops. Once that run has
//! ended the orchestrator arms a fresh signal, so the next run on the same
//! instance starts clean. Handles from [`Orchestrator::cancel_token`] target
//! the current or upcoming run.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use super::{
    progress::{ProgressReader, ProgressWriter},
    retry::{RetryDecision, RetryPolicy},
    sink::PayloadSink,
    strategy::{AcquisitionOutcome, StrategyChain},
};
use crate::{
    config,
    error::AcquireError,
    types::{BatchReport, FailedTrackRecord, Status, TrackDescriptor},
};

pub struct Orchestrator {
    chain: StrategyChain,
    policy: RetryPolicy,
    pacing: Duration,
    sink: Arc<dyn PayloadSink>,
    progress: ProgressWriter,
    cancel: Mutex<CancellationToken>,
}

impl Orchestrator {
    pub fn new(chain: StrategyChain, sink: Arc<dyn PayloadSink>, progress: ProgressWriter) -> Self {
        Self {
            chain,
            policy: RetryPolicy::default(),
            pacing: Duration::from_millis(config::MIN_PACING_MS),
            sink,
            progress,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Mutex::new(cancel);
        self
    }

    /// Signal that stops the current run, or the next one if none is running.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn progress(&self) -> ProgressReader {
        self.progress.subscribe()
    }

    /// Runs a batch whose tracks still have to be listed.
    ///
    /// A failing listing ends the run in `error` with the message verbatim and
    /// no track is attempted.
    pub async fn run_listed<F>(&self, listing: F) -> BatchReport
    where
        F: Future<Output = Result<Vec<TrackDescriptor>, AcquireError>>,
    {
        let cancel = self.cancel_token();
        let report = self.listed(&cancel, listing).await;
        self.rearm();
        report
    }

    pub async fn run_batch(&self, tracks: Vec<TrackDescriptor>) -> BatchReport {
        let cancel = self.cancel_token();
        let report = self.batch(&cancel, tracks).await;
        self.rearm();
        report
    }

    async fn listed<F>(&self, cancel: &CancellationToken, listing: F) -> BatchReport
    where
        F: Future<Output = Result<Vec<TrackDescriptor>, AcquireError>>,
    {
        self.progress.start(0);

        let listed = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            listed = listing => Some(listed),
        };

        match listed {
            None => {
                self.progress.cancelled();
                BatchReport {
                    status: Status::Cancelled,
                    ..BatchReport::default()
                }
            }
            Some(Ok(tracks)) => self.batch(cancel, tracks).await,
            Some(Err(e)) => {
                let message = match e {
                    AcquireError::BatchListingFailure(message) => message,
                    other => other.to_string(),
                };
                tracing::error!(error = %message, "batch listing failed");
                self.progress.failed(message.clone());
                BatchReport {
                    status: Status::Error,
                    error: Some(message),
                    ..BatchReport::default()
                }
            }
        }
    }

    async fn batch(&self, cancel: &CancellationToken, tracks: Vec<TrackDescriptor>) -> BatchReport {
        let total = tracks.len();
        let mut report = BatchReport {
            total,
            ..BatchReport::default()
        };

        self.progress.start(total);
        self.progress.downloading();
        tracing::info!(
            total,
            strategies = ?self.chain,
            max_attempts_per_track = self.policy.attempt_budget(self.chain.len()),
            "starting batch"
        );

        let mut cancelled = false;
        for (index, track) in tracks.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            self.progress.track_started(track.display_name());

            let Some(acquired) = self.acquire(cancel, track).await else {
                tracing::info!(track = %track, "track abandoned on cancel");
                self.progress.track_abandoned();
                cancelled = true;
                break;
            };

            let delivered = match acquired {
                Ok(payload) => self.sink.deliver(track, &payload).await,
                Err(e) => Err(e),
            };

            let successful = match delivered {
                Ok(path) => {
                    report.delivered.push(path);
                    report.successful += 1;
                    true
                }
                Err(reason) => {
                    tracing::warn!(track = %track, error = %reason, "track failed");
                    report.failed.push(FailedTrackRecord {
                        descriptor: track.clone(),
                        reason,
                    });
                    false
                }
            };

            report.processed += 1;
            self.progress.track_finished(successful);

            if index + 1 < total && !cancel.is_cancelled() {
                pause(cancel, self.pacing).await;
            }
        }

        if cancelled {
            self.progress.cancelled();
            report.status = Status::Cancelled;
        } else {
            self.progress.completed();
            report.status = Status::Completed;
        }

        tracing::info!(
            status = %report.status,
            successful = report.successful,
            failed = report.failed.len(),
            total,
            "batch finished"
        );
        report
    }

    /// Walks the chain for one track. Returns `None` when cancelled.
    async fn acquire(
        &self,
        cancel: &CancellationToken,
        track: &TrackDescriptor,
    ) -> Option<Result<Vec<u8>, AcquireError>> {
        let timeout = self.policy.request_timeout;
        let mut attempts = 0;
        let mut last_error = None;

        for strategy in self.chain.iter() {
            let mut attempt = 0;
            loop {
                attempt += 1;
                attempts += 1;

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    result = tokio::time::timeout(timeout, strategy.attempt(track, timeout)) => {
                        match result {
                            Ok(outcome) => outcome.normalized(),
                            Err(_) => AcquisitionOutcome::Failure {
                                reason: AcquireError::Timeout(timeout),
                            },
                        }
                    }
                };

                let reason = match outcome {
                    AcquisitionOutcome::Success { payload } => {
                        tracing::info!(
                            track = %track,
                            strategy = strategy.name(),
                            attempt,
                            bytes = payload.len(),
                            "track acquired"
                        );
                        return Some(Ok(payload));
                    }
                    AcquisitionOutcome::Failure { reason } => reason,
                };

                let decision = if reason.is_retryable() {
                    self.policy.after_failure(attempt)
                } else {
                    RetryDecision::GiveUp
                };

                match decision {
                    RetryDecision::Wait(delay) => {
                        tracing::warn!(
                            track = %track,
                            strategy = strategy.name(),
                            attempt,
                            max_attempts = self.policy.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %reason,
                            "attempt failed, retrying"
                        );
                        if !pause(cancel, delay).await {
                            return None;
                        }
                    }
                    RetryDecision::GiveUp => {
                        tracing::warn!(
                            track = %track,
                            strategy = strategy.name(),
                            attempt,
                            error = %reason,
                            "strategy exhausted"
                        );
                        last_error = Some(reason);
                        break;
                    }
                }
            }
        }

        Some(Err(AcquireError::PerTrackExhausted {
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no sources configured".to_string()),
        }))
    }

    /// Replaces a raised cancel signal once the run it stopped is over.
    fn rearm(&self) {
        let mut cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if cancel.is_cancelled() {
            *cancel = CancellationToken::new();
        }
    }
}

/// Sleeps unless cancelled first. Returns false when cancelled.
async fn pause(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
