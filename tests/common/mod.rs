//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use trackport::{
    acquisition::{AcquisitionOutcome, PayloadSink, RetryPolicy, Strategy},
    error::AcquireError,
    types::TrackDescriptor,
};

pub const PAYLOAD: &[u8] = b"ID3\x04\x00fake-audio";

/// What a scripted strategy does on a given attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ok,
    Fail,
    Empty,
    Hang,
}

/// `(strategy, track name)` for every attempt, in order.
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<(String, String)> {
    log.lock().unwrap().clone()
}

pub fn calls_for(log: &CallLog, track: &str) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(_, t)| t == track)
        .map(|(s, _)| s.clone())
        .collect()
}

type Plan = Box<dyn Fn(&TrackDescriptor, u32) -> Step + Send + Sync>;

/// Strategy whose outcome is decided by a plan receiving the track and the
/// 1-based attempt number of that track on this strategy.
pub struct ScriptedStrategy {
    name: String,
    plan: Plan,
    attempts: Mutex<HashMap<String, u32>>,
    log: CallLog,
}

impl ScriptedStrategy {
    pub fn new<F>(name: &str, log: &CallLog, plan: F) -> Arc<dyn Strategy>
    where
        F: Fn(&TrackDescriptor, u32) -> Step + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.to_string(),
            plan: Box::new(plan),
            attempts: Mutex::new(HashMap::new()),
            log: Arc::clone(log),
        })
    }

    pub fn always(name: &str, log: &CallLog, step: Step) -> Arc<dyn Strategy> {
        Self::new(name, log, move |_, _| step)
    }
}

#[async_trait]
impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, track: &TrackDescriptor, _timeout: Duration) -> AcquisitionOutcome {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(track.name.clone()).or_insert(0);
            *n += 1;
            *n
        };
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), track.name.clone()));

        match (self.plan)(track, attempt) {
            Step::Ok => AcquisitionOutcome::Success {
                payload: PAYLOAD.to_vec(),
            },
            Step::Fail => AcquisitionOutcome::Failure {
                reason: AcquireError::NonSuccessStatus {
                    status: 500,
                    message: "All download methods failed".to_string(),
                },
            },
            Step::Empty => AcquisitionOutcome::Success {
                payload: Vec::new(),
            },
            Step::Hang => std::future::pending::<AcquisitionOutcome>().await,
        }
    }
}

/// Sink keeping delivered tracks in memory. Optionally raises a cancel
/// signal once a number of tracks has been delivered.
#[derive(Default)]
pub struct MemorySink {
    pub delivered: Mutex<Vec<(TrackDescriptor, usize)>>,
    cancel_after: Option<(usize, CancellationToken)>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancelling_after(count: usize, token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            cancel_after: Some((count, token)),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.name.clone())
            .collect()
    }
}

#[async_trait]
impl PayloadSink for MemorySink {
    async fn deliver(
        &self,
        track: &TrackDescriptor,
        payload: &[u8],
    ) -> Result<PathBuf, AcquireError> {
        if self.fail {
            return Err(AcquireError::Delivery(std::io::Error::other("disk full")));
        }

        let count = {
            let mut delivered = self.delivered.lock().unwrap();
            delivered.push((track.clone(), payload.len()));
            delivered.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }

        Ok(PathBuf::from(track.display_name()))
    }
}

pub fn tracks(names: &[&str]) -> Vec<TrackDescriptor> {
    names
        .iter()
        .map(|name| TrackDescriptor::new(*name, "Test Artist"))
        .collect()
}

pub fn policy() -> RetryPolicy {
    RetryPolicy::default()
}
