//! # Acquisition Module
//!
//! Turns a batch of track descriptors into delivered files.
//!
//! ```text
//! Orchestrator (sequential, paced, cancellable)
//!     ↓ per track
//! Strategy Chain (ordered, first success wins)
//!     ↓ per strategy
//! Retry Policy (linear backoff, bounded attempts)
//!     ↓ on success
//! Payload Sink (scoped write to the destination)
//! ```
//!
//! Progress is published through a single-writer watch channel, see
//! [`progress_channel`].

mod orchestrator;
mod progress;
mod retry;
mod sink;
mod strategy;

pub use orchestrator::Orchestrator;
pub use progress::{ProgressReader, ProgressWriter, progress_channel};
pub use retry::{RetryDecision, RetryPolicy};
pub use sink::{DirectorySink, PayloadSink};
pub use strategy::{AcquisitionOutcome, Strategy, StrategyChain};
