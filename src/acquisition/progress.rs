//! Batch progress shared between the orchestrator and its observers.
//!
//! The state lives in a `watch` channel. [`ProgressWriter`] owns the only
//! sender and is handed to the orchestrator; observers get cheap
//! [`ProgressReader`] clones and only ever see snapshots.

use tokio::sync::watch;

use crate::types::{ProgressState, Status};

pub fn progress_channel() -> (ProgressWriter, ProgressReader) {
    let (tx, rx) = watch::channel(ProgressState::default());
    (ProgressWriter { tx }, ProgressReader { rx })
}

#[derive(Debug)]
pub struct ProgressWriter {
    tx: watch::Sender<ProgressState>,
}

impl ProgressWriter {
    pub fn subscribe(&self) -> ProgressReader {
        ProgressReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Resets everything for a new batch of `total` tracks.
    pub fn start(&self, total: usize) {
        self.tx.send_modify(|state| {
            *state = ProgressState {
                current: 0,
                total,
                status: Status::Starting,
                current_track: None,
                successful: 0,
                error: None,
            };
        });
    }

    pub fn downloading(&self) {
        self.set_status(Status::Downloading);
    }

    pub fn track_started(&self, display_name: String) {
        self.tx.send_modify(|state| state.current_track = Some(display_name));
    }

    /// Marks the current track processed. `current` never passes `total`.
    pub fn track_finished(&self, successful: bool) {
        self.tx.send_modify(|state| {
            if state.current < state.total {
                state.current += 1;
                if successful {
                    state.successful += 1;
                }
            }
            state.current_track = None;
        });
    }

    /// Leaves a track without counting it, used when it is abandoned.
    pub fn track_abandoned(&self) {
        self.tx.send_modify(|state| state.current_track = None);
    }

    pub fn cancelled(&self) {
        self.tx.send_modify(|state| {
            state.status = Status::Cancelled;
            state.current_track = None;
        });
    }

    pub fn completed(&self) {
        self.set_status(Status::Completed);
    }

    pub fn failed(&self, message: String) {
        self.tx.send_modify(|state| {
            state.status = Status::Error;
            state.current_track = None;
            state.error = Some(message);
        });
    }

    fn set_status(&self, status: Status) {
        self.tx.send_modify(|state| state.status = status);
    }
}

#[derive(Debug, Clone)]
pub struct ProgressReader {
    rx: watch::Receiver<ProgressState>,
}

impl ProgressReader {
    pub fn snapshot(&self) -> ProgressState {
        self.rx.borrow().clone()
    }

    /// Waits for the next change. Returns `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<ProgressState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_resets_previous_batch() {
        let (writer, reader) = progress_channel();
        writer.start(2);
        writer.downloading();
        writer.track_finished(true);
        writer.failed("boom".to_string());

        writer.start(4);
        let state = reader.snapshot();
        assert_eq!(state.status, Status::Starting);
        assert_eq!(state.total, 4);
        assert_eq!(state.current, 0);
        assert_eq!(state.successful, 0);
        assert!(state.error.is_none());
    }

    #[test]
    fn current_never_exceeds_total() {
        let (writer, reader) = progress_channel();
        writer.start(1);
        writer.track_finished(true);
        writer.track_finished(true);

        let state = reader.snapshot();
        assert_eq!(state.current, 1);
        assert_eq!(state.successful, 1);
    }

    #[test]
    fn current_track_is_cleared_after_finish() {
        let (writer, reader) = progress_channel();
        writer.start(1);
        writer.track_started("Artist - Song".to_string());
        assert_eq!(
            reader.snapshot().current_track.as_deref(),
            Some("Artist - Song")
        );

        writer.track_finished(false);
        let state = reader.snapshot();
        assert!(state.current_track.is_none());
        assert_eq!(state.successful, 0);
    }

    #[test]
    fn serializes_with_snake_case_status() {
        let (writer, reader) = progress_channel();
        writer.start(3);
        writer.downloading();
        let json = serde_json::to_value(reader.snapshot()).unwrap();
        assert_eq!(json["status"], "downloading");
        assert_eq!(json["total"], 3);
        assert!(json.get("current_track").is_none());
    }
}
