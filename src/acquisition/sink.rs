use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{error::AcquireError, types::TrackDescriptor, utils};

/// Receives the payload of every acquired track.
#[async_trait]
pub trait PayloadSink: Send + Sync {
    async fn deliver(
        &self,
        track: &TrackDescriptor,
        payload: &[u8],
    ) -> Result<PathBuf, AcquireError>;
}

/// Writes each track to `{dest}/{artist} - {name}.mp3`.
///
/// The payload goes to a `.part` file first and is renamed into place once
/// fully written. If anything fails, or the delivery future is dropped, the
/// partial file is removed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dest: PathBuf,
}

impl DirectorySink {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }
}

#[async_trait]
impl PayloadSink for DirectorySink {
    async fn deliver(
        &self,
        track: &TrackDescriptor,
        payload: &[u8],
    ) -> Result<PathBuf, AcquireError> {
        async_fs::create_dir_all(&self.dest).await?;

        let target = self.dest.join(utils::track_file_name(track));
        let partial = PartialFile::new(part_path(&target));

        async_fs::write(partial.path(), payload).await?;
        async_fs::rename(partial.path(), &target).await?;
        partial.commit();

        tracing::debug!(path = %target.display(), bytes = payload.len(), "track written");
        Ok(target)
    }
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

/// Removes its file on drop unless committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial file");
            }
        }
    }
}
