use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::AcquireError;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub name: String,
    pub artist: String,
}

impl TrackDescriptor {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.name)
    }
}

impl fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.name)
    }
}

/// A track as returned by the batch listing endpoint. Services report either
/// a single `artist` or the full `artists` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedTrack {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl From<ListedTrack> for TrackDescriptor {
    fn from(track: ListedTrack) -> Self {
        let artist = track
            .artist
            .filter(|a| !a.trim().is_empty())
            .or_else(|| track.artists.into_iter().find(|a| !a.trim().is_empty()))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        TrackDescriptor {
            name: track.name,
            artist,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsStatusResponse {
    pub credentials_set: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartAuthResponse {
    #[serde(default)]
    pub success: bool,
    pub auth_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchListingRequest {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchListingResponse {
    #[serde(default)]
    pub success: bool,
    pub tracks: Option<Vec<ListedTrack>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireRequest {
    pub track_name: String,
    pub artist: String,
}

impl From<&TrackDescriptor> for AcquireRequest {
    fn from(track: &TrackDescriptor) -> Self {
        AcquireRequest {
            track_name: track.name.clone(),
            artist: track.artist.clone(),
        }
    }
}

/// Error body returned by the service. Some routes answer with `detail`
/// instead of `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.error.or(self.detail)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub track_count: u32,
    pub url: String,
}

/// Details of a single playlist as answered by `playlist-info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistInfoResponse {
    #[serde(default)]
    pub success: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    #[serde(default)]
    pub track_count: u32,
    pub image: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistInfo {
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub track_count: u32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default)]
    pub success: bool,
    pub playlists: Option<Vec<Playlist>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    Starting,
    Downloading,
    Completed,
    Cancelled,
    Error,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled | Status::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "idle",
            Status::Starting => "starting",
            Status::Downloading => "downloading",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub current: usize,
    pub total: usize,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_track: Option<String>,
    pub successful: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Idle,
    AwaitingAuthorization,
    Polling,
    Authenticated,
    TimedOut,
    Failed,
}

/// Published by the authorization poller. Only [`AuthState`] goes over the
/// wire, the session itself stays in process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthSession {
    pub state: AuthState,
    pub auth_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub failure: Option<String>,
}

impl AuthSession {
    /// Converts a terminal session into the error the user should see.
    pub fn into_result(self) -> Result<(), AcquireError> {
        match self.state {
            AuthState::Authenticated => Ok(()),
            AuthState::TimedOut => Err(AcquireError::AuthorizationTimeout),
            _ => Err(AcquireError::AuthorizationRejected(
                self.failure
                    .unwrap_or_else(|| "authentication was not completed".to_string()),
            )),
        }
    }
}

#[derive(Debug)]
pub struct FailedTrackRecord {
    pub descriptor: TrackDescriptor,
    pub reason: AcquireError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub status: Status,
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: Vec<FailedTrackRecord>,
    pub delivered: Vec<PathBuf>,
    pub error: Option<String>,
}

#[derive(Tabled)]
pub struct FailedTrackTableRow {
    pub track: String,
    pub reason: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub artist: String,
    pub name: String,
    pub duration: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub tracks: u32,
    pub url: String,
}
