use std::cmp::Ordering;

use crate::types::{
    FailedTrackRecord, FailedTrackTableRow, ListedTrack, Playlist, PlaylistInfo,
    PlaylistTableRow, TrackDescriptor, TrackTableRow,
};

pub const AUDIO_EXTENSION: &str = "mp3";

/// Joins a configured base URL and a relative endpoint path with exactly one
/// slash between them. Nothing else is prefixed.
pub fn join_endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Builds the file name a track is saved under, e.g. `Artist - Title.mp3`.
pub fn track_file_name(track: &TrackDescriptor) -> String {
    let stem = sanitize_filename::sanitize(track.display_name());
    let stem = stem.trim();
    if stem.is_empty() {
        return format!("track.{}", AUDIO_EXTENSION);
    }
    format!("{}.{}", stem, AUDIO_EXTENSION)
}

pub fn format_duration_ms(duration_ms: Option<u64>) -> String {
    match duration_ms {
        Some(ms) => {
            let secs = ms / 1000;
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => "-".to_string(),
    }
}

/// One-line summary of a playlist, e.g. `Road Trip by anna (42 tracks)`.
pub fn playlist_heading(playlist: &PlaylistInfo) -> String {
    match &playlist.owner {
        Some(owner) => format!(
            "{} by {} ({} tracks)",
            playlist.name, owner, playlist.track_count
        ),
        None => format!("{} ({} tracks)", playlist.name, playlist.track_count),
    }
}

pub fn track_table_rows(tracks: &[ListedTrack]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let descriptor = TrackDescriptor::from(track.clone());
            TrackTableRow {
                position: i + 1,
                artist: descriptor.artist,
                name: descriptor.name,
                duration: format_duration_ms(track.duration_ms),
            }
        })
        .collect()
}

pub fn failed_table_rows(failed: &[FailedTrackRecord]) -> Vec<FailedTrackTableRow> {
    failed
        .iter()
        .map(|record| FailedTrackTableRow {
            track: record.descriptor.display_name(),
            reason: record.reason.to_string(),
        })
        .collect()
}

pub fn playlist_table_rows(playlists: Vec<Playlist>) -> Vec<PlaylistTableRow> {
    let mut rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            owner: p.owner.unwrap_or_else(|| "-".to_string()),
            tracks: p.track_count,
            url: p.url,
        })
        .collect();

    sort_playlist_table_rows(&mut rows);
    rows
}

pub fn sort_playlist_table_rows(rows: &mut Vec<PlaylistTableRow>) {
    rows.sort_by(|a, b| {
        match a.name.to_lowercase().cmp(&b.name.to_lowercase()) {
            Ordering::Equal => a.owner.cmp(&b.owner), // secondary sort: owner ascending
            other => other,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_endpoint_uses_single_slash() {
        assert_eq!(
            join_endpoint("http://localhost:8000/api/", "/stream-track"),
            "http://localhost:8000/api/stream-track"
        );
        assert_eq!(
            join_endpoint("http://localhost:8000/api", "stream-track"),
            "http://localhost:8000/api/stream-track"
        );
    }

    #[test]
    fn track_file_name_strips_path_separators() {
        let track = TrackDescriptor::new("Either/Or", "AC/DC");
        let name = track_file_name(&track);
        assert!(!name.contains('/'));
        assert!(name.ends_with(".mp3"));
    }
}
