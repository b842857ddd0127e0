use trackport::cli::status_text;
use trackport::error::AcquireError;
use trackport::types::{
    FailedTrackRecord, ListedTrack, Playlist, PlaylistInfo, ProgressState, Status,
    TrackDescriptor,
};
use trackport::utils::*;

// Helper function to create a listed track
fn create_listed_track(name: &str, artist: Option<&str>, artists: &[&str]) -> ListedTrack {
    ListedTrack {
        id: None,
        name: name.to_string(),
        artist: artist.map(str::to_string),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        duration_ms: None,
    }
}

// Helper function to create a playlist
fn create_playlist(name: &str, owner: Option<&str>, track_count: u32) -> Playlist {
    Playlist {
        id: format!("{}_id", name),
        name: name.to_string(),
        owner: owner.map(str::to_string),
        track_count,
        url: format!("https://open.spotify.com/playlist/{}", name),
    }
}

#[test]
fn test_listed_track_prefers_single_artist() {
    let track = create_listed_track("Song", Some("Solo"), &["First", "Second"]);
    let descriptor = TrackDescriptor::from(track);
    assert_eq!(descriptor.artist, "Solo");
}

#[test]
fn test_listed_track_uses_first_artist() {
    let track = create_listed_track("Song", None, &["First", "Second"]);
    assert_eq!(TrackDescriptor::from(track).artist, "First");

    // blank entries are skipped
    let track = create_listed_track("Song", Some("  "), &["", "Second"]);
    assert_eq!(TrackDescriptor::from(track).artist, "Second");
}

#[test]
fn test_listed_track_without_artist() {
    let track = create_listed_track("Song", None, &[]);
    let descriptor = TrackDescriptor::from(track);
    assert_eq!(descriptor.artist, "Unknown Artist");
    assert_eq!(descriptor.display_name(), "Unknown Artist - Song");
}

#[test]
fn test_join_endpoint_never_doubles_prefix() {
    assert_eq!(
        join_endpoint("http://127.0.0.1:8000/api", "playlist-tracks"),
        "http://127.0.0.1:8000/api/playlist-tracks"
    );
    assert_eq!(
        join_endpoint("https://resolver.example.com/", "/start-auth"),
        "https://resolver.example.com/start-auth"
    );
}

#[test]
fn test_track_file_name() {
    let track = TrackDescriptor::new("Bohemian Rhapsody", "Queen");
    assert_eq!(track_file_name(&track), "Queen - Bohemian Rhapsody.mp3");

    let track = TrackDescriptor::new("What?", "Who: <Me>");
    let name = track_file_name(&track);
    assert!(name.ends_with(".mp3"));
    assert!(!name.contains('?'));
    assert!(!name.contains('<'));
}

#[test]
fn test_format_duration_ms() {
    assert_eq!(format_duration_ms(Some(201_000)), "3:21");
    assert_eq!(format_duration_ms(Some(59_999)), "0:59");
    assert_eq!(format_duration_ms(None), "-");
}

#[test]
fn test_track_table_rows_are_numbered() {
    let mut first = create_listed_track("One", None, &["A"]);
    first.duration_ms = Some(61_000);
    let tracks = vec![first, create_listed_track("Two", None, &[])];

    let rows = track_table_rows(&tracks);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].position, 1);
    assert_eq!(rows[0].duration, "1:01");
    assert_eq!(rows[1].position, 2);
    assert_eq!(rows[1].artist, "Unknown Artist");
}

#[test]
fn test_failed_table_rows() {
    let failed = vec![FailedTrackRecord {
        descriptor: TrackDescriptor::new("Song", "Artist"),
        reason: AcquireError::PerTrackExhausted {
            attempts: 3,
            last_error: "empty payload received".to_string(),
        },
    }];

    let rows = failed_table_rows(&failed);

    assert_eq!(rows[0].track, "Artist - Song");
    assert!(rows[0].reason.contains("3 attempts"));
}

#[test]
fn test_playlist_rows_sorted_case_insensitive() {
    let playlists = vec![
        create_playlist("road trip", Some("zoe"), 12),
        create_playlist("Chill", None, 40),
        create_playlist("Road Trip", Some("adam"), 8),
    ];

    let rows = playlist_table_rows(playlists);

    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Chill", "Road Trip", "road trip"]);
    assert_eq!(rows[0].owner, "-");
    assert_eq!(rows[1].owner, "adam");
}

#[test]
fn test_status_text() {
    let mut state = ProgressState {
        total: 3,
        status: Status::Downloading,
        current_track: Some("Queen - Bohemian Rhapsody".to_string()),
        ..ProgressState::default()
    };
    assert_eq!(
        status_text(&state),
        "Downloading: Queen - Bohemian Rhapsody"
    );

    state.status = Status::Completed;
    state.successful = 2;
    assert_eq!(status_text(&state), "Completed! 2 tracks downloaded.");

    state.status = Status::Error;
    state.error = Some("Invalid Spotify playlist URL".to_string());
    assert_eq!(
        status_text(&state),
        "Download error: Invalid Spotify playlist URL"
    );
}

#[test]
fn test_playlist_heading() {
    let mut info = PlaylistInfo {
        name: "Chill".to_string(),
        description: None,
        owner: Some("zoe".to_string()),
        track_count: 40,
        image: None,
    };
    assert_eq!(playlist_heading(&info), "Chill by zoe (40 tracks)");

    info.owner = None;
    assert_eq!(playlist_heading(&info), "Chill (40 tracks)");
}
