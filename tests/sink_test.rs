use std::fs;

use trackport::{
    acquisition::{DirectorySink, PayloadSink},
    error::AcquireError,
    types::TrackDescriptor,
};

const PAYLOAD: &[u8] = b"ID3\x04\x00fake-audio";

fn leftovers(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".part"))
        .collect()
}

#[tokio::test]
async fn test_writes_track_under_display_name() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let track = TrackDescriptor::new("Bohemian Rhapsody", "Queen");

    let path = sink.deliver(&track, PAYLOAD).await.unwrap();

    assert_eq!(path, dir.path().join("Queen - Bohemian Rhapsody.mp3"));
    assert_eq!(fs::read(&path).unwrap(), PAYLOAD);
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_creates_missing_destination() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("exports").join("road trip");
    let sink = DirectorySink::new(&dest);

    let path = sink
        .deliver(&TrackDescriptor::new("Song", "Artist"), PAYLOAD)
        .await
        .unwrap();

    assert!(path.starts_with(&dest));
    assert!(path.is_file());
}

#[tokio::test]
async fn test_same_track_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let track = TrackDescriptor::new("Song", "Artist");

    sink.deliver(&track, b"first").await.unwrap();
    let path = sink.deliver(&track, b"second").await.unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"second");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_unsafe_characters_stay_inside_destination() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());

    let path = sink
        .deliver(&TrackDescriptor::new("../../etc/passwd", "AC/DC"), PAYLOAD)
        .await
        .unwrap();

    assert_eq!(path.parent(), Some(dir.path()));
}

#[tokio::test]
async fn test_destination_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();
    let sink = DirectorySink::new(&blocker);

    let err = sink
        .deliver(&TrackDescriptor::new("Song", "Artist"), PAYLOAD)
        .await
        .unwrap_err();

    assert!(matches!(err, AcquireError::Delivery(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_failed_rename_removes_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    // a directory already sits where the track should go
    fs::create_dir(dir.path().join("Artist - Song.mp3")).unwrap();
    fs::write(dir.path().join("Artist - Song.mp3").join("keep"), b"x").unwrap();
    let sink = DirectorySink::new(dir.path());

    let err = sink
        .deliver(&TrackDescriptor::new("Song", "Artist"), PAYLOAD)
        .await
        .unwrap_err();

    assert!(matches!(err, AcquireError::Delivery(_)));
    assert!(leftovers(dir.path()).is_empty());
}
