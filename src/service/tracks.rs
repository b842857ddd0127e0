use crate::{
    error::{AcquireError, Result},
    types::{
        BatchListingRequest, BatchListingResponse, ListedTrack, Playlist, PlaylistInfo,
        PlaylistInfoResponse, PlaylistsResponse, TrackDescriptor,
    },
};

use super::{
    PLAYLIST_INFO_ENDPOINT, PLAYLIST_TRACKS_ENDPOINT, PLAYLISTS_ENDPOINT, ServiceClient,
    json_or_error,
};

impl ServiceClient {
    /// Lists the tracks of a playlist.
    ///
    /// Sends the playlist URL to the `playlist-tracks` endpoint, which pages
    /// through the whole playlist on the service side and answers with every
    /// track at once. Large playlists take a while, so the request uses the
    /// full request timeout.
    ///
    /// # Arguments
    ///
    /// * `playlist_url` - Share URL of the playlist, passed through unchanged
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<ListedTrack>)` - Tracks in playlist order, duplicates kept
    /// - `Err(AcquireError::BatchListingFailure)` - Listing failed
    ///
    /// # Errors
    ///
    /// Every failure, whether transport, timeout, HTTP status or
    /// `success: false`, is reported as [`AcquireError::BatchListingFailure`]
    /// carrying the service's message unchanged. Without a message the text
    /// is `Error loading tracks`.
    pub async fn list_tracks(&self, playlist_url: &str) -> Result<Vec<ListedTrack>> {
        let res = self
            .http()
            .post(self.endpoint(PLAYLIST_TRACKS_ENDPOINT))
            .json(&BatchListingRequest {
                url: playlist_url.to_string(),
            })
            .timeout(self.request_timeout())
            .send()
            .await
            .map_err(|e| AcquireError::BatchListingFailure(format!("Failed to list tracks: {e}")))?;

        let body: BatchListingResponse = json_or_error(res).await.map_err(listing_failure)?;

        match body {
            BatchListingResponse {
                success: true,
                tracks: Some(tracks),
                ..
            } => Ok(tracks),
            BatchListingResponse { error, .. } => Err(AcquireError::BatchListingFailure(
                error.unwrap_or_else(|| "Error loading tracks".to_string()),
            )),
        }
    }

    /// Lists the tracks of a playlist as descriptors ready for a batch.
    ///
    /// Same as [`ServiceClient::list_tracks`], with each track reduced to its
    /// name and a single artist.
    pub async fn list_batch(&self, playlist_url: &str) -> Result<Vec<TrackDescriptor>> {
        let tracks = self.list_tracks(playlist_url).await?;
        Ok(tracks.into_iter().map(TrackDescriptor::from).collect())
    }

    /// Fetches name, owner, description and size of a playlist.
    ///
    /// # Arguments
    ///
    /// * `playlist_url` - Share URL of the playlist
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(PlaylistInfo)` - Details of the playlist
    /// - `Err(AcquireError)` - The service could not resolve the playlist
    ///
    /// # Errors
    ///
    /// - [`AcquireError::Transport`] when the service cannot be reached
    /// - [`AcquireError::NonSuccessStatus`] for a non-2xx answer, or for an
    ///   answer without `success` or a name, carrying the service's `error`
    /// - [`AcquireError::Decode`] when the body is not the expected JSON
    pub async fn playlist_info(&self, playlist_url: &str) -> Result<PlaylistInfo> {
        let res = self
            .http()
            .post(self.endpoint(PLAYLIST_INFO_ENDPOINT))
            .json(&BatchListingRequest {
                url: playlist_url.to_string(),
            })
            .timeout(self.status_timeout())
            .send()
            .await?;

        let body: PlaylistInfoResponse = json_or_error(res).await?;
        match body {
            PlaylistInfoResponse {
                success: true,
                name: Some(name),
                description,
                owner,
                track_count,
                image,
                ..
            } => Ok(PlaylistInfo {
                name,
                description: description.filter(|d| !d.trim().is_empty()),
                owner,
                track_count,
                image,
            }),
            PlaylistInfoResponse { error, .. } => Err(AcquireError::NonSuccessStatus {
                status: 200,
                message: error.unwrap_or_else(|| "Error loading playlist".to_string()),
            }),
        }
    }

    /// Lists the playlists of the authorized account.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<Playlist>)` - Playlists in the order the service lists them
    /// - `Err(AcquireError)` - Network, HTTP or decoding error
    ///
    /// # Errors
    ///
    /// An answer with `success: false` is reported as
    /// [`AcquireError::NonSuccessStatus`] with the service's message, or
    /// `Error loading playlists` when it gives none.
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let res = self
            .http()
            .get(self.endpoint(PLAYLISTS_ENDPOINT))
            .timeout(self.request_timeout())
            .send()
            .await?;

        let body: PlaylistsResponse = json_or_error(res).await?;
        match body {
            PlaylistsResponse {
                success: true,
                playlists: Some(playlists),
                ..
            } => Ok(playlists),
            PlaylistsResponse { error, .. } => Err(AcquireError::NonSuccessStatus {
                status: 200,
                message: error.unwrap_or_else(|| "Error loading playlists".to_string()),
            }),
        }
    }
}

fn listing_failure(err: AcquireError) -> AcquireError {
    match err {
        AcquireError::NonSuccessStatus { message, .. } => AcquireError::BatchListingFailure(message),
        AcquireError::BatchListingFailure(message) => AcquireError::BatchListingFailure(message),
        other => AcquireError::BatchListingFailure(other.to_string()),
    }
}
