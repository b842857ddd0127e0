use tabled::Table;

use crate::{error, info, service::ServiceClient, types::PlaylistInfo, utils, warning};

pub async fn tracks(playlist_url: String) {
    let client = ServiceClient::from_env();

    match client.playlist_info(&playlist_url).await {
        Ok(playlist) => print_header(&playlist),
        Err(e) => warning!("Cannot load playlist details: {}", e),
    }

    let tracks = match client.list_tracks(&playlist_url).await {
        Ok(tracks) => tracks,
        Err(e) => error!("{}", e),
    };

    if tracks.is_empty() {
        info!("The playlist has no tracks.");
        return;
    }

    let table = Table::new(utils::track_table_rows(&tracks));
    println!("{table}\n");
    info!("{} tracks", tracks.len());
}

fn print_header(playlist: &PlaylistInfo) {
    info!("{}", utils::playlist_heading(playlist));
    if let Some(description) = &playlist.description {
        println!("    {}", description);
    }
    println!();
}
