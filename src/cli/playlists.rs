use tabled::Table;

use crate::{error, info, service::ServiceClient, utils};

pub async fn playlists() {
    let client = ServiceClient::from_env();

    let playlists = match client.list_playlists().await {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to load playlists: {}", e),
    };

    if playlists.is_empty() {
        info!("No playlists found.");
        return;
    }

    let count = playlists.len();
    let table = Table::new(utils::playlist_table_rows(playlists));
    println!("{table}\n");
    info!("{} playlists", count);
}
