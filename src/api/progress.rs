use axum::{Extension, response::Json};

use crate::{server::ServerState, types::ProgressState};

pub async fn progress(Extension(state): Extension<ServerState>) -> Json<ProgressState> {
    Json(state.progress.snapshot())
}
