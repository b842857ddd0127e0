use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::server::ServerState;

pub async fn cancel(Extension(state): Extension<ServerState>) -> Json<Value> {
    let already = state.cancel.is_cancelled();
    state.cancel.cancel();
    if !already {
        tracing::info!("cancel requested over http");
    }

    Json(json!({
        "success": true,
        "message": "Download stopped"
    }))
}
