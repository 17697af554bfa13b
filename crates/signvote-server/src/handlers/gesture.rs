//! Latest gesture query.

use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use signvote_models::GesturePayload;

use crate::error::ServerError;
use crate::state::AppState;

/// Most recent payload, `{"gesture":"N/A","confidence":0.0}` until the first
/// frame has been processed.
pub async fn latest_gesture(State(state): State<AppState>) -> Json<GesturePayload> {
    Json(state.latest_payload())
}

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> ServerError {
    ServerError::not_found(uri.path().to_string())
}
