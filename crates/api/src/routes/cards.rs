//! Route definitions for the `/cards` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// Routes mounted at `/cards`. Every route requires authentication.
///
/// ```text
/// POST /          -> create_card
/// GET  /exists    -> card_exists
/// POST /upload    -> upload (body limited to `max_upload_bytes`)
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(cards::create_card))
        .route("/exists", get(cards::card_exists))
        .route(
            "/upload",
            post(cards::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
