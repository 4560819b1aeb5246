pub mod auth;
pub mod cards;
pub mod health;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                  login (public)
///
/// /cards                       store one card (POST)
/// /cards/exists?cardNumber=    look up a card (GET)
/// /cards/upload                ingest a batch file (POST, multipart)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cards", cards::router(config.max_upload_bytes))
}
