/// Domain-level error shared by every crate in the workspace.
///
/// HTTP status mapping lives in `cardvault_api::error::AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `key` describes the lookup that came back empty (e.g. a card number).
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
