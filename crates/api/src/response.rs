//! Shared response envelope types for API handlers.
//!
//! Card endpoints answer with a `{ "data": ... }` envelope. Upload results
//! are returned bare.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
