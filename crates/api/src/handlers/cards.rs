//! Handlers for the `/cards` resource: single-card storage, existence
//! lookup, and batch file upload.

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cardvault_core::card::validate_card_number;
use cardvault_core::error::CoreError;
use cardvault_core::ingest::UploadResult;
use cardvault_core::types::{CardNumber, DbId};
use cardvault_db::models::card::CreateCard;
use cardvault_db::repositories::CardRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the batch file.
pub const FILE_FIELD: &str = "file";

/// Identifier of a stored card.
#[derive(Debug, Serialize)]
pub struct CardId {
    pub id: DbId,
}

/// Query parameters for `GET /cards/exists`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsQuery {
    pub card_number: CardNumber,
}

/// POST /api/v1/cards
///
/// Store one card number. Returns 201 with the new id, 400 for a
/// non-positive number, 409 when it is already stored.
pub async fn create_card(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateCard>,
) -> AppResult<(StatusCode, Json<DataResponse<CardId>>)> {
    validate_card_number(input.card_number)?;

    let card = CardRepo::create(&state.pool, &input).await?;
    tracing::info!(card_id = card.id, username = %user.username, "Card stored");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CardId { id: card.id },
        }),
    ))
}

/// GET /api/v1/cards/exists?cardNumber=
///
/// Look up a card number. Returns its id, or 404 when it is not stored.
pub async fn card_exists(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ExistsQuery>,
) -> AppResult<Json<DataResponse<CardId>>> {
    let card = CardRepo::find_by_card_number(&state.pool, query.card_number)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Card",
                key: query.card_number.to_string(),
            })
        })?;

    Ok(Json(DataResponse {
        data: CardId { id: card.id },
    }))
}

/// POST /api/v1/cards/upload
///
/// Ingest a batch file sent as the multipart field `file`. The response
/// body is always an [`UploadResult`]; a body that cannot be read yields a
/// client-error status with an `ERROR` result.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<UploadResult>) {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return reject(rejection.status(), rejection.body_text()),
    };

    let content = match read_file_field(&mut multipart).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            return reject(
                StatusCode::BAD_REQUEST,
                format!("Missing multipart field '{FILE_FIELD}'"),
            )
        }
        Err(e) => return reject(e.status(), e.body_text()),
    };

    tracing::info!(
        username = %user.username,
        bytes = content.len(),
        "Batch file received"
    );

    let result = state.ingestor.ingest(content.as_ref()).await;
    (StatusCode::OK, Json(result))
}

/// Buffer the first `file` field, skipping any other fields.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map(Some);
        }
    }
    Ok(None)
}

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<UploadResult>) {
    let message = message.into();
    tracing::warn!(%status, %message, "Upload rejected");
    (status, Json(UploadResult::failed(message)))
}
