//! Card entity model and DTOs.

use cardvault_core::ingest::CardRecord;
use cardvault_core::types::{CardNumber, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Card {
    pub id: DbId,
    pub card_number: CardNumber,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        CardRecord {
            id: card.id,
            card_number: card.card_number,
        }
    }
}

/// DTO for storing a single card number.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCard {
    pub card_number: CardNumber,
}
