//! Repository for the `cards` table.
//!
//! Lookup and conditional insert accept any [`PgExecutor`] so the batch
//! store can run them inside its transaction.

use cardvault_core::types::CardNumber;
use sqlx::{PgExecutor, PgPool};

use crate::models::card::{Card, CreateCard};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, card_number, created_at, updated_at";

/// Provides queries for stored card numbers.
pub struct CardRepo;

impl CardRepo {
    /// Insert a card, returning the created row.
    ///
    /// An existing number fails with the `uq_cards_card_number` violation.
    pub async fn create(pool: &PgPool, input: &CreateCard) -> Result<Card, sqlx::Error> {
        let query = format!(
            "INSERT INTO cards (card_number)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(input.card_number)
            .fetch_one(pool)
            .await
    }

    /// Insert a card unless the number is already stored.
    ///
    /// Returns `None` when another row already holds `card_number`.
    pub async fn insert_if_absent<'e, E>(
        executor: E,
        card_number: CardNumber,
    ) -> Result<Option<Card>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO cards (card_number)
             VALUES ($1)
             ON CONFLICT (card_number) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(card_number)
            .fetch_optional(executor)
            .await
    }

    /// Find a card by its number.
    pub async fn find_by_card_number<'e, E>(
        executor: E,
        card_number: CardNumber,
    ) -> Result<Option<Card>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM cards WHERE card_number = $1");
        sqlx::query_as::<_, Card>(&query)
            .bind(card_number)
            .fetch_optional(executor)
            .await
    }

    /// Total number of stored cards.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cards")
            .fetch_one(pool)
            .await
    }
}
