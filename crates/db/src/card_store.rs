//! Transactional [`CardStore`] over PostgreSQL.
//!
//! Each batch runs in its own transaction. Committing a [`PgBatchUnit`]
//! commits the batch; dropping it rolls the batch back.

use cardvault_core::ingest::{BatchUnit, CardRecord, CardStore, InsertOutcome, StoreError};
use cardvault_core::types::CardNumber;
use sqlx::{Postgres, Transaction};

use crate::repositories::CardRepo;
use crate::DbPool;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Card store handing out one transaction per ingestion batch.
#[derive(Debug, Clone)]
pub struct PgCardStore {
    pool: DbPool,
}

impl PgCardStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CardStore for PgCardStore {
    type Unit = PgBatchUnit;

    async fn begin_batch(&self) -> Result<PgBatchUnit, StoreError> {
        let tx = self.pool.begin().await.map_err(to_store_error)?;
        Ok(PgBatchUnit { tx })
    }
}

/// One open batch transaction.
pub struct PgBatchUnit {
    tx: Transaction<'static, Postgres>,
}

impl BatchUnit for PgBatchUnit {
    async fn find_by_card_number(
        &mut self,
        card_number: CardNumber,
    ) -> Result<Option<CardRecord>, StoreError> {
        let card = CardRepo::find_by_card_number(&mut *self.tx, card_number)
            .await
            .map_err(to_store_error)?;
        Ok(card.map(CardRecord::from))
    }

    async fn insert(&mut self, card_number: CardNumber) -> Result<InsertOutcome, StoreError> {
        let inserted = CardRepo::insert_if_absent(&mut *self.tx, card_number)
            .await
            .map_err(to_store_error)?;
        Ok(match inserted {
            Some(card) => InsertOutcome::Inserted(card.into()),
            None => InsertOutcome::AlreadyExists,
        })
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(to_store_error)
    }
}

/// Map a sqlx error onto the ingest seam's error type.
fn to_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Backend(err.to_string())
}
