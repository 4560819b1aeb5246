//! Database tests for card persistence and the transactional batch store.

use assert_matches::assert_matches;
use cardvault_core::ingest::{
    BatchUnit, CardStore, FileBatchIngestor, InsertOutcome, UploadStatus,
};
use cardvault_db::card_store::PgCardStore;
use cardvault_db::models::card::CreateCard;
use cardvault_db::repositories::CardRepo;
use sqlx::PgPool;

const CARD: i64 = 4456897999999999;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_then_find_by_card_number(pool: PgPool) {
    let created = CardRepo::create(&pool, &CreateCard { card_number: CARD })
        .await
        .unwrap();

    let found = CardRepo::find_by_card_number(&pool, CARD)
        .await
        .unwrap()
        .expect("card should exist");
    assert_eq!(found.id, created.id);
    assert_eq!(CardRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_create_violates_named_constraint(pool: PgPool) {
    CardRepo::create(&pool, &CreateCard { card_number: CARD })
        .await
        .unwrap();

    let err = CardRepo::create(&pool, &CreateCard { card_number: CARD })
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_cards_card_number"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_positive_card_is_rejected_by_check(pool: PgPool) {
    let result = CardRepo::create(&pool, &CreateCard { card_number: 0 }).await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_if_absent_reports_existing_number(pool: PgPool) {
    let first = CardRepo::insert_if_absent(&pool, CARD).await.unwrap();
    let second = CardRepo::insert_if_absent(&pool, CARD).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn uncommitted_batch_is_rolled_back(pool: PgPool) {
    let store = PgCardStore::new(pool.clone());

    let mut unit = store.begin_batch().await.unwrap();
    assert_matches!(unit.insert(CARD).await, Ok(InsertOutcome::Inserted(_)));
    assert!(unit.find_by_card_number(CARD).await.unwrap().is_some());
    drop(unit);

    assert_eq!(CardRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn committed_batch_is_visible(pool: PgPool) {
    let store = PgCardStore::new(pool.clone());

    let mut unit = store.begin_batch().await.unwrap();
    unit.insert(CARD).await.unwrap();
    assert_matches!(unit.insert(CARD).await, Ok(InsertOutcome::AlreadyExists));
    unit.commit().await.unwrap();

    assert_eq!(CardRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingesting_the_same_file_twice_is_idempotent(pool: PgPool) {
    let content = "DESAFIO-HYPERATIVA           20180524LOTE0001000003\n\
                   C1     4456897919999999\n\
                   C2     4456897929999999\n\
                   C3     4456897939999999\n\
                   LOTE0001000003\n";
    let ingestor = FileBatchIngestor::new(PgCardStore::new(pool.clone()));

    let first = ingestor.ingest(content.as_bytes()).await;
    let second = ingestor.ingest(content.as_bytes()).await;

    assert_eq!(first.status, UploadStatus::Success);
    assert_eq!(first.processed_count, 3);
    assert_eq!(second.processed_count, 0);
    assert_eq!(second.duplicated_count, 3);
    assert_eq!(CardRepo::count(&pool).await.unwrap(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_ingestions_store_each_card_once(pool: PgPool) {
    let mut content = String::from("DESAFIO-HYPERATIVA           20180524LOTE0001000200\n");
    for i in 0..200i64 {
        content.push_str(&format!("C{}     {}\n", i + 1, 4_000_000_000_000_000 + i));
    }
    let a = FileBatchIngestor::new(PgCardStore::new(pool.clone()));
    let b = FileBatchIngestor::new(PgCardStore::new(pool.clone()));

    let (ra, rb) = tokio::join!(a.ingest(content.as_bytes()), b.ingest(content.as_bytes()));

    assert_eq!(ra.processed_count + rb.processed_count, 200);
    assert_eq!(ra.duplicated_count + rb.duplicated_count, 200);
    assert_eq!(CardRepo::count(&pool).await.unwrap(), 200);
}
