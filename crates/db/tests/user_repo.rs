//! Database tests for users and default account seeding.

use cardvault_db::models::user::CreateUser;
use cardvault_db::repositories::UserRepo;
use cardvault_db::seed::{seed_default_users, DEFAULT_USERS};
use sqlx::PgPool;

fn plain_hash(password: &str) -> Result<String, std::convert::Infallible> {
    Ok(format!("hashed:{password}"))
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeding_creates_default_accounts_once(pool: PgPool) {
    let created = seed_default_users(&pool, plain_hash).await.unwrap();
    let again = seed_default_users(&pool, plain_hash).await.unwrap();

    assert_eq!(created, DEFAULT_USERS.len());
    assert_eq!(again, 0);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 2);

    let admin = UserRepo::find_by_username(&pool, "admin")
        .await
        .unwrap()
        .expect("admin seeded");
    assert_eq!(admin.role, "admin");
    assert_eq!(admin.password_hash, "hashed:admin123");
    assert!(admin.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeding_skips_populated_table(pool: PgPool) {
    let input = CreateUser {
        username: "existing".into(),
        email: "existing@test.com".into(),
        password_hash: "x".into(),
        role: "user".into(),
    };
    UserRepo::create(&pool, &input).await.unwrap();

    assert_eq!(seed_default_users(&pool, plain_hash).await.unwrap(), 0);
    assert!(UserRepo::find_by_username(&pool, "admin")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivate_clears_active_flag(pool: PgPool) {
    let input = CreateUser {
        username: "leaving".into(),
        email: "leaving@test.com".into(),
        password_hash: "x".into(),
        role: "user".into(),
    };
    let user = UserRepo::create(&pool, &input).await.unwrap();

    assert!(UserRepo::deactivate(&pool, user.id).await.unwrap());
    let reloaded = UserRepo::find_by_username(&pool, "leaving")
        .await
        .unwrap()
        .unwrap();
    assert!(!reloaded.is_active);
}
