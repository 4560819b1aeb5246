/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Card numbers are stored as PostgreSQL BIGINT.
pub type CardNumber = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
