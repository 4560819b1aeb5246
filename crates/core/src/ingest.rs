//! Batch file ingestion: parse a card batch file and persist its card
//! numbers in fixed-size batches.
//!
//! Persistence goes through [`CardStore`], which hands out one [`BatchUnit`]
//! per flushed batch. A unit is an independent unit of work: it is committed
//! when its batch completes and rolled back (by dropping it) when a
//! non-duplicate failure aborts the ingestion. Batches committed earlier in
//! the same file stay committed.
//!
//! [`FileBatchIngestor::ingest`] never fails outward; every failure ends up
//! in the returned [`UploadResult`].

use std::collections::HashSet;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::batch_file::{classify, parse_detail, parse_footer, parse_header, LineKind};
use crate::card::{is_typical_length, MAX_CARD_DIGITS, MIN_CARD_DIGITS};
use crate::types::{CardNumber, DbId};

/// Number of card numbers accumulated before a batch is flushed.
pub const BATCH_SIZE: usize = 1000;

// ── Result ───────────────────────────────────────────────────────────

/// Lifecycle of an ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Processing,
    Success,
    CompletedWithErrors,
    Error,
}

/// Aggregate outcome of one file ingestion. Returned to the caller, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub batch_name: Option<String>,
    /// `YYYYMMDD`, as written in the header.
    pub batch_date: Option<String>,
    pub declared_count: Option<u32>,
    /// Card numbers newly stored.
    pub processed_count: u32,
    /// Card numbers already stored or repeated within the file.
    pub duplicated_count: u32,
    /// Detail lines that failed to parse.
    pub error_count: u32,
    /// Diagnostics in the order they were found.
    pub errors: Vec<String>,
    pub status: UploadStatus,
}

impl UploadResult {
    fn new() -> Self {
        Self {
            batch_name: None,
            batch_date: None,
            declared_count: None,
            processed_count: 0,
            duplicated_count: 0,
            error_count: 0,
            errors: Vec::new(),
            status: UploadStatus::Processing,
        }
    }

    /// A result for an upload that could not be read at all.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.status = UploadStatus::Error;
        result.errors.push(message.into());
        result
    }
}

// ── Store seam ───────────────────────────────────────────────────────

/// A persisted card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRecord {
    pub id: DbId,
    pub card_number: CardNumber,
}

/// Outcome of a compare-and-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(CardRecord),
    /// Another writer stored the number first.
    AlreadyExists,
}

/// Errors raised by a [`CardStore`] or [`BatchUnit`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The uniqueness constraint on the card number rejected a write.
    #[error("card number already exists")]
    UniqueViolation,

    #[error("{0}")]
    Backend(String),
}

/// Source of batch units of work.
pub trait CardStore: Send + Sync {
    type Unit: BatchUnit;

    /// Open a unit of work scoped to exactly one batch.
    fn begin_batch(&self) -> impl Future<Output = Result<Self::Unit, StoreError>> + Send;
}

/// One batch's unit of work. Dropping it without [`BatchUnit::commit`]
/// discards every write made through it.
pub trait BatchUnit: Send {
    fn find_by_card_number(
        &mut self,
        card_number: CardNumber,
    ) -> impl Future<Output = Result<Option<CardRecord>, StoreError>> + Send;

    /// Insert `card_number` unless it already exists. Stores may report a
    /// lost race either as [`InsertOutcome::AlreadyExists`] or as
    /// [`StoreError::UniqueViolation`].
    fn insert(
        &mut self,
        card_number: CardNumber,
    ) -> impl Future<Output = Result<InsertOutcome, StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// ── Ingestor ─────────────────────────────────────────────────────────

/// How structural inconsistencies (footer batch name or declared count not
/// matching) affect the final status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyPolicy {
    /// Diagnostics only; status is unaffected.
    #[default]
    Advisory,
    /// Diagnostics, and `COMPLETED_WITH_ERRORS` instead of `SUCCESS`.
    Strict,
}

/// Why an ingestion stopped before the end of the file.
#[derive(Debug, thiserror::Error)]
enum IngestError {
    #[error("{0}")]
    Read(#[from] std::io::Error),

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Running totals of one ingestion.
#[derive(Debug, Default)]
struct Tally {
    processed: u32,
    duplicated: u32,
    errors: u32,
    inconsistent: bool,
}

/// Parses a card batch file and loads it through a [`CardStore`].
#[derive(Debug, Clone)]
pub struct FileBatchIngestor<S> {
    store: S,
    policy: ConsistencyPolicy,
}

impl<S: CardStore> FileBatchIngestor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: ConsistencyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest a whole file. Always returns a result; read failures and
    /// non-duplicate store failures produce [`UploadStatus::Error`].
    pub async fn ingest<R>(&self, input: R) -> UploadResult
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut result = UploadResult::new();
        let mut tally = Tally::default();

        let outcome = self.consume(input, &mut result, &mut tally).await;

        result.processed_count = tally.processed;
        result.duplicated_count = tally.duplicated;
        result.error_count = tally.errors;

        match outcome {
            Ok(()) => self.finalize(&mut result, &mut tally),
            Err(e) => {
                tracing::error!(error = %e, "Error processing file");
                result.status = UploadStatus::Error;
                result.errors.push(format!("Error processing file: {e}"));
            }
        }

        result
    }

    async fn consume<R>(
        &self,
        input: R,
        result: &mut UploadResult,
        tally: &mut Tally,
    ) -> Result<(), IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut reader = BufReader::new(input);
        let mut raw = Vec::new();
        let mut batch: Vec<CardNumber> = Vec::with_capacity(BATCH_SIZE);
        let mut line_number = 0usize;

        while let Some(line) = read_line_lossy(&mut reader, &mut raw).await? {
            line_number += 1;

            match classify(line_number, &line) {
                LineKind::Header => apply_header(&line, result),
                LineKind::Detail => match parse_detail(&line) {
                    Ok(Some(card)) => {
                        if !is_typical_length(card.digit_count) {
                            let message = format!(
                                "Warning on line {line_number}: card number has {} digits, \
                                 expected {MIN_CARD_DIGITS}-{MAX_CARD_DIGITS}",
                                card.digit_count
                            );
                            tracing::warn!(line = line_number, "{message}");
                            result.errors.push(message);
                        }
                        tracing::debug!(
                            line = line_number,
                            batch_size = batch.len() + 1,
                            "Card added to batch"
                        );
                        batch.push(card.number);

                        if batch.len() >= BATCH_SIZE {
                            self.flush(&batch, tally).await?;
                            batch.clear();
                        }
                    }
                    Ok(None) => {
                        tracing::debug!(line = line_number, "No digits in detail line, skipped");
                    }
                    Err(e) => {
                        let message = format!("Error on line {line_number}: {e}");
                        tracing::warn!("{message}");
                        result.errors.push(message);
                        tally.errors += 1;
                    }
                },
                LineKind::Footer => check_footer(&line, result, tally),
                LineKind::Unclassified => {}
            }
        }

        if !batch.is_empty() {
            self.flush(&batch, tally).await?;
        }

        Ok(())
    }

    /// Persist one batch in its own unit of work and add its counts to
    /// `tally` once committed.
    async fn flush(&self, batch: &[CardNumber], tally: &mut Tally) -> Result<(), StoreError> {
        tracing::info!(size = batch.len(), "Starting batch");

        let mut unit = self.store.begin_batch().await?;
        let mut seen: HashSet<CardNumber> = HashSet::with_capacity(batch.len());
        let mut processed = 0u32;
        let mut duplicated = 0u32;

        for &card_number in batch {
            if !seen.insert(card_number) {
                duplicated += 1;
                continue;
            }

            if unit.find_by_card_number(card_number).await?.is_some() {
                duplicated += 1;
                continue;
            }

            match unit.insert(card_number).await {
                Ok(InsertOutcome::Inserted(_)) => processed += 1,
                Ok(InsertOutcome::AlreadyExists) | Err(StoreError::UniqueViolation) => {
                    tracing::debug!("Card stored concurrently, counted as duplicate");
                    duplicated += 1;
                }
                Err(e) => return Err(e),
            }
        }

        unit.commit().await?;

        tracing::info!(processed, duplicated, "Batch committed");
        tally.processed += processed;
        tally.duplicated += duplicated;
        Ok(())
    }

    fn finalize(&self, result: &mut UploadResult, tally: &mut Tally) {
        if let Some(declared) = result.declared_count {
            let accounted = tally.processed + tally.duplicated;
            if accounted != declared {
                result.errors.push(format!(
                    "Processed quantity ({accounted}) different from declared ({declared})"
                ));
                tally.inconsistent = true;
            }
        }

        let strict_failure = tally.inconsistent && self.policy == ConsistencyPolicy::Strict;
        result.status = if tally.errors > 0 || strict_failure {
            UploadStatus::CompletedWithErrors
        } else {
            UploadStatus::Success
        };

        tracing::info!(
            processed = tally.processed,
            duplicated = tally.duplicated,
            errors = tally.errors,
            status = ?result.status,
            "Processing completed"
        );
    }
}

/// Read one line without its `\n` or `\r\n` ending. Invalid UTF-8 is
/// replaced with U+FFFD; only I/O failures are errors. Returns `None` at end
/// of input.
async fn read_line_lossy<R>(
    reader: &mut BufReader<R>,
    raw: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    raw.clear();
    if reader.read_until(b'\n', raw).await? == 0 {
        return Ok(None);
    }
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(raw).into_owned()))
}

fn apply_header(line: &str, result: &mut UploadResult) {
    let header = parse_header(line);
    if header.declared_count.is_none() {
        tracing::debug!("Header has no declared count");
    }
    result.batch_date = header.batch_date;
    result.batch_name = header.batch_name;
    result.declared_count = header.declared_count;
}

fn check_footer(line: &str, result: &mut UploadResult, tally: &mut Tally) {
    let Some(trailer) = parse_footer(line) else {
        tracing::warn!("Footer too short to validate, ignored");
        return;
    };

    if result.batch_name.as_deref() != Some(trailer.batch_name.as_str()) {
        result.errors.push(format!(
            "Batch in footer ({}) different from header ({})",
            trailer.batch_name,
            result.batch_name.as_deref().unwrap_or("none"),
        ));
        tally.inconsistent = true;
    }

    if let (Some(footer_count), Some(header_count)) =
        (trailer.declared_count, result.declared_count)
    {
        if footer_count != header_count {
            result.errors.push(format!(
                "Declared count in footer ({footer_count}) different from header ({header_count})"
            ));
            tally.inconsistent = true;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
