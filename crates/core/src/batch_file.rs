//! Fixed-width card batch file format.
//!
//! A batch file is line oriented:
//!
//! ```text
//! DESAFIO-HYPERATIVA           20180524LOTE0001000003    header (line 1)
//! C1     4456897919999999                                detail
//! C2     4456-8979-2999-9999 // second card              detail
//! LOTE0001000003                                         footer
//! ```
//!
//! Header columns (1-based, inclusive): 1-29 free text, 30-37 date
//! `YYYYMMDD`, 38-45 batch name, 46-51 record count. The footer carries the
//! batch name in its first 8 characters and the record count in the next 6.
//!
//! Everything here is pure: no I/O, no persistence.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::card::{parse_card_digits, CardNumberError};
use crate::types::CardNumber;

// ── Layout ───────────────────────────────────────────────────────────

/// Header batch date, 0-based character range.
pub const HEADER_DATE_COLUMNS: Range<usize> = 29..37;

/// Header batch name, 0-based character range.
pub const HEADER_BATCH_NAME_COLUMNS: Range<usize> = 37..45;

/// Header declared record count, 0-based character range.
pub const HEADER_DECLARED_COUNT_COLUMNS: Range<usize> = 45..51;

/// Footer batch name, 0-based character range of the trimmed line.
pub const FOOTER_BATCH_NAME_COLUMNS: Range<usize> = 0..8;

/// Footer declared record count, 0-based character range of the trimmed line.
pub const FOOTER_COUNT_COLUMNS: Range<usize> = 8..14;

/// Detail lines start with this character once trimmed.
pub const DETAIL_PREFIX: char = 'C';

/// Everything from this marker to the end of a detail line is ignored.
pub const COMMENT_MARKER: &str = "//";

static FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LOTE[0-9]+").expect("valid regex"));

static RECORD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^C[0-9]+\s+").expect("valid regex"));

// ── Types ────────────────────────────────────────────────────────────

/// Structural role of a line within a batch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Detail,
    Footer,
    Unclassified,
}

/// Fields read from the header line. Missing or short fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHeader {
    pub batch_date: Option<String>,
    pub batch_name: Option<String>,
    pub declared_count: Option<u32>,
}

/// Fields read from the footer (trailer) line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTrailer {
    pub batch_name: String,
    /// Raw count text as found in the file.
    pub count_text: String,
    /// `count_text` parsed, when it is a number.
    pub declared_count: Option<u32>,
}

/// A card number pulled out of a detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedCard {
    pub number: CardNumber,
    /// Number of digits kept from the line, leading zeros included.
    pub digit_count: usize,
}

// ── Classification ───────────────────────────────────────────────────

/// Classify a line by position and content. First match wins, in the order
/// header, detail, footer.
pub fn classify(line_number: usize, line: &str) -> LineKind {
    if line_number == 1 {
        return LineKind::Header;
    }
    let trimmed = line.trim();
    if trimmed.starts_with(DETAIL_PREFIX) {
        LineKind::Detail
    } else if FOOTER_RE.is_match(trimmed) {
        LineKind::Footer
    } else {
        LineKind::Unclassified
    }
}

// ── Extractors ───────────────────────────────────────────────────────

/// Parse the positional header fields.
///
/// A field that starts past the end of the line is absent; one that ends
/// past it is truncated. An unparsable count leaves `declared_count` unset.
pub fn parse_header(line: &str) -> BatchHeader {
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);

    BatchHeader {
        batch_date: fixed_field(line, HEADER_DATE_COLUMNS).map(str::to_string),
        batch_name: fixed_field(line, HEADER_BATCH_NAME_COLUMNS).map(str::to_string),
        declared_count: fixed_field(line, HEADER_DECLARED_COUNT_COLUMNS)
            .and_then(|count| count.parse().ok()),
    }
}

/// Parse a footer line. Returns `None` when the trimmed line is too short to
/// hold both the batch name and the count.
pub fn parse_footer(line: &str) -> Option<BatchTrailer> {
    let trimmed = line.trim();
    if trimmed.chars().count() < FOOTER_COUNT_COLUMNS.end {
        return None;
    }
    let batch_name = fixed_field(trimmed, FOOTER_BATCH_NAME_COLUMNS)?.to_string();
    let count_text = fixed_field(trimmed, FOOTER_COUNT_COLUMNS)
        .unwrap_or_default()
        .to_string();
    let declared_count = count_text.parse().ok();

    Some(BatchTrailer {
        batch_name,
        count_text,
        declared_count,
    })
}

/// Extract the card number from a detail line.
///
/// Drops a trailing `//` comment and a `C<n>` record identifier at column 0,
/// then keeps only the ASCII digits. An indented identifier is not
/// recognised, so its digits count toward the number. Returns `Ok(None)` when no digits are
/// left. The digit count is not checked here; see
/// [`crate::card::is_typical_length`].
pub fn parse_detail(line: &str) -> Result<Option<ExtractedCard>, CardNumberError> {
    let digits = card_digits(line);
    if digits.is_empty() {
        return Ok(None);
    }
    let number = parse_card_digits(&digits)?;
    Ok(Some(ExtractedCard {
        number,
        digit_count: digits.len(),
    }))
}

/// The digit string a detail line contributes, before integer conversion.
pub fn card_digits(line: &str) -> String {
    let without_comment = match line.find(COMMENT_MARKER) {
        Some(pos) => &line[..pos],
        None => line,
    };
    let body = RECORD_ID_RE.replace(without_comment, "");
    body.chars().filter(char::is_ascii_digit).collect()
}

// ── Private helpers ──────────────────────────────────────────────────

/// Slice a character range out of `line`, trimmed. Empty fields are `None`.
fn fixed_field(line: &str, columns: Range<usize>) -> Option<&str> {
    let start = char_to_byte(line, columns.start)?;
    let end = char_to_byte(line, columns.end).unwrap_or(line.len());
    let field = line[start..end].trim();
    (!field.is_empty()).then_some(field)
}

/// Byte offset of the character at `char_index`, or of the end of the line
/// when `char_index` equals its length.
fn char_to_byte(line: &str, char_index: usize) -> Option<usize> {
    line.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(line.len()))
        .nth(char_index)
}

// ── Tests ────────────────────────────────────────────────────────────
