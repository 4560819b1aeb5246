//! Card number rules shared by the single-card API and the batch ingestor.

use std::num::ParseIntError;

use crate::error::CoreError;
use crate::types::CardNumber;

/// Shortest card number length seen in practice (digits).
pub const MIN_CARD_DIGITS: usize = 13;

/// Longest card number length seen in practice (digits).
pub const MAX_CARD_DIGITS: usize = 19;

/// Why a digit string could not become a [`CardNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardNumberError {
    #[error("invalid card number '{digits}': {source}")]
    Unparsable {
        digits: String,
        #[source]
        source: ParseIntError,
    },

    #[error("card number '{digits}' must be positive")]
    NotPositive { digits: String },
}

/// Convert a string made only of ASCII digits into a card number.
///
/// Fails when the value does not fit in 64 bits or is zero.
pub fn parse_card_digits(digits: &str) -> Result<CardNumber, CardNumberError> {
    let value: CardNumber = digits
        .parse()
        .map_err(|source| CardNumberError::Unparsable {
            digits: digits.to_string(),
            source,
        })?;
    if value <= 0 {
        return Err(CardNumberError::NotPositive {
            digits: digits.to_string(),
        });
    }
    Ok(value)
}

/// Returns `true` if `len` digits is a typical card number length.
pub fn is_typical_length(len: usize) -> bool {
    (MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&len)
}

/// Validate a card number submitted through the single-card API.
pub fn validate_card_number(card_number: CardNumber) -> Result<(), CoreError> {
    if card_number <= 0 {
        return Err(CoreError::Validation(
            "cardNumber must be a positive integer".into(),
        ));
    }
    Ok(())
}
