//! # Validation Module
//!
//! Phone normalisation, SMS encoding rules and input validation.
//!
//! ## Phone Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input              SMS gateway           Pathao                        │
//! │  ─────────────────  ────────────────────  ──────────────────            │
//! │  017-1100-0000      8801711000000         01711000000                   │
//! │  +8801711000000     8801711000000         01711000000                   │
//! │  1711000000         1711000000            01711000000                   │
//! │                                                                         │
//! │  The gateway wants the 880 country prefix, Pathao wants the local 0.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## SMS Segments
//! ```text
//! GSM text:  ≤160 chars = 1 segment,  otherwise ⌈n/153⌉
//! Unicode:   ≤70 chars  = 1 segment,  otherwise ⌈n/67⌉
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest digit string accepted as a phone number in bulk lists.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Maximum expense description length.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

// =============================================================================
// Phone Numbers
// =============================================================================

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Normalises a phone number for the SMS gateway.
///
/// ## Rules
/// - Keep digits only
/// - An 11-digit local number starting with `01` gets the `88` prefix
///
/// ## Example
/// ```rust
/// use dokan_core::validation::normalize_sms_phone;
///
/// assert_eq!(normalize_sms_phone("017-1100-0000"), "8801711000000");
/// assert_eq!(normalize_sms_phone("+8801711000000"), "8801711000000");
/// ```
pub fn normalize_sms_phone(input: &str) -> String {
    let d = digits(input);
    if d.len() == 11 && d.starts_with("01") {
        format!("88{d}")
    } else {
        d
    }
}

/// Normalises a phone number to the local `01XXXXXXXXX` form Pathao expects.
///
/// ## Rules
/// 1. Keep digits only
/// 2. `8801…` drops the `88` country code
/// 3. `801…` (country code missing its first digit) drops the leading `8`
/// 4. Anything not starting with `0` gets one prepended
pub fn normalize_pathao_phone(input: &str) -> String {
    let d = digits(input);
    let local = if d.starts_with("8801") {
        d[2..].to_string()
    } else if d.starts_with("801") {
        d[1..].to_string()
    } else {
        d
    };

    if local.starts_with('0') {
        local
    } else {
        format!("0{local}")
    }
}

/// Parses a pasted list of phone numbers.
///
/// Splits on newlines and commas, strips non-digits, drops entries shorter
/// than [`MIN_PHONE_DIGITS`], and removes duplicates keeping first position.
pub fn parse_manual_numbers(text: &str) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();
    for candidate in text.split(['\n', ',']).map(digits) {
        if candidate.len() >= MIN_PHONE_DIGITS && !numbers.contains(&candidate) {
            numbers.push(candidate);
        }
    }
    numbers
}

// =============================================================================
// SMS Encoding
// =============================================================================

/// Gateway message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SmsEncoding {
    /// 7-bit GSM text.
    Text,
    /// UCS-2, needed for Bangla script.
    Unicode,
}

impl SmsEncoding {
    /// Unicode when any character is outside ASCII.
    pub fn detect(message: &str) -> Self {
        if message.chars().any(|c| c as u32 > 0x7F) {
            SmsEncoding::Unicode
        } else {
            SmsEncoding::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmsEncoding::Text => "text",
            SmsEncoding::Unicode => "unicode",
        }
    }

    /// `(single_limit, per_part_when_concatenated)`.
    fn limits(&self) -> (usize, usize) {
        match self {
            SmsEncoding::Text => (160, 153),
            SmsEncoding::Unicode => (70, 67),
        }
    }
}

/// Encoding and segment count for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SmsSegments {
    pub encoding: SmsEncoding,
    pub chars: usize,
    pub segments: usize,
}

/// Counts billable segments for a message.
///
/// ## Example
/// ```rust
/// use dokan_core::validation::{segments, SmsEncoding};
///
/// assert_eq!(segments(&"a".repeat(160)).segments, 1);
/// assert_eq!(segments(&"a".repeat(161)).segments, 2);
/// assert_eq!(segments("আপনার অর্ডার").encoding, SmsEncoding::Unicode);
/// ```
pub fn segments(message: &str) -> SmsSegments {
    let encoding = SmsEncoding::detect(message);
    let chars = message.chars().count();
    let (single, part) = encoding.limits();

    let segments = match chars {
        0 => 0,
        n if n <= single => 1,
        n => n.div_ceil(part),
    };

    SmsSegments {
        encoding,
        chars,
        segments,
    }
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Truncates to at most `max` characters on a char boundary.
pub fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

// =============================================================================
// Input Validators
// =============================================================================

/// Validates a new expense.
///
/// ## Rules
/// - `category` must not be blank
/// - `amount` must be positive
/// - `description` at most [`MAX_DESCRIPTION_CHARS`]
pub fn validate_expense(category: &str, amount: Money, description: &str) -> ValidationResult<()> {
    if category.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_CHARS,
        });
    }

    Ok(())
}

/// Validates that a required credential is present.
pub fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a credential form: every `(field, value)` pair is required.
///
/// Reports the first blank field.
///
/// ## Example
/// ```rust
/// use dokan_core::validation::validate_credentials;
///
/// assert!(validate_credentials(&[("apiKey", "k"), ("secretKey", "s")]).is_ok());
/// assert!(validate_credentials(&[("apiKey", "k"), ("secretKey", " ")]).is_err());
/// ```
pub fn validate_credentials(fields: &[(&str, &str)]) -> ValidationResult<()> {
    fields
        .iter()
        .try_for_each(|(field, value)| require(field, value))
}

/// Validates a bulk SMS body.
pub fn validate_sms_body(message: &str) -> ValidationResult<()> {
    require("message", message)
}

// =============================================================================
// Unit Tests
// =============================================================================
