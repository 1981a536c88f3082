//! # Value Normalization
//!
//! Pure conversions that make heterogeneous value spellings comparable:
//! * [`num2char`] / [`chn_to_sum`] - Arabic and Chinese numerals.
//! * [`dates`] - question dates against `YY-M-D` cells.
//! * [`extract_integers`] - standalone integers in text.
//!
//! Conversions that can miss report it through [`NormalizedValue`], so
//! callers choose their fallback explicitly.

pub mod chinese_numerals;
pub mod dates;
pub mod numbers;

pub use chinese_numerals::{chn_to_sum, has_chinese_numeral, num2char};
pub use dates::{DateQuery, cell_date, match_date, question_dates};
pub use numbers::{digit_count, extract_integers};

use crate::table::format_number;

/// The outcome of a normalization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    /// The canonical form.
    Normalized(String),

    /// The input has no canonical form under this normalization.
    Unavailable,
}

impl NormalizedValue {
    /// The canonical form, or `raw` when unavailable.
    pub fn or_raw(
        self,
        raw: &str,
    ) -> String {
        match self {
            NormalizedValue::Normalized(s) => s,
            NormalizedValue::Unavailable => raw.to_string(),
        }
    }

    /// Was a canonical form found?
    pub fn is_normalized(&self) -> bool {
        matches!(self, NormalizedValue::Normalized(_))
    }
}

impl<E> From<Result<String, E>> for NormalizedValue {
    fn from(value: Result<String, E>) -> Self {
        match value {
            Ok(s) => NormalizedValue::Normalized(s),
            Err(_) => NormalizedValue::Unavailable,
        }
    }
}

/// Normalize a Chinese numeral phrase to Arabic digits.
///
/// `两` reads as `二`; the value renders without a fractional part when
/// integral. Text with no numeral characters is unavailable.
pub fn normalize_chinese_number(text: &str) -> NormalizedValue {
    if !has_chinese_numeral(text) {
        return NormalizedValue::Unavailable;
    }
    chn_to_sum(&text.replace('两', "二"))
        .map(format_number)
        .into()
}

/// Render a numeric text in Chinese numerals.
///
/// `-` signs are dropped; integral decimals (`30.0`) render as integers.
pub fn chinese_rendering(text: &str) -> NormalizedValue {
    let cleaned = text.replace('-', "");
    let cleaned = match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && cleaned.contains('.') => format_number(v),
        _ => cleaned,
    };
    num2char(&cleaned).into()
}
