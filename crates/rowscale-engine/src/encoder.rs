//! First-seen-order categorical encoding for string columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reversible mapping between the distinct strings of one column and integer codes.
///
/// Codes are assigned in first-seen order (`0, 1, 2, …`). Encoding an
/// already-seen string returns its existing code. There is no cardinality
/// limit.
///
/// Serialized as the list of strings ordered by code, which is all that is
/// needed to rebuild both directions of the lookup.
///
/// # Example
///
/// ```
/// use rowscale_engine::CategoricalEncoder;
///
/// let mut encoder = CategoricalEncoder::new();
/// assert_eq!(encoder.encode("buy"), 0);
/// assert_eq!(encoder.encode("sell"), 1);
/// assert_eq!(encoder.encode("buy"), 0);
/// assert_eq!(encoder.decode(1), Some("sell"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategoricalEncoder {
    values: Vec<String>,
    codes: HashMap<String, usize>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("string '{value}' appears more than once in the encoding table")]
pub struct DuplicateCategoryError {
    pub value: String,
}

impl CategoricalEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code of `value`, assigning the next unused code if it is new.
    pub fn encode(&mut self, value: &str) -> usize {
        if let Some(&code) = self.codes.get(value) {
            return code;
        }
        let code = self.values.len();
        self.values.push(value.to_owned());
        self.codes.insert(value.to_owned(), code);
        code
    }

    /// Returns the code of `value` without modifying the table.
    #[must_use]
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    /// Returns the string that was assigned `code`.
    #[must_use]
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(String::as_str)
    }

    /// Reverse lookup from a reconstructed numeric value.
    ///
    /// The value matches a code when it lies within `tolerance` of that
    /// integer; anything else (fractional, negative, out of range) has no
    /// match.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn decode_numeric(&self, value: f64, tolerance: f64) -> Option<&str> {
        let rounded = value.round();
        if !rounded.is_finite() || rounded < 0.0 || (value - rounded).abs() > tolerance {
            return None;
        }
        if rounded >= self.values.len() as f64 {
            return None;
        }
        self.decode(rounded as usize)
    }

    /// Number of distinct strings seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(string, code)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(code, value)| (value.as_str(), code))
    }
}

impl TryFrom<Vec<String>> for CategoricalEncoder {
    type Error = DuplicateCategoryError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        let mut encoder = Self::new();
        for value in values {
            if encoder.code_of(&value).is_some() {
                return Err(DuplicateCategoryError { value });
            }
            encoder.encode(&value);
        }
        Ok(encoder)
    }
}

impl From<CategoricalEncoder> for Vec<String> {
    fn from(encoder: CategoricalEncoder) -> Self {
        encoder.values
    }
}
