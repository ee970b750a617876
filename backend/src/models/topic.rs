//! Topic identity.
//!
//! Upstream producers label the same divisional chart inconsistently
//! (`"D-3 (trd) Set-1 Matrix"`, `"D-3 Set-1"`). Every topic name passes through
//! [`TopicKey::canonicalize`] at ingestion, and the rest of the crate only ever
//! compares [`TopicKey`] values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Divisions reported by the product, in display order.
pub const STANDARD_DIVISIONS: [u16; 15] = [1, 3, 4, 5, 7, 9, 10, 11, 12, 27, 30, 60, 81, 108, 144];

/// Number of sets per division.
pub const SETS_PER_DIVISION: u8 = 2;

/// Error raised when a topic name cannot be canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid topic name '{raw}': {reason}")]
pub struct TopicError {
    pub raw: String,
    pub reason: String,
}

impl TopicError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Canonical key of one divisional chart and set, e.g. `D-9 Set-2`.
///
/// Ordering is by division then set, which matches the product's topic order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicKey {
    division: u16,
    set: u8,
}

impl TopicKey {
    pub fn new(division: u16, set: u8) -> Self {
        Self { division, set }
    }

    pub fn division(&self) -> u16 {
        self.division
    }

    pub fn set(&self) -> u8 {
        self.set
    }

    /// Canonicalize a raw topic label.
    ///
    /// Parenthesized annotations and a trailing `Matrix` word are dropped, then
    /// the remainder must read `D-<division> Set-<set>`.
    pub fn canonicalize(raw: &str) -> Result<Self, TopicError> {
        let mut stripped = String::with_capacity(raw.len());
        let mut depth = 0usize;
        for ch in raw.chars() {
            match ch {
                '(' => depth += 1,
                ')' if depth > 0 => depth -= 1,
                ')' => return Err(TopicError::new(raw, "unbalanced ')'")),
                _ if depth == 0 => stripped.push(ch),
                _ => {}
            }
        }
        if depth != 0 {
            return Err(TopicError::new(raw, "unbalanced '('"));
        }

        let mut words: Vec<&str> = stripped.split_whitespace().collect();
        while words
            .last()
            .is_some_and(|w| w.eq_ignore_ascii_case("matrix"))
        {
            words.pop();
        }

        let [division_word, set_word] = words.as_slice() else {
            return Err(TopicError::new(raw, "expected 'D-<n> Set-<m>'"));
        };

        let division = parse_prefixed(division_word, "d")
            .ok_or_else(|| TopicError::new(raw, "missing 'D-<n>' division"))?;
        let set = parse_prefixed(set_word, "set")
            .ok_or_else(|| TopicError::new(raw, "missing 'Set-<m>' suffix"))?;

        let division = u16::try_from(division)
            .map_err(|_| TopicError::new(raw, "division out of range"))?;
        let set = u8::try_from(set).map_err(|_| TopicError::new(raw, "set out of range"))?;
        if division == 0 || set == 0 {
            return Err(TopicError::new(raw, "division and set start at 1"));
        }

        Ok(Self { division, set })
    }

    /// The 30 topics the product reports, in display order.
    pub fn standard_topics() -> Vec<TopicKey> {
        STANDARD_DIVISIONS
            .iter()
            .flat_map(|&division| (1..=SETS_PER_DIVISION).map(move |set| TopicKey::new(division, set)))
            .collect()
    }
}

/// Parses `<prefix>-<digits>` case-insensitively.
fn parse_prefixed(word: &str, prefix: &str) -> Option<u64> {
    let (head, digits) = word.split_once('-')?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{} Set-{}", self.division, self.set)
    }
}

impl FromStr for TopicKey {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TopicKey::canonicalize(s)
    }
}

impl TryFrom<String> for TopicKey {
    type Error = TopicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TopicKey::canonicalize(&value)
    }
}

impl From<TopicKey> for String {
    fn from(key: TopicKey) -> Self {
        key.to_string()
    }
}
