//! Identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id_type!(u32, HourSlot);

/// Owner of a catalogue of dates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        UserId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::new(value)
    }
}

/// Highest hour slot a user can configure or request.
pub const MAX_HOUR_COUNT: u32 = 24;

/// Hour slots `1..=count`.
pub fn hour_range(count: u32) -> Vec<HourSlot> {
    (1..=count).map(HourSlot::new).collect()
}
