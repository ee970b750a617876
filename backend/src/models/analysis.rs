//! Analysis windows and results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::ids::{HourSlot, UserId};
use super::topic::TopicKey;

/// Four consecutive catalogue dates; `d` is the trigger date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub a: NaiveDate,
    pub b: NaiveDate,
    pub c: NaiveDate,
    pub d: NaiveDate,
}

impl AnalysisWindow {
    pub fn dates(&self) -> [NaiveDate; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates().contains(&date)
    }
}

impl fmt::Display for AnalysisWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A={} B={} C={} D={}", self.a, self.b, self.c, self.d)
    }
}

/// ABCD and BCD numbers of one D-day list. Disjoint, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub abcd: Vec<u32>,
    pub bcd: Vec<u32>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.abcd.is_empty() && self.bcd.is_empty()
    }
}

/// Counts reported next to a classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    /// Distinct D-day numbers.
    pub d_count: usize,
    pub abcd_count: usize,
    pub bcd_count: usize,
    pub total_qualified: usize,
    /// Percentage of distinct D-day numbers that qualified, 0 when D is empty.
    pub qualification_rate: f64,
}

/// Result for one topic and hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub abcd: Vec<u32>,
    pub bcd: Vec<u32>,
    /// Distinct D-day numbers.
    pub d_count: usize,
    pub summary: ClassificationSummary,
}

/// Why a topic produced no analysis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicFailureReason {
    /// The D-day matrix has no such topic.
    MissingOnTargetDate,
    /// The topic exists on D but no element yielded a number for the hour.
    NoTargetNumbers,
}

impl fmt::Display for TopicFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicFailureReason::MissingOnTargetDate => f.write_str("topic missing on D-day"),
            TopicFailureReason::NoTargetNumbers => f.write_str("no D-day numbers found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFailure {
    pub topic: TopicKey,
    pub reason: TopicFailureReason,
}

/// All topics for one hour slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourAnalysis {
    pub hour: HourSlot,
    pub topics: BTreeMap<TopicKey, TopicAnalysis>,
    pub failures: Vec<TopicFailure>,
    /// Classification of the per-day union of every topic's numbers.
    pub overall: Classification,
}

impl HourAnalysis {
    pub fn total_topics(&self) -> usize {
        self.topics.len() + self.failures.len()
    }

    pub fn successful_topics(&self) -> usize {
        self.topics.len()
    }
}

/// A complete analysis of one trigger date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub user: UserId,
    /// Equal to `window.d`.
    pub trigger_date: NaiveDate,
    pub window: AnalysisWindow,
    pub hours: BTreeMap<HourSlot, HourAnalysis>,
    /// Digest of the four dates' inputs at compute time.
    pub input_fingerprint: String,
    pub computed_at: DateTime<Utc>,
}

impl AnalysisRun {
    pub fn hour(&self, hour: HourSlot) -> Option<&HourAnalysis> {
        self.hours.get(&hour)
    }

    pub fn topic(&self, hour: HourSlot, topic: &TopicKey) -> Option<&TopicAnalysis> {
        self.hours.get(&hour)?.topics.get(topic)
    }

    pub fn covers_hours(&self, hours: &[HourSlot]) -> bool {
        hours.iter().all(|h| self.hours.contains_key(h))
    }
}
