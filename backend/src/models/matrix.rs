//! Per-date inputs: the planetary matrix and the hour selection.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::{HourSlot, UserId};
use super::planet::PlanetCode;
use super::topic::{TopicError, TopicKey};

/// Raw matrix as delivered by the upload subsystem: topic → element → planet → token.
pub type RawMatrix = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// Planet → token for one element.
pub type PlanetRow = BTreeMap<PlanetCode, String>;

/// Element rows of one topic, keyed by element label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicMatrix {
    elements: BTreeMap<String, PlanetRow>,
}

impl TopicMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: impl Into<String>, planet: PlanetCode, token: impl Into<String>) {
        self.elements
            .entry(element.into())
            .or_default()
            .insert(planet, token.into());
    }

    pub fn element(&self, element: &str) -> Option<&PlanetRow> {
        self.elements.get(element)
    }

    /// Elements in label order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &PlanetRow)> {
        self.elements.iter().map(|(name, row)| (name.as_str(), row))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Error raised while ingesting a raw matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    InvalidTopic(#[from] TopicError),

    #[error("Topics '{first}' and '{second}' both canonicalize to '{key}'")]
    DuplicateTopic {
        key: TopicKey,
        first: String,
        second: String,
    },
}

/// Topic → element → planet → token for one date.
///
/// Deserialization canonicalizes topic names and rejects collisions, the same
/// as [`PlanetaryMatrix::ingest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, TopicMatrix>",
    into = "BTreeMap<TopicKey, TopicMatrix>"
)]
pub struct PlanetaryMatrix {
    topics: BTreeMap<TopicKey, TopicMatrix>,
}

impl PlanetaryMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from the collaborator's raw map, canonicalizing topic names.
    ///
    /// Planet columns other than the nine planet codes are skipped.
    pub fn ingest(raw: &RawMatrix) -> Result<Self, IngestError> {
        let mut topics: BTreeMap<TopicKey, TopicMatrix> = BTreeMap::new();
        let mut sources = BTreeMap::new();

        for (raw_topic, elements) in raw {
            let key = claim_topic(&mut sources, raw_topic)?;

            let mut topic = TopicMatrix::new();
            for (element, row) in elements {
                for (planet, token) in row {
                    match planet.parse::<PlanetCode>() {
                        Ok(code) => topic.insert(element.clone(), code, token.clone()),
                        Err(_) => debug!(
                            "Skipping non-planet column '{}' in {} / {}",
                            planet, key, element
                        ),
                    }
                }
            }
            topics.insert(key, topic);
        }

        Ok(Self { topics })
    }

    pub fn insert_topic(&mut self, key: TopicKey, topic: TopicMatrix) {
        self.topics.insert(key, topic);
    }

    pub fn topic(&self, key: &TopicKey) -> Option<&TopicMatrix> {
        self.topics.get(key)
    }

    /// Topic keys in canonical order.
    pub fn topic_keys(&self) -> Vec<TopicKey> {
        self.topics.keys().copied().collect()
    }

    pub fn token(&self, topic: &TopicKey, element: &str, planet: PlanetCode) -> Option<&str> {
        self.topics
            .get(topic)?
            .element(element)?
            .get(&planet)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Canonicalize `raw_topic`, failing if another name already claimed its key.
fn claim_topic<'a>(
    sources: &mut BTreeMap<TopicKey, &'a str>,
    raw_topic: &'a str,
) -> Result<TopicKey, IngestError> {
    let key = TopicKey::canonicalize(raw_topic)?;
    if let Some(first) = sources.insert(key, raw_topic) {
        return Err(IngestError::DuplicateTopic {
            key,
            first: first.to_string(),
            second: raw_topic.to_string(),
        });
    }
    Ok(key)
}

impl TryFrom<BTreeMap<String, TopicMatrix>> for PlanetaryMatrix {
    type Error = IngestError;

    fn try_from(named: BTreeMap<String, TopicMatrix>) -> Result<Self, Self::Error> {
        let mut sources = BTreeMap::new();
        let mut topics = BTreeMap::new();
        for (raw_topic, topic) in &named {
            let key = claim_topic(&mut sources, raw_topic)?;
            topics.insert(key, topic.clone());
        }
        Ok(Self { topics })
    }
}

impl From<PlanetaryMatrix> for BTreeMap<TopicKey, TopicMatrix> {
    fn from(matrix: PlanetaryMatrix) -> Self {
        matrix.topics
    }
}

/// Hour slot → planet whose row is authoritative for that hour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourSelection {
    planets: BTreeMap<HourSlot, PlanetCode>,
}

impl HourSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hour: u32, planet: PlanetCode) -> Self {
        self.planets.insert(HourSlot::new(hour), planet);
        self
    }

    pub fn set(&mut self, hour: HourSlot, planet: PlanetCode) {
        self.planets.insert(hour, planet);
    }

    pub fn get(&self, hour: HourSlot) -> Option<PlanetCode> {
        self.planets.get(&hour).copied()
    }

    /// Configured hour slots, ascending.
    pub fn hours(&self) -> Vec<HourSlot> {
        self.planets.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}

impl FromIterator<(HourSlot, PlanetCode)> for HourSelection {
    fn from_iter<T: IntoIterator<Item = (HourSlot, PlanetCode)>>(iter: T) -> Self {
        Self {
            planets: iter.into_iter().collect(),
        }
    }
}

/// The two facets of a complete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInputs {
    pub matrix: PlanetaryMatrix,
    pub hours: HourSelection,
}

/// Inputs of the four window dates, in A, B, C, D order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInputs {
    pub a: DateInputs,
    pub b: DateInputs,
    pub c: DateInputs,
    pub d: DateInputs,
}

impl WindowInputs {
    pub fn in_order(&self) -> [&DateInputs; 4] {
        [&self.a, &self.b, &self.c, &self.d]
    }
}

/// One calendar date of one user. Complete once both facets are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    pub user: UserId,
    pub date: NaiveDate,
    pub matrix: Option<PlanetaryMatrix>,
    pub hours: Option<HourSelection>,
}

impl DateRecord {
    pub fn new(user: UserId, date: NaiveDate) -> Self {
        Self {
            user,
            date,
            matrix: None,
            hours: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.matrix.is_some() && self.hours.is_some()
    }

    /// Both facets, if the record is complete.
    pub fn inputs(&self) -> Option<DateInputs> {
        match (&self.matrix, &self.hours) {
            (Some(matrix), Some(hours)) => Some(DateInputs {
                matrix: matrix.clone(),
                hours: hours.clone(),
            }),
            _ => None,
        }
    }
}
