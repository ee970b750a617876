//! Hour resolution and element-number extraction.

use crate::models::{HourSelection, HourSlot, PlanetCode, PlanetaryMatrix, TopicKey};

use super::token::parse_element_number;

/// Planet whose row is authoritative for `hour`, if the hour is configured.
pub fn active_planet(hours: &HourSelection, hour: HourSlot) -> Option<PlanetCode> {
    hours.get(hour)
}

/// Element number for one (topic, element, hour); `None` when any link is missing.
pub fn extract(
    matrix: &PlanetaryMatrix,
    hours: &HourSelection,
    topic: &TopicKey,
    element: &str,
    hour: HourSlot,
) -> Option<u32> {
    let planet = active_planet(hours, hour)?;
    parse_element_number(matrix.token(topic, element, planet)?)
}

/// Element numbers of every element of `topic`, in element order.
///
/// Duplicates across elements are kept: classification works on value
/// membership, not per-element identity.
pub fn extract_topic_numbers(
    matrix: &PlanetaryMatrix,
    hours: &HourSelection,
    topic: &TopicKey,
    hour: HourSlot,
) -> Vec<u32> {
    let (Some(planet), Some(topic_matrix)) = (active_planet(hours, hour), matrix.topic(topic))
    else {
        return Vec::new();
    };

    topic_matrix
        .elements()
        .filter_map(|(_, row)| row.get(&planet))
        .filter_map(|token| parse_element_number(token))
        .collect()
}
