//! Content fingerprints for stored inputs.

use sha2::{Digest, Sha256};

use crate::models::{DateInputs, WindowInputs};

/// Calculate SHA-256 checksum of arbitrary content.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint of the four dates feeding an analysis run.
///
/// Any change to a matrix token or an hour's active planet on any of the
/// window dates yields a different digest.
pub fn fingerprint_inputs(inputs: &WindowInputs) -> String {
    let mut hasher = Sha256::new();
    for (label, date) in ["A", "B", "C", "D"].iter().zip(inputs.in_order()) {
        hasher.update(label.as_bytes());
        hash_date_inputs(&mut hasher, date);
    }
    hex::encode(hasher.finalize())
}

fn hash_date_inputs(hasher: &mut Sha256, inputs: &DateInputs) {
    for key in inputs.matrix.topic_keys() {
        hasher.update(b"\x1ft");
        hasher.update(key.to_string().as_bytes());
        if let Some(topic) = inputs.matrix.topic(&key) {
            for (element, row) in topic.elements() {
                hasher.update(b"\x1fe");
                hasher.update(element.as_bytes());
                for (planet, token) in row {
                    hasher.update(b"\x1f");
                    hasher.update(planet.as_str().as_bytes());
                    hasher.update(b"=");
                    hasher.update(token.as_bytes());
                }
            }
        }
    }
    for hour in inputs.hours.hours() {
        if let Some(planet) = inputs.hours.get(hour) {
            hasher.update(b"\x1fh");
            hasher.update(hour.value().to_le_bytes());
            hasher.update(planet.as_str().as_bytes());
        }
    }
}
