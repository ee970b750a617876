//! ABCD / BCD classification of D-day numbers.
//!
//! Given the element numbers extracted for one topic and hour on dates A, B, C
//! and D, every distinct D number is tested by value membership:
//!
//! - **ABCD**: present in at least two of the A, B and C lists.
//! - **BCD**: present in exactly one of B or C. A is not consulted.
//!
//! ABCD takes priority, so the two outputs are disjoint. Duplicates within a
//! list count once, and two different elements producing the same number on
//! different days corroborate each other.
//!
//! # Examples
//!
//! ```
//! use abcd_analysis::algorithms::classifier::classify;
//!
//! let result = classify(&[2], &[9], &[3], &[9]);
//! assert!(result.abcd.is_empty());
//! assert_eq!(result.bcd, vec![9]);
//! ```

use std::collections::{BTreeSet, HashSet};

use crate::models::{Classification, ClassificationSummary};

/// Classify the distinct numbers of `d` against `a`, `b` and `c`.
pub fn classify(a: &[u32], b: &[u32], c: &[u32], d: &[u32]) -> Classification {
    let a: HashSet<u32> = a.iter().copied().collect();
    let b: HashSet<u32> = b.iter().copied().collect();
    let c: HashSet<u32> = c.iter().copied().collect();
    let targets: BTreeSet<u32> = d.iter().copied().collect();

    let mut result = Classification::default();
    for n in targets {
        let (in_a, in_b, in_c) = (a.contains(&n), b.contains(&n), c.contains(&n));
        let corroborations = [in_a, in_b, in_c].into_iter().filter(|hit| *hit).count();
        if corroborations >= 2 {
            result.abcd.push(n);
        } else if in_b != in_c {
            result.bcd.push(n);
        }
    }
    result
}

/// Counts for a classification of `d`.
pub fn summarize(d: &[u32], classification: &Classification) -> ClassificationSummary {
    let d_count = d.iter().collect::<HashSet<_>>().len();
    let abcd_count = classification.abcd.len();
    let bcd_count = classification.bcd.len();
    let total_qualified = abcd_count + bcd_count;
    let qualification_rate = if d_count == 0 {
        0.0
    } else {
        (total_qualified as f64 / d_count as f64 * 1000.0).round() / 10.0
    };

    ClassificationSummary {
        d_count,
        abcd_count,
        bcd_count,
        total_qualified,
        qualification_rate,
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod classifier_tests;
