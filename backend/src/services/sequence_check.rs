//! Calendar-sequence checks for newly added dates.
//!
//! Windows are positional, so a gap in the calendar silently widens the span
//! between A and D. These helpers report such gaps before data is added and
//! describe which dates a window actually used.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::AnalysisWindow;

/// Outcome of checking a date before it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDateCheck {
    pub date: NaiveDate,
    pub previous_day: Option<NaiveDate>,
    pub has_previous_day: bool,
    /// The catalogue was empty.
    pub is_first: bool,
    /// Calendar days between the latest catalogue date and `date`.
    pub missing_dates: Vec<NaiveDate>,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

impl NewDateCheck {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check that the day before `new_date` already has complete data.
pub fn check_new_date(catalogue: &[NaiveDate], new_date: NaiveDate) -> NewDateCheck {
    let previous_day = new_date.checked_sub_days(Days::new(1));
    let has_previous_day = previous_day.is_some_and(|prev| catalogue.contains(&prev));
    let mut check = NewDateCheck {
        date: new_date,
        previous_day,
        has_previous_day,
        is_first: catalogue.is_empty(),
        missing_dates: Vec::new(),
        issues: Vec::new(),
        suggestions: Vec::new(),
    };

    if check.is_first {
        check
            .suggestions
            .push("First date for this user, no previous data required".to_string());
        return check;
    }
    if has_previous_day {
        return check;
    }

    let prev = previous_day.map(|d| d.to_string()).unwrap_or_default();
    check
        .issues
        .push(format!("{} has no data for the previous day {}", new_date, prev));
    check
        .suggestions
        .push(format!("Add {} first, then add {}", prev, new_date));

    if let Some(latest) = catalogue.iter().max() {
        check.missing_dates = days_between(*latest, new_date);
        if !check.missing_dates.is_empty() {
            let listed: Vec<String> = check.missing_dates.iter().map(|d| d.to_string()).collect();
            check
                .suggestions
                .push(format!("Fill the gap in order: {}", listed.join(", ")));
        }
    }
    check
}

/// Dates to add, in order, to reach `target` without calendar gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedSequence {
    pub sequence: Vec<NaiveDate>,
    pub description: String,
}

pub fn recommended_sequence(catalogue: &[NaiveDate], target: NaiveDate) -> RecommendedSequence {
    match catalogue.iter().max() {
        None => {
            let sequence: Vec<NaiveDate> = target
                .checked_sub_days(Days::new(1))
                .into_iter()
                .chain(std::iter::once(target))
                .collect();
            let description = match sequence.first() {
                Some(first) if *first != target => format!(
                    "First time setup: add {} then {}",
                    first, target
                ),
                _ => format!("First time setup: add {}", target),
            };
            RecommendedSequence {
                sequence,
                description,
            }
        }
        Some(latest) => {
            let mut sequence = days_between(*latest, target);
            if target > *latest {
                sequence.push(target);
            }
            RecommendedSequence {
                description: format!(
                    "Sequential addition: {} dates needed after {}",
                    sequence.len(),
                    latest
                ),
                sequence,
            }
        }
    }
}

/// Human-readable account of the dates a window used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowExplanation {
    pub window: AnalysisWindow,
    /// Calendar days from A to D.
    pub span_days: i64,
    pub calendar_consecutive: bool,
    pub description: String,
}

pub fn explain_window(window: &AnalysisWindow) -> WindowExplanation {
    let span_days = (window.d - window.a).num_days();
    let calendar_consecutive = span_days == 3;
    let mut description = format!(
        "Analysis of {} uses A={}, B={}, C={}",
        window.d, window.a, window.b, window.c
    );
    if !calendar_consecutive {
        description.push_str(&format!(
            " (spanning {} calendar days; gaps are skipped)",
            span_days
        ));
    }
    WindowExplanation {
        window: *window,
        span_days,
        calendar_consecutive,
        description,
    }
}

/// Calendar days strictly between `from` and `to`.
fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days()
        .skip(1)
        .take_while(|d| *d < to)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn test_first_date_is_valid() {
        let check = check_new_date(&[], day(3));
        assert!(check.is_valid());
        assert!(check.is_first);
    }

    #[test]
    fn test_previous_day_present() {
        let check = check_new_date(&[day(1), day(2)], day(3));
        assert!(check.is_valid());
        assert!(check.has_previous_day);
        assert!(check.missing_dates.is_empty());
    }

    #[test]
    fn test_gap_lists_missing_dates() {
        let check = check_new_date(&[day(1), day(3)], day(7));
        assert!(!check.is_valid());
        assert_eq!(check.previous_day, Some(day(6)));
        assert_eq!(check.missing_dates, vec![day(4), day(5), day(6)]);
        assert_eq!(check.suggestions.len(), 2);
    }

    #[test]
    fn test_backfill_has_no_gap_listing() {
        // Adding an earlier date: nothing lies between latest and it.
        let check = check_new_date(&[day(5), day(9)], day(3));
        assert!(!check.is_valid());
        assert!(check.missing_dates.is_empty());
    }

    #[test]
    fn test_recommended_sequence_from_empty() {
        let seq = recommended_sequence(&[], day(8));
        assert_eq!(seq.sequence, vec![day(7), day(8)]);
    }

    #[test]
    fn test_recommended_sequence_after_latest() {
        let seq = recommended_sequence(&[day(1), day(4)], day(7));
        assert_eq!(seq.sequence, vec![day(5), day(6), day(7)]);
        assert!(recommended_sequence(&[day(9)], day(7)).sequence.is_empty());
    }

    #[test]
    fn test_explain_window_flags_gaps() {
        let consecutive = explain_window(&AnalysisWindow {
            a: day(1),
            b: day(2),
            c: day(3),
            d: day(4),
        });
        assert!(consecutive.calendar_consecutive);

        let gapped = explain_window(&AnalysisWindow {
            a: day(1),
            b: day(2),
            c: day(3),
            d: day(7),
        });
        assert!(!gapped.calendar_consecutive);
        assert_eq!(gapped.span_days, 6);
        assert!(gapped.description.contains("A=2025-07-01"));
    }
}
