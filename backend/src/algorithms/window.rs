//! Analysis window resolution over a user's catalogue of complete dates.
//!
//! Windows are positional: A, B and C are the three catalogue entries that
//! immediately precede D, whatever the calendar gaps between them.

use chrono::NaiveDate;

use crate::models::AnalysisWindow;

/// Number of dates that must precede D in the catalogue.
pub const REQUIRED_PRECEDING: usize = 3;

/// Window resolution failure. Deterministic for a given catalogue, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error(
        "Not enough prior data to analyze {date}: {preceding} complete date(s) precede it, {required} required"
    )]
    InsufficientHistory {
        date: NaiveDate,
        preceding: usize,
        required: usize,
    },

    #[error("No complete date precedes {reference}")]
    NoPriorDate { reference: NaiveDate },

    #[error("{date} has no complete record")]
    NotInCatalogue { date: NaiveDate },
}

/// Resolves A/B/C/D windows from an ascending catalogue of complete dates.
#[derive(Debug, Clone, Default)]
pub struct DateSequenceResolver {
    catalogue: Vec<NaiveDate>,
}

impl DateSequenceResolver {
    /// Build a resolver; the input is sorted and deduplicated.
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut catalogue: Vec<NaiveDate> = dates.into_iter().collect();
        catalogue.sort_unstable();
        catalogue.dedup();
        Self { catalogue }
    }

    pub fn catalogue(&self) -> &[NaiveDate] {
        &self.catalogue
    }

    pub fn len(&self) -> usize {
        self.catalogue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogue.is_empty()
    }

    /// Zero-based catalogue position of `date`.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.catalogue.binary_search(&date).ok()
    }

    /// Greatest catalogue date strictly before `reference`.
    pub fn previous_date(&self, reference: NaiveDate) -> Option<NaiveDate> {
        let idx = self.catalogue.partition_point(|d| *d < reference);
        idx.checked_sub(1).map(|i| self.catalogue[i])
    }

    /// Dates that can serve as D.
    pub fn analyzable_dates(&self) -> &[NaiveDate] {
        self.catalogue.get(REQUIRED_PRECEDING..).unwrap_or(&[])
    }

    /// Window with `date` as D and its three catalogue predecessors as A, B, C.
    pub fn window_ending_at(&self, date: NaiveDate) -> Result<AnalysisWindow, WindowError> {
        let k = self
            .position_of(date)
            .ok_or(WindowError::NotInCatalogue { date })?;
        if k < REQUIRED_PRECEDING {
            return Err(WindowError::InsufficientHistory {
                date,
                preceding: k,
                required: REQUIRED_PRECEDING,
            });
        }

        Ok(AnalysisWindow {
            a: self.catalogue[k - 3],
            b: self.catalogue[k - 2],
            c: self.catalogue[k - 1],
            d: self.catalogue[k],
        })
    }

    /// Window ending at the nearest complete date strictly before `reference`.
    ///
    /// `reference` itself is never used as D, even when it is complete.
    pub fn window_before(&self, reference: NaiveDate) -> Result<AnalysisWindow, WindowError> {
        let d = self
            .previous_date(reference)
            .ok_or(WindowError::NoPriorDate { reference })?;
        self.window_ending_at(d)
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod window_tests;
