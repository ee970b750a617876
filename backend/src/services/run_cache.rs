//! Memoized analysis runs keyed by (user, trigger date).
//!
//! A stored run is either returned unchanged or recomputed wholesale; there
//! is no partial patching. Concurrent refreshes of the same key race and the
//! last completed write wins.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::aggregator::AnalysisAggregator;
use super::error::AnalysisError;
use crate::db::checksum::fingerprint_inputs;
use crate::db::repository::{AnalysisResultRepository, FullRepository};
use crate::db::services as db_services;
use crate::models::{hour_range, AnalysisRun, AnalysisWindow, HourSlot, UserId};

/// How a requested date picks D.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// The date itself is D.
    #[default]
    EndingAt,
    /// D is the closest complete date strictly before the requested one.
    Before,
}

#[derive(Clone)]
pub struct AnalysisRunCache {
    repo: Arc<dyn FullRepository>,
    default_hour_count: u32,
}

impl AnalysisRunCache {
    pub fn new(repo: Arc<dyn FullRepository>, default_hour_count: u32) -> Self {
        Self {
            repo,
            default_hour_count,
        }
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repo
    }

    /// Resolve the analysis window for `date` against the current catalogue.
    pub async fn resolve_window(
        &self,
        user: &UserId,
        date: NaiveDate,
        mode: WindowMode,
    ) -> Result<AnalysisWindow, AnalysisError> {
        let resolver = db_services::load_resolver(self.repo.as_ref(), user).await?;
        let window = match mode {
            WindowMode::EndingAt => resolver.window_ending_at(date)?,
            WindowMode::Before => resolver.window_before(date)?,
        };
        Ok(window)
    }

    /// Hours to analyze: `requested`, or 1..=N from the user's hour count.
    pub async fn resolve_hours(
        &self,
        user: &UserId,
        requested: &[HourSlot],
    ) -> Result<Vec<HourSlot>, AnalysisError> {
        if !requested.is_empty() {
            let unique: BTreeSet<HourSlot> = requested.iter().copied().collect();
            return Ok(unique.into_iter().collect());
        }
        let count =
            db_services::resolve_hour_count(self.repo.as_ref(), user, self.default_hour_count)
                .await?;
        Ok(hour_range(count))
    }

    /// Run for `trigger` as D.
    pub async fn get_or_compute(
        &self,
        user: &UserId,
        trigger: NaiveDate,
        hours: &[HourSlot],
        refresh: bool,
    ) -> Result<AnalysisRun, AnalysisError> {
        let window = self
            .resolve_window(user, trigger, WindowMode::EndingAt)
            .await?;
        self.get_or_compute_window(user, window, hours, refresh)
            .await
    }

    /// Run for the closest complete date before `reference`, cached under that date.
    pub async fn get_or_compute_before(
        &self,
        user: &UserId,
        reference: NaiveDate,
        hours: &[HourSlot],
        refresh: bool,
    ) -> Result<AnalysisRun, AnalysisError> {
        let window = self
            .resolve_window(user, reference, WindowMode::Before)
            .await?;
        self.get_or_compute_window(user, window, hours, refresh)
            .await
    }

    async fn get_or_compute_window(
        &self,
        user: &UserId,
        window: AnalysisWindow,
        hours: &[HourSlot],
        refresh: bool,
    ) -> Result<AnalysisRun, AnalysisError> {
        let mut hours = self.resolve_hours(user, hours).await?;
        let cached = self.repo.get_run(user, window.d).await?;

        if let Some(run) = cached {
            if run.window == window {
                if !refresh && run.covers_hours(&hours) {
                    debug!("Cache hit for {} on {}", user, window.d);
                    return Ok(run);
                }
                // Keep previously analyzed hours in the replacement run.
                hours.extend(run.hours.keys().copied());
                hours.sort();
                hours.dedup();
            }
        }

        let run = self.compute(user, window, hours).await?;
        self.repo.put_run(run.clone()).await?;
        info!(
            "Stored analysis run for {} on {} ({} hours)",
            user,
            run.trigger_date,
            run.hours.len()
        );
        Ok(run)
    }

    async fn compute(
        &self,
        user: &UserId,
        window: AnalysisWindow,
        hours: Vec<HourSlot>,
    ) -> Result<AnalysisRun, AnalysisError> {
        let inputs = db_services::load_window_inputs(self.repo.as_ref(), user, &window).await?;
        let user = user.clone();
        tokio::task::spawn_blocking(move || {
            AnalysisAggregator::run(&user, window, &inputs, &hours, &[])
        })
        .await
        .map_err(|e| AnalysisError::Task(e.to_string()))
    }

    /// Drop every stored run whose window includes `date`.
    pub async fn invalidate(&self, user: &UserId, date: NaiveDate) -> Result<usize, AnalysisError> {
        Ok(self.repo.delete_runs_touching(user, date).await?)
    }

    /// Store a run computed elsewhere, replacing any prior entry.
    pub async fn store(&self, run: AnalysisRun) -> Result<(), AnalysisError> {
        Ok(self.repo.put_run(run).await?)
    }

    /// Whether the stored run for `trigger` no longer matches its inputs.
    ///
    /// # Returns
    /// * `Ok(None)` - nothing cached for `trigger`
    /// * `Ok(Some(true))` - the window moved, became unresolvable, or an input changed
    pub async fn is_stale(
        &self,
        user: &UserId,
        trigger: NaiveDate,
    ) -> Result<Option<bool>, AnalysisError> {
        let Some(run) = self.repo.get_run(user, trigger).await? else {
            return Ok(None);
        };
        let window = match self
            .resolve_window(user, trigger, WindowMode::EndingAt)
            .await
        {
            Ok(window) => window,
            Err(AnalysisError::Window(_)) => return Ok(Some(true)),
            Err(e) => return Err(e),
        };
        if window != run.window {
            return Ok(Some(true));
        }
        let inputs = db_services::load_window_inputs(self.repo.as_ref(), user, &window).await?;
        Ok(Some(fingerprint_inputs(&inputs) != run.input_fingerprint))
    }
}
