#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use abcd_analysis::db::repositories::LocalRepository;
use abcd_analysis::db::services;
use abcd_analysis::models::{HourSelection, PlanetCode, RawMatrix, UserId};
use chrono::NaiveDate;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const TOPIC: &str = "D-1 Set-1";

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Raw matrix with one topic whose Su row yields `su` and Mo row yields `mo`.
pub fn raw_matrix(topic: &str, su: &[u32], mo: &[u32]) -> RawMatrix {
    let mut raw = RawMatrix::new();
    let elements = raw.entry(topic.to_string()).or_default();
    for (i, n) in su.iter().enumerate() {
        elements
            .entry(format!("Element{:02}", i))
            .or_default()
            .insert("Su".to_string(), format!("as-{}/su-(12 Ta 10)", n));
    }
    for (i, n) in mo.iter().enumerate() {
        elements
            .entry(format!("Element{:02}", i))
            .or_default()
            .insert("Mo".to_string(), format!("as-{}-mo-(3 Ge 14)", n));
    }
    raw
}

/// Hour 1 reads the Su row, hour 2 the Mo row.
pub fn two_hours() -> HourSelection {
    HourSelection::new()
        .with(1, PlanetCode::Su)
        .with(2, PlanetCode::Mo)
}

/// Store both facets of `day` with Su-row numbers `su`.
pub async fn seed(repo: &LocalRepository, user: &UserId, day: &str, su: &[u32]) {
    services::store_matrix(repo, user, date(day), &raw_matrix(TOPIC, su, &[]))
        .await
        .unwrap();
    services::store_hour_selection(repo, user, date(day), two_hours())
        .await
        .unwrap();
}
