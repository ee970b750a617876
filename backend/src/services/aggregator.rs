//! Per-hour, per-topic ABCD/BCD aggregation over an analysis window.

use std::collections::BTreeMap;

use chrono::Utc;
use log::{debug, info, warn};

use crate::algorithms::{classify, extract_topic_numbers, summarize};
use crate::db::checksum::fingerprint_inputs;
use crate::models::{
    AnalysisRun, AnalysisWindow, HourAnalysis, HourSlot, TopicAnalysis, TopicFailure,
    TopicFailureReason, TopicKey, UserId, WindowInputs,
};

/// Runs the classifier across every requested hour and topic.
///
/// The computation is pure: the same window inputs always yield the same
/// classifications. Topic problems never fail the run, they are collected
/// into [`HourAnalysis::failures`].
pub struct AnalysisAggregator;

impl AnalysisAggregator {
    /// Analyze `window` for `hours` and `topics`.
    ///
    /// An empty `topics` slice means every topic present in D's matrix.
    pub fn run(
        user: &UserId,
        window: AnalysisWindow,
        inputs: &WindowInputs,
        hours: &[HourSlot],
        topics: &[TopicKey],
    ) -> AnalysisRun {
        let topics = if topics.is_empty() {
            inputs.d.matrix.topic_keys()
        } else {
            topics.to_vec()
        };

        let hours: BTreeMap<HourSlot, HourAnalysis> = hours
            .iter()
            .map(|&hour| (hour, Self::analyze_hour(inputs, hour, &topics)))
            .collect();

        let failures: usize = hours.values().map(|h| h.failures.len()).sum();
        if failures > 0 {
            warn!(
                "Analysis for {} ({}) completed with {} topic failures",
                user, window, failures
            );
        }
        info!(
            "Analyzed {} for {}: {} hours x {} topics",
            window,
            user,
            hours.len(),
            topics.len()
        );

        AnalysisRun {
            user: user.clone(),
            trigger_date: window.d,
            window,
            hours,
            input_fingerprint: fingerprint_inputs(inputs),
            computed_at: Utc::now(),
        }
    }

    /// Classify every topic for one hour, plus the union across topics.
    pub fn analyze_hour(inputs: &WindowInputs, hour: HourSlot, topics: &[TopicKey]) -> HourAnalysis {
        let mut analysis = HourAnalysis {
            hour,
            topics: BTreeMap::new(),
            failures: Vec::new(),
            overall: Default::default(),
        };
        let (mut all_a, mut all_b, mut all_c, mut all_d) =
            (Vec::new(), Vec::new(), Vec::new(), Vec::new());

        for topic in topics {
            if inputs.d.matrix.topic(topic).is_none() {
                debug!("Hour {}: {} missing on D-day", hour, topic);
                analysis.failures.push(TopicFailure {
                    topic: *topic,
                    reason: TopicFailureReason::MissingOnTargetDate,
                });
                continue;
            }

            let [a, b, c, d] = inputs
                .in_order()
                .map(|date| extract_topic_numbers(&date.matrix, &date.hours, topic, hour));

            // Every topic present on D feeds the overall sets, even with an empty D list.
            all_a.extend_from_slice(&a);
            all_b.extend_from_slice(&b);
            all_c.extend_from_slice(&c);
            all_d.extend_from_slice(&d);

            if d.is_empty() {
                debug!("Hour {}: {} has no D-day numbers", hour, topic);
                analysis.failures.push(TopicFailure {
                    topic: *topic,
                    reason: TopicFailureReason::NoTargetNumbers,
                });
                continue;
            }

            let classification = classify(&a, &b, &c, &d);
            let summary = summarize(&d, &classification);
            debug!(
                "Hour {}: {} abcd={:?} bcd={:?}",
                hour, topic, classification.abcd, classification.bcd
            );

            analysis.topics.insert(
                *topic,
                TopicAnalysis {
                    abcd: classification.abcd,
                    bcd: classification.bcd,
                    d_count: summary.d_count,
                    summary,
                },
            );
        }

        analysis.overall = classify(&all_a, &all_b, &all_c, &all_d);
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateInputs, HourSelection, PlanetCode, PlanetaryMatrix, TopicMatrix};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn window() -> AnalysisWindow {
        AnalysisWindow {
            a: day(1),
            b: day(2),
            c: day(3),
            d: day(7),
        }
    }

    /// One date where each topic maps element names to Su-row element numbers.
    fn date(topics: &[(TopicKey, &[u32])]) -> DateInputs {
        let mut matrix = PlanetaryMatrix::new();
        for (key, numbers) in topics {
            let mut topic = TopicMatrix::new();
            for (i, n) in numbers.iter().enumerate() {
                topic.insert(format!("E{}", i), PlanetCode::Su, format!("as-{}/su-(1 Ar 2)", n));
                topic.insert(format!("E{}", i), PlanetCode::Mo, "as-999/mo-(1 Ar 2)");
            }
            matrix.insert_topic(*key, topic);
        }
        DateInputs {
            matrix,
            hours: HourSelection::new().with(1, PlanetCode::Su).with(2, PlanetCode::Mo),
        }
    }

    fn t(division: u16, set: u8) -> TopicKey {
        TopicKey::new(division, set)
    }

    #[test]
    fn test_classifies_each_topic_independently() {
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[5, 6, 7]), (t(3, 1), &[2])]),
            b: date(&[(t(1, 1), &[7, 8]), (t(3, 1), &[9])]),
            c: date(&[(t(1, 1), &[7, 9]), (t(3, 1), &[3])]),
            d: date(&[(t(1, 1), &[7]), (t(3, 1), &[9])]),
        };
        let run = AnalysisAggregator::run(
            &UserId::new("u1"),
            window(),
            &inputs,
            &[HourSlot::new(1)],
            &[],
        );

        let d1 = run.topic(HourSlot::new(1), &t(1, 1)).unwrap();
        assert_eq!(d1.abcd, vec![7]);
        assert!(d1.bcd.is_empty());

        let d3 = run.topic(HourSlot::new(1), &t(3, 1)).unwrap();
        assert!(d3.abcd.is_empty());
        assert_eq!(d3.bcd, vec![9]);
        assert_eq!(run.trigger_date, day(7));
    }

    #[test]
    fn test_hour_selects_planet_row() {
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[1])]),
            b: date(&[(t(1, 1), &[1])]),
            c: date(&[(t(1, 1), &[1])]),
            d: date(&[(t(1, 1), &[1])]),
        };
        let run = AnalysisAggregator::run(
            &UserId::new("u1"),
            window(),
            &inputs,
            &[HourSlot::new(1), HourSlot::new(2)],
            &[],
        );
        assert_eq!(run.topic(HourSlot::new(1), &t(1, 1)).unwrap().abcd, vec![1]);
        assert_eq!(run.topic(HourSlot::new(2), &t(1, 1)).unwrap().abcd, vec![999]);
    }

    #[test]
    fn test_topic_absent_on_prior_date_is_empty_list() {
        let inputs = WindowInputs {
            a: date(&[]),
            b: date(&[(t(1, 1), &[4])]),
            c: date(&[(t(1, 1), &[4])]),
            d: date(&[(t(1, 1), &[4])]),
        };
        let hour = AnalysisAggregator::analyze_hour(&inputs, HourSlot::new(1), &[t(1, 1)]);
        assert_eq!(hour.topics[&t(1, 1)].abcd, vec![4]);
        assert!(hour.failures.is_empty());
    }

    #[test]
    fn test_partial_failures_do_not_abort() {
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[4])]),
            b: date(&[(t(1, 1), &[4])]),
            c: date(&[(t(1, 1), &[4])]),
            d: date(&[(t(1, 1), &[4]), (t(9, 2), &[])]),
        };
        let hour = AnalysisAggregator::analyze_hour(
            &inputs,
            HourSlot::new(1),
            &[t(1, 1), t(9, 2), t(60, 1)],
        );

        assert_eq!(hour.successful_topics(), 1);
        assert_eq!(hour.total_topics(), 3);
        assert_eq!(
            hour.failures,
            vec![
                TopicFailure {
                    topic: t(9, 2),
                    reason: TopicFailureReason::NoTargetNumbers,
                },
                TopicFailure {
                    topic: t(60, 1),
                    reason: TopicFailureReason::MissingOnTargetDate,
                },
            ]
        );
    }

    #[test]
    fn test_unconfigured_hour_fails_every_topic() {
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[4])]),
            b: date(&[(t(1, 1), &[4])]),
            c: date(&[(t(1, 1), &[4])]),
            d: date(&[(t(1, 1), &[4])]),
        };
        let hour = AnalysisAggregator::analyze_hour(&inputs, HourSlot::new(5), &[t(1, 1)]);
        assert!(hour.topics.is_empty());
        assert_eq!(hour.failures[0].reason, TopicFailureReason::NoTargetNumbers);
    }

    #[test]
    fn test_overall_unions_topics() {
        // 11 appears in B under one topic and in C under another.
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[1]), (t(3, 1), &[2])]),
            b: date(&[(t(1, 1), &[11]), (t(3, 1), &[3])]),
            c: date(&[(t(1, 1), &[4]), (t(3, 1), &[11])]),
            d: date(&[(t(1, 1), &[11]), (t(3, 1), &[5])]),
        };
        let hour = AnalysisAggregator::analyze_hour(&inputs, HourSlot::new(1), &[t(1, 1), t(3, 1)]);

        assert_eq!(hour.topics[&t(1, 1)].bcd, vec![11]);
        assert_eq!(hour.overall.abcd, vec![11]);
        assert!(hour.overall.bcd.is_empty());
    }

    #[test]
    fn test_overall_counts_topics_with_empty_target_list() {
        // D-1 has nothing on D for this hour but still saw 11 on B.
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[]), (t(3, 1), &[])]),
            b: date(&[(t(1, 1), &[11]), (t(3, 1), &[])]),
            c: date(&[(t(1, 1), &[]), (t(3, 1), &[11])]),
            d: date(&[(t(1, 1), &[]), (t(3, 1), &[11])]),
        };
        let hour = AnalysisAggregator::analyze_hour(&inputs, HourSlot::new(1), &[t(1, 1), t(3, 1)]);

        assert_eq!(hour.failures.len(), 1);
        assert_eq!(hour.topics[&t(3, 1)].bcd, vec![11]);
        assert_eq!(hour.overall.abcd, vec![11]);
        assert!(hour.overall.bcd.is_empty());
    }

    #[test]
    fn test_overall_ignores_topics_missing_on_target() {
        let inputs = WindowInputs {
            a: date(&[]),
            b: date(&[(t(1, 1), &[11])]),
            c: date(&[(t(3, 1), &[11])]),
            d: date(&[(t(3, 1), &[11])]),
        };
        let hour = AnalysisAggregator::analyze_hour(&inputs, HourSlot::new(1), &[t(1, 1), t(3, 1)]);

        assert_eq!(hour.failures[0].reason, TopicFailureReason::MissingOnTargetDate);
        assert!(hour.overall.abcd.is_empty());
        assert_eq!(hour.overall.bcd, vec![11]);
    }

    #[test]
    fn test_target_count_is_distinct() {
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[1])]),
            b: date(&[(t(1, 1), &[1])]),
            c: date(&[(t(1, 1), &[2])]),
            d: date(&[(t(1, 1), &[1, 1, 2])]),
        };
        let hour = AnalysisAggregator::analyze_hour(&inputs, HourSlot::new(1), &[t(1, 1)]);
        let topic = &hour.topics[&t(1, 1)];
        assert_eq!(topic.d_count, 2);
        assert_eq!(topic.d_count, topic.summary.d_count);
    }

    #[test]
    fn test_run_is_deterministic_apart_from_timestamp() {
        let inputs = WindowInputs {
            a: date(&[(t(1, 1), &[5, 6, 7])]),
            b: date(&[(t(1, 1), &[7, 8])]),
            c: date(&[(t(1, 1), &[7, 9])]),
            d: date(&[(t(1, 1), &[7, 8, 9])]),
        };
        let user = UserId::new("u1");
        let hours = [HourSlot::new(1)];
        let first = AnalysisAggregator::run(&user, window(), &inputs, &hours, &[]);
        let second = AnalysisAggregator::run(&user, window(), &inputs, &hours, &[]);
        assert_eq!(first.hours, second.hours);
        assert_eq!(first.input_fingerprint, second.input_fingerprint);
    }
}
