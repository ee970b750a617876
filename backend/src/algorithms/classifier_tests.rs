#[cfg(test)]
mod tests {
    use crate::algorithms::classifier::{classify, summarize};
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_abcd_when_seen_on_two_prior_days() {
        let result = classify(&[5, 6, 7], &[7, 8], &[7, 9], &[7]);
        assert_eq!(result.abcd, vec![7]);
        assert!(result.bcd.is_empty());
    }

    #[test]
    fn test_bcd_when_exclusive_to_b() {
        let result = classify(&[2], &[9], &[3], &[9]);
        assert!(result.abcd.is_empty());
        assert_eq!(result.bcd, vec![9]);
    }

    #[test]
    fn test_b_and_c_count_as_two_with_empty_a() {
        let result = classify(&[], &[4], &[4], &[4]);
        assert_eq!(result.abcd, vec![4]);
        assert!(result.bcd.is_empty());
    }

    #[test]
    fn test_bcd_ignores_a() {
        // 6 is in A and C: that is two corroborations, so ABCD.
        // 8 is in C only: BCD regardless of A.
        let result = classify(&[6], &[1], &[6, 8], &[6, 8]);
        assert_eq!(result.abcd, vec![6]);
        assert_eq!(result.bcd, vec![8]);

        // Exclusive to B while also absent from A still qualifies.
        let result = classify(&[], &[3], &[], &[3]);
        assert_eq!(result.bcd, vec![3]);
    }

    #[test]
    fn test_number_only_in_a_is_unclassified() {
        let result = classify(&[11], &[], &[], &[11]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_duplicates_count_once_and_outputs_are_sorted() {
        let result = classify(&[1, 1], &[1, 3, 3, 2], &[2, 2], &[3, 2, 1, 3, 1]);
        assert_eq!(result.abcd, vec![1, 2]);
        assert_eq!(result.bcd, vec![3]);
    }

    #[test]
    fn test_empty_d_yields_empty_outputs() {
        let result = classify(&[1, 2], &[1, 2], &[1, 2], &[]);
        assert!(result.is_empty());
        let summary = summarize(&[], &result);
        assert_eq!(summary.d_count, 0);
        assert_eq!(summary.qualification_rate, 0.0);
    }

    #[test]
    fn test_summary_counts_distinct_d_numbers() {
        let d = [7, 7, 9, 12];
        let result = classify(&[7], &[7, 9], &[], &d);
        let summary = summarize(&d, &result);
        assert_eq!(summary.d_count, 3);
        assert_eq!(summary.abcd_count, 1);
        assert_eq!(summary.bcd_count, 1);
        assert_eq!(summary.total_qualified, 2);
        assert_eq!(summary.qualification_rate, 66.7);
    }

    fn numbers() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(0u32..16, 0..12)
    }

    proptest! {
        #[test]
        fn prop_outputs_are_disjoint(a in numbers(), b in numbers(), c in numbers(), d in numbers()) {
            let result = classify(&a, &b, &c, &d);
            let abcd: HashSet<_> = result.abcd.iter().collect();
            prop_assert!(result.bcd.iter().all(|n| !abcd.contains(n)));
        }

        #[test]
        fn prop_abcd_iff_two_of_abc(a in numbers(), b in numbers(), c in numbers(), d in numbers()) {
            let result = classify(&a, &b, &c, &d);
            for n in &d {
                let hits = [&a, &b, &c].iter().filter(|list| list.contains(n)).count();
                prop_assert_eq!(result.abcd.contains(n), hits >= 2);
            }
        }

        #[test]
        fn prop_bcd_iff_exclusive_to_b_or_c(a in numbers(), b in numbers(), c in numbers(), d in numbers()) {
            let result = classify(&a, &b, &c, &d);
            for n in d.iter().filter(|n| !result.abcd.contains(n)) {
                prop_assert_eq!(result.bcd.contains(n), b.contains(n) != c.contains(n));
            }
        }

        #[test]
        fn prop_classification_is_idempotent_and_sorted(a in numbers(), b in numbers(), c in numbers(), d in numbers()) {
            let first = classify(&a, &b, &c, &d);
            let second = classify(&a, &b, &c, &d);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.abcd.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(first.bcd.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_outputs_are_drawn_from_d(a in numbers(), b in numbers(), c in numbers(), d in numbers()) {
            let result = classify(&a, &b, &c, &d);
            prop_assert!(result.abcd.iter().chain(&result.bcd).all(|n| d.contains(n)));
        }
    }
}
