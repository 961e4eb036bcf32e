//! Property tests for the series algebra.
//!
//! Inputs are generated as date-keyed maps so every series is ascending and
//! date-unique by construction.

use std::collections::BTreeMap;

use approx::{abs_diff_eq, AbsDiffEq};
use cadence_core::Date;
use cadence_series::{BalanceSeries, DatedSeries, Kind, PaymentSeries};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-4;

fn base() -> Date {
    Date::from_ymd(2020, 1, 1).unwrap()
}

fn schedule() -> impl Strategy<Value = BTreeMap<i64, f64>> {
    prop::collection::btree_map(0i64..1_000, -1e6f64..1e6, 0..30)
}

fn series<K: Kind>(points: &BTreeMap<i64, f64>) -> DatedSeries<K> {
    let pairs: Vec<_> = points.iter().map(|(&offset, &v)| (base() + offset, v)).collect();
    DatedSeries::from_pairs(pairs)
}

fn is_strictly_ascending<K: Kind>(series: &DatedSeries<K>) -> bool {
    let dates: Vec<_> = series.dates().collect();
    dates.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    #[test]
    fn balance_merge_is_ascending_and_unique(a in schedule(), b in schedule()) {
        let merged = series::<cadence_series::Stock>(&a) + series(&b);
        prop_assert!(is_strictly_ascending(&merged));
        let expected: std::collections::BTreeSet<_> = a.keys().chain(b.keys()).collect();
        prop_assert_eq!(merged.len(), expected.len());
    }

    #[test]
    fn payment_merge_is_ascending_and_unique(a in schedule(), b in schedule()) {
        let merged = series::<cadence_series::Flow>(&a) + series(&b);
        prop_assert!(is_strictly_ascending(&merged));
    }

    #[test]
    fn adding_empty_is_identity(a in schedule()) {
        let s: BalanceSeries = series(&a);
        prop_assert!((&s + &BalanceSeries::empty()) == s);
        let p: PaymentSeries = series(&a);
        prop_assert!((&PaymentSeries::empty() + &p) == p);
    }

    #[test]
    fn adding_negation_gives_zero(a in schedule()) {
        let s: BalanceSeries = series(&a);
        let zero = &s + &(-&s);
        prop_assert!(zero.iter().all(|e| e.value() == 0.0));
        prop_assert_eq!(zero.len(), a.len());

        let p: PaymentSeries = series(&a);
        prop_assert!((&p - &p).iter().all(|e| e.value() == 0.0));
    }

    #[test]
    fn merge_is_commutative(a in schedule(), b in schedule()) {
        let (sa, sb): (BalanceSeries, BalanceSeries) = (series(&a), series(&b));
        prop_assert!((&sa + &sb).abs_diff_eq(&(&sb + &sa), TOLERANCE));

        let (pa, pb): (PaymentSeries, PaymentSeries) = (series(&a), series(&b));
        prop_assert!((&pa + &pb).abs_diff_eq(&(&pb + &pa), TOLERANCE));
    }

    #[test]
    fn balance_merge_matches_pointwise_sum(a in schedule(), b in schedule(), probe in -10i64..1_010) {
        let (sa, sb): (BalanceSeries, BalanceSeries) = (series(&a), series(&b));
        let date = base() + probe;
        let merged = (&sa + &sb).at(date);
        prop_assert!(abs_diff_eq!(merged, sa.at(date) + sb.at(date), epsilon = TOLERANCE));
    }

    #[test]
    fn payment_merge_matches_window_sum(
        a in schedule(),
        b in schedule(),
        from in -10i64..1_010,
        len in 1i64..400,
    ) {
        let (pa, pb): (PaymentSeries, PaymentSeries) = (series(&a), series(&b));
        let (start, end) = (base() + from, base() + from + len);
        let merged = (&pa + &pb).over(start, end);
        prop_assert!(abs_diff_eq!(merged, pa.over(start, end) + pb.over(start, end), epsilon = TOLERANCE));
    }

    #[test]
    fn after_keeps_only_later_entries(a in schedule(), cut in -10i64..1_010) {
        let p: PaymentSeries = series(&a);
        let date = base() + cut;
        let tail = p.after(date);
        prop_assert!(tail.dates().all(|d| d > date));
        prop_assert_eq!(tail.len(), a.keys().filter(|&&k| k > cut).count());
    }
}
