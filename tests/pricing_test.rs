//! Pricing engine tests over the public crate API.

use chrono::NaiveDate;
use rentit::domain::pricing::quote;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn week_long_rental_scenario() {
    // 500/day from Mar 1 to Mar 8 inclusive: 8 days, 10% tier
    let q = quote(dec!(500), date(2025, 3, 1), date(2025, 3, 8)).unwrap();

    assert_eq!(q.total_days, 8);
    assert_eq!(q.base_total, dec!(4000.00));
    assert_eq!(q.discount_rate, dec!(0.10));
    assert_eq!(q.discount_amount, dec!(400.00));
    assert_eq!(q.final_total, dec!(3600.00));
}

#[test]
fn month_long_rental_scenario() {
    // 100/day for 30 inclusive days: 20% tier
    let q = quote(dec!(100), date(2025, 3, 1), date(2025, 3, 30)).unwrap();

    assert_eq!(q.total_days, 30);
    assert_eq!(q.discount_rate, dec!(0.20));
    assert_eq!(q.discount_amount, dec!(600.00));
    assert_eq!(q.final_total, dec!(2400.00));
}

#[test]
fn discount_tiers_switch_exactly_at_boundaries() {
    let rate_for_days = |days: u32| {
        quote(dec!(100), date(2025, 6, 1), date(2025, 6, days))
            .unwrap()
            .discount_rate
    };

    assert_eq!(rate_for_days(2), dec!(0.00));
    assert_eq!(rate_for_days(6), dec!(0.00));
    assert_eq!(rate_for_days(7), dec!(0.10));
    assert_eq!(rate_for_days(29), dec!(0.10));
    assert_eq!(rate_for_days(30), dec!(0.20));
}

#[test]
fn counting_is_inclusive_of_both_endpoints() {
    for k in 1..=60i64 {
        let end = date(2025, 1, 1) + chrono::Duration::days(k);
        let q = quote(dec!(50), date(2025, 1, 1), end).unwrap();
        assert_eq!(q.total_days, k + 1, "k = {k}");
    }
}

#[test]
fn minimum_rental_is_two_inclusive_days() {
    // start == end is rejected: the rule is a strict date gap
    assert!(quote(dec!(100), date(2025, 3, 5), date(2025, 3, 5)).is_err());
    assert!(quote(dec!(100), date(2025, 3, 6), date(2025, 3, 5)).is_err());

    let q = quote(dec!(100), date(2025, 3, 5), date(2025, 3, 6)).unwrap();
    assert_eq!(q.total_days, 2);
}

#[test]
fn equal_inputs_give_equal_quotes() {
    let a = quote(dec!(77.77), date(2025, 9, 10), date(2025, 10, 20)).unwrap();
    let b = quote(dec!(77.77), date(2025, 9, 10), date(2025, 10, 20)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn final_total_never_includes_deposit() {
    // The quote has no deposit input at all: whatever deposit an item
    // carries is snapshotted separately at booking time.
    let q = quote(dec!(200), date(2025, 3, 1), date(2025, 3, 10)).unwrap();
    assert_eq!(q.final_total, q.base_total - q.discount_amount);
}
