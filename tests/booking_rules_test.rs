//! Booking lifecycle rules over the public crate API: transition
//! legality, authorization, and the approval window under a
//! deterministic clock.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rentit::domain::{
    check_transition, ranges_overlap, Booking, BookingStatus, Clock, FixedClock,
};
use rentit::errors::AppError;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn booking_at_status(status: BookingStatus, renter: Uuid, owner: Uuid) -> Booking {
    let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    Booking {
        id: Uuid::new_v4(),
        item_id: Uuid::new_v4(),
        renter_id: renter,
        owner_id: owner,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        status,
        total_days: 5,
        base_total: dec!(500.00),
        discount_rate: dec!(0.00),
        discount_amount: dec!(0.00),
        final_total: dec!(500.00),
        deposit: dec!(150.00),
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn happy_path_runs_through_the_whole_lifecycle() {
    let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
    let clock = FixedClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());

    let mut booking = booking_at_status(BookingStatus::Pending, renter, owner);

    for target in [
        BookingStatus::Approved,
        BookingStatus::PaymentPending,
        BookingStatus::Completed,
    ] {
        check_transition(&booking, owner, target, clock.now()).unwrap();
        booking.status = target;
    }

    assert!(booking.status.is_terminal());
}

#[test]
fn renter_cannot_drive_owner_only_edges() {
    let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

    let pending = booking_at_status(BookingStatus::Pending, renter, owner);
    for target in [BookingStatus::Approved, BookingStatus::Rejected] {
        assert!(matches!(
            check_transition(&pending, renter, target, now),
            Err(AppError::Forbidden)
        ));
    }

    let approved = booking_at_status(BookingStatus::Approved, renter, owner);
    assert!(matches!(
        check_transition(&approved, renter, BookingStatus::PaymentPending, now),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn strangers_are_rejected_before_anything_else() {
    let (renter, owner, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

    let booking = booking_at_status(BookingStatus::Pending, renter, owner);
    assert!(matches!(
        check_transition(&booking, stranger, BookingStatus::Cancelled, now),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn no_edge_leaves_a_terminal_state() {
    let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

    for terminal in [
        BookingStatus::Rejected,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ] {
        let booking = booking_at_status(terminal, renter, owner);
        for target in [
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::PaymentPending,
            BookingStatus::Completed,
        ] {
            assert!(
                matches!(
                    check_transition(&booking, owner, target, now),
                    Err(AppError::InvalidTransition(_))
                ),
                "{terminal:?} -> {target:?} should be illegal"
            );
        }
    }
}

#[test]
fn approval_window_is_enforced_against_the_injected_clock() {
    let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
    let booking = booking_at_status(BookingStatus::Pending, renter, owner);

    let clock = FixedClock::at(booking.created_at + Duration::hours(47) + Duration::minutes(59));
    check_transition(&booking, owner, BookingStatus::Approved, clock.now()).unwrap();

    clock.set(booking.created_at + Duration::hours(48) + Duration::seconds(1));
    assert!(matches!(
        check_transition(&booking, owner, BookingStatus::Approved, clock.now()),
        Err(AppError::BookingExpired)
    ));

    // Rejection and cancellation stay open past the window
    check_transition(&booking, owner, BookingStatus::Rejected, clock.now()).unwrap();
    check_transition(&booking, renter, BookingStatus::Cancelled, clock.now()).unwrap();
}

#[test]
fn overlap_predicate_matches_the_store_semantics() {
    let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2025, m, day).unwrap();

    // shared single endpoint counts as overlap
    assert!(ranges_overlap(d(3, 1), d(3, 5), d(3, 5), d(3, 9)));
    // adjacent but disjoint ranges do not
    assert!(!ranges_overlap(d(3, 1), d(3, 4), d(3, 5), d(3, 9)));
    // rejected-then-rebook windows may legally intersect old terminal
    // bookings; the predicate itself is status-blind
    assert!(ranges_overlap(d(3, 3), d(3, 7), d(3, 1), d(3, 5)));
}
