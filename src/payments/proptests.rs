//! Property-based tests for the sequential payment rule.
//!
//! Random valid payment sequences must preserve the cross-entry invariant
//! (a month with any recorded payment is never preceded by an unsettled
//! month) and per-entry balance conservation; generated violation attempts
//! must be rejected before any state mutation.

use chrono::Utc;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use proptest::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::decimal::Money;
use crate::directory::StaticDirectory;
use crate::errors::LedgerError;
use crate::events::EventStore;
use crate::ledger::store::{LedgerStore, MemoryLedgerStore, SharedStore};
use crate::month::Month;
use crate::schedule::{FeeRate, FeeScheduleRegistry};
use crate::types::{FeeType, HouseholdId, RateVariant};

use super::engine::PaymentEngine;
use super::PaymentRequest;

fn m(year: i32, month: u32) -> Month {
    Month::new(year, month).unwrap()
}

fn create_engine() -> (PaymentEngine, SharedStore) {
    let schedule = Arc::new(FeeScheduleRegistry::new());
    let mut events = EventStore::new();
    schedule
        .append_rate(
            FeeRate {
                fee_type: FeeType::Streetlight,
                variant: RateVariant::Standard,
                value: Money::from_major(10),
                effective_month: m(2025, 1),
            },
            &mut events,
        )
        .unwrap();
    let store: SharedStore = MemoryLedgerStore::shared();
    let engine = PaymentEngine::new(
        store.clone(),
        schedule,
        StaticDirectory::new().shared(),
    );
    (engine, store)
}

fn assert_ledger_invariants(
    store: &dyn LedgerStore,
    engine: &PaymentEngine,
    household: HouseholdId,
) {
    let entries = store
        .get_range(household, FeeType::Streetlight, Month::MIN, Month::MAX)
        .unwrap();
    for entry in &entries {
        assert_eq!(entry.amount_paid + entry.balance(), entry.total_charge);
        assert_eq!(entry.amount_paid, entry.records_total());

        if !entry.payment_records.is_empty() {
            for earlier in entry.month.earlier_in_year() {
                let earlier_entry = engine
                    .entry_or_implicit(household, FeeType::Streetlight, earlier)
                    .unwrap();
                assert!(
                    earlier_entry.is_settled(),
                    "month {} has payments while {} is unsettled",
                    entry.month,
                    earlier
                );
            }
        }
    }
}

/// payment amounts small enough to exercise partial payments against the
/// 10-peso charge
fn payment_amount() -> impl Strategy<Value = i64> {
    1i64..=20
}

proptest! {
    /// Property: greedily paying the frontier month never breaks the
    /// sequential invariant or balance conservation.
    #[test]
    fn prop_valid_sequences_preserve_invariants(
        amounts in prop::collection::vec(payment_amount(), 1..40),
    ) {
        let (engine, store) = create_engine();
        let household = Uuid::new_v4();
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();

        for amount in amounts {
            let standings = engine
                .year_standings(household, FeeType::Streetlight, 2025)
                .unwrap();
            let Some((&frontier, standing)) =
                standings.iter().find(|(_, s)| !s.status.is_paid())
            else {
                break; // whole year settled
            };

            let pay = Money::from_major(amount).min(standing.balance);
            engine
                .apply_payment(
                    PaymentRequest::cash(household, FeeType::Streetlight, frontier, pay),
                    &time,
                    &mut events,
                )
                .unwrap();

            assert_ledger_invariants(store.as_ref(), &engine, household);
        }
    }

    /// Property: paying past an unsettled month is rejected and leaves the
    /// store byte-identical.
    #[test]
    fn prop_violations_rejected_without_mutation(
        paid_prefix in 0u32..5,
        skip_ahead in 2u32..7,
        amount in payment_amount(),
    ) {
        let (engine, store) = create_engine();
        let household = Uuid::new_v4();
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();

        for month in 1..=paid_prefix {
            engine
                .apply_payment(
                    PaymentRequest::cash(
                        household,
                        FeeType::Streetlight,
                        m(2025, month),
                        Money::from_major(10),
                    ),
                    &time,
                    &mut events,
                )
                .unwrap();
        }

        let target = m(2025, paid_prefix + skip_ahead);
        let before = store
            .get_range(household, FeeType::Streetlight, Month::MIN, Month::MAX)
            .unwrap();

        let result = engine.apply_payment(
            PaymentRequest::cash(
                household,
                FeeType::Streetlight,
                target,
                Money::from_major(amount).min(Money::from_major(10)),
            ),
            &time,
            &mut events,
        );
        let is_earlier_unpaid = matches!(result, Err(LedgerError::EarlierMonthUnpaid { .. }));
        prop_assert!(is_earlier_unpaid);

        let after = store
            .get_range(household, FeeType::Streetlight, Month::MIN, Month::MAX)
            .unwrap();
        prop_assert_eq!(before, after);
    }
}
