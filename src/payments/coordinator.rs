use std::collections::{BTreeMap, BTreeSet};

use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::entry::LedgerEntry;
use crate::month::Month;
use crate::types::{FeeType, HouseholdId, PaymentMethod};

use super::engine::PaymentEngine;
use super::validator::SequentialPaymentValidator;
use super::PaymentRequest;

/// orchestrates multi-month and multi-fee-type payment sessions
///
/// A batch is validated in full against a fresh snapshot before anything is
/// written; a batch that fails validation has no side effects. Once applying
/// begins, months are committed one at a time in chronological order, and a
/// mid-batch failure leaves the earlier months committed: they are real
/// payments for real months. The report tells the caller where to resume.
pub struct BatchPaymentCoordinator {
    engine: PaymentEngine,
}

/// where a halted batch stopped and why
#[derive(Debug)]
pub struct BatchFailure {
    pub failed_month: Month,
    pub reason: LedgerError,
}

/// outcome of a batch: the committed entries, plus the halt point if the
/// batch did not complete
#[derive(Debug)]
pub struct BatchReport {
    pub applied: Vec<LedgerEntry>,
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn applied_months(&self) -> Vec<Month> {
        self.applied.iter().map(|e| e.month).collect()
    }
}

/// one fee type's share of a combined payment
#[derive(Debug, Clone)]
pub struct FeeTypeBatch {
    pub fee_type: FeeType,
    pub months: Vec<Month>,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

/// per-fee-type outcome of a combined payment
#[derive(Debug)]
pub struct FeeTypeOutcome {
    pub fee_type: FeeType,
    pub outcome: Result<BatchReport>,
}

impl BatchPaymentCoordinator {
    pub fn new(engine: PaymentEngine) -> Self {
        Self { engine }
    }

    /// pay several months of one fee type in a single action
    ///
    /// When the total equals the summed outstanding balances of the selected
    /// months, each month receives exactly its balance; otherwise the total
    /// divides evenly at centavo precision with the remainder on the
    /// earliest month.
    #[allow(clippy::too_many_arguments)]
    pub fn pay_months(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        months: &[Month],
        total: Money,
        method: PaymentMethod,
        reference: Option<String>,
        payer_identity: Option<String>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<BatchReport> {
        let selected: BTreeSet<Month> = months.iter().copied().collect();
        if selected.is_empty() {
            return Err(LedgerError::InvalidBatch {
                message: "no months selected".to_string(),
            });
        }
        if !total.is_positive() {
            return Err(LedgerError::AmountNotPositive { amount: total });
        }

        let years: BTreeSet<i32> = selected.iter().map(|m| m.year()).collect();
        if years.len() > 1 {
            return Err(LedgerError::InvalidBatch {
                message: "batch spans calendar years".to_string(),
            });
        }
        let year = selected
            .iter()
            .next()
            .map(|m| m.year())
            .unwrap_or_default();
        let standings = self.engine.year_standings(household_id, fee_type, year)?;

        if let Some(&month) = selected.iter().find(|m| !standings.contains_key(m)) {
            return Err(LedgerError::InvalidBatch {
                message: format!("month {month} is not chargeable"),
            });
        }

        let outstanding: Money = selected
            .iter()
            .filter_map(|month| standings.get(month))
            .map(|standing| standing.balance)
            .sum();

        let amounts: BTreeMap<Month, Money> = if total == outstanding {
            // exact settlement: robust to mid-selection rate differences
            selected
                .iter()
                .filter_map(|month| standings.get(month).map(|s| (*month, s.balance)))
                .filter(|(_, amount)| amount.is_positive())
                .collect()
        } else {
            let shares = total.split_even(selected.len());
            selected.iter().copied().zip(shares).collect()
        };

        SequentialPaymentValidator::validate_batch(&amounts, &standings)?;
        self.apply(
            household_id,
            fee_type,
            amounts,
            method,
            reference,
            payer_identity,
            time_provider,
            events,
        )
    }

    /// pay with an explicit per-month amount map
    #[allow(clippy::too_many_arguments)]
    pub fn pay_months_with_amounts(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        amounts: BTreeMap<Month, Money>,
        method: PaymentMethod,
        reference: Option<String>,
        payer_identity: Option<String>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<BatchReport> {
        if let Some(&amount) = amounts.values().find(|a| !a.is_positive()) {
            return Err(LedgerError::AmountNotPositive { amount });
        }

        let year = amounts
            .keys()
            .next()
            .map(|m| m.year())
            .unwrap_or_default();
        let standings = self.engine.year_standings(household_id, fee_type, year)?;

        SequentialPaymentValidator::validate_batch(&amounts, &standings)?;
        self.apply(
            household_id,
            fee_type,
            amounts,
            method,
            reference,
            payer_identity,
            time_provider,
            events,
        )
    }

    /// pay several fee types in one user gesture
    ///
    /// Each fee type's ledger is independent; this composes one `pay_months`
    /// call per fee type with no cross-type atomicity.
    pub fn pay_across_fee_types(
        &self,
        household_id: HouseholdId,
        requests: Vec<FeeTypeBatch>,
        payer_identity: Option<String>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Vec<FeeTypeOutcome> {
        requests
            .into_iter()
            .map(|request| FeeTypeOutcome {
                fee_type: request.fee_type,
                outcome: self.pay_months(
                    household_id,
                    request.fee_type,
                    &request.months,
                    request.amount,
                    request.method,
                    request.reference,
                    payer_identity.clone(),
                    time_provider,
                    events,
                ),
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        amounts: BTreeMap<Month, Money>,
        method: PaymentMethod,
        reference: Option<String>,
        payer_identity: Option<String>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<BatchReport> {
        let total: Money = amounts.values().copied().sum();
        let mut applied = Vec::new();

        // chronological order is load-bearing: each month's validity depends
        // on the earlier ones actually having committed
        for (&month, &amount) in &amounts {
            let request = PaymentRequest {
                household_id,
                fee_type,
                month,
                amount,
                method,
                reference: reference.clone(),
                payer_identity: payer_identity.clone(),
            };
            match self.engine.apply_payment(request, time_provider, events) {
                Ok(entry) => applied.push(entry),
                Err(reason) => {
                    tracing::warn!(
                        household = %household_id,
                        fee_type = %fee_type,
                        month = %month,
                        %reason,
                        applied = applied.len(),
                        "batch halted"
                    );
                    events.emit(Event::BatchHalted {
                        household_id,
                        fee_type,
                        failed_month: month,
                        applied_count: applied.len(),
                        timestamp: time_provider.now(),
                    });
                    return Ok(BatchReport {
                        applied,
                        failure: Some(BatchFailure { failed_month: month, reason }),
                    });
                }
            }
        }

        events.emit(Event::BatchApplied {
            household_id,
            fee_type,
            months: amounts.keys().copied().collect(),
            total,
            timestamp: time_provider.now(),
        });
        Ok(BatchReport { applied, failure: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::directory::StaticDirectory;
    use crate::ledger::store::{MemoryLedgerStore, SharedStore};
    use crate::schedule::{FeeRate, FeeScheduleRegistry};
    use crate::types::{EntryStatus, RateVariant};
    use chrono::Utc;
    use hourglass_rs::TimeSource;
    use std::sync::Arc;
    use uuid::Uuid;

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    struct TestLedger {
        store: SharedStore,
        engine: PaymentEngine,
        coordinator: BatchPaymentCoordinator,
        time: SafeTimeProvider,
    }

    fn create_test_ledger() -> TestLedger {
        let schedule = Arc::new(FeeScheduleRegistry::new());
        let mut events = EventStore::new();
        for (fee_type, value, effective) in [
            (FeeType::Streetlight, 10, m(2025, 1)),
            (FeeType::Streetlight, 15, m(2025, 6)),
            (FeeType::Garbage, 30, m(2025, 1)),
        ] {
            schedule
                .append_rate(
                    FeeRate {
                        fee_type,
                        variant: RateVariant::Standard,
                        value: Money::from_major(value),
                        effective_month: effective,
                    },
                    &mut events,
                )
                .unwrap();
        }

        let store: SharedStore = MemoryLedgerStore::shared();
        let engine = PaymentEngine::new(
            store.clone(),
            schedule,
            StaticDirectory::new().shared(),
        );
        TestLedger {
            store,
            coordinator: BatchPaymentCoordinator::new(engine.clone()),
            engine,
            time: SafeTimeProvider::new(TimeSource::Test(Utc::now())),
        }
    }

    #[test]
    fn test_two_leading_months_settle_exactly() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        let report = ledger
            .coordinator
            .pay_months(
                household,
                FeeType::Streetlight,
                &[m(2025, 1), m(2025, 2)],
                Money::from_major(20),
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.applied_months(), vec![m(2025, 1), m(2025, 2)]);
        for entry in &report.applied {
            assert_eq!(entry.status, EntryStatus::Paid);
            assert_eq!(entry.balance(), Money::ZERO);
        }
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::BatchApplied { .. })));
    }

    #[test]
    fn test_batch_skipping_month_rejected_without_side_effects() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        let result = ledger.coordinator.pay_months(
            household,
            FeeType::Streetlight,
            &[m(2025, 1), m(2025, 3)],
            Money::from_major(20),
            PaymentMethod::Cash,
            None,
            None,
            &ledger.time,
            &mut events,
        );
        assert_eq!(
            result.err(),
            Some(LedgerError::SequentialViolation { first_violating_month: m(2025, 3) })
        );
        assert!(ledger
            .store
            .get(household, FeeType::Streetlight, m(2025, 1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_uneven_total_that_strands_a_month_rejected() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        // 15 across two 10-peso months splits 7.50/7.50 and strands january
        let result = ledger.coordinator.pay_months(
            household,
            FeeType::Streetlight,
            &[m(2025, 1), m(2025, 2)],
            Money::from_major(15),
            PaymentMethod::Cash,
            None,
            None,
            &ledger.time,
            &mut events,
        );
        assert_eq!(
            result.err(),
            Some(LedgerError::SequentialViolation { first_violating_month: m(2025, 2) })
        );
    }

    #[test]
    fn test_exact_settlement_across_rate_change() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        // clear january through april at the old rate first
        ledger
            .coordinator
            .pay_months(
                household,
                FeeType::Streetlight,
                &[m(2025, 1), m(2025, 2), m(2025, 3), m(2025, 4)],
                Money::from_major(40),
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();

        // may is charged 10, june 15; 25 settles both exactly
        let report = ledger
            .coordinator
            .pay_months(
                household,
                FeeType::Streetlight,
                &[m(2025, 5), m(2025, 6)],
                Money::from_major(25),
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();

        assert!(report.is_complete());
        let june = &report.applied[1];
        assert_eq!(june.total_charge, Money::from_major(15));
        assert_eq!(june.status, EntryStatus::Paid);
    }

    #[test]
    fn test_topping_up_partial_month_within_batch() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        // single-month partial through the batch path
        let partial = ledger
            .coordinator
            .pay_months(
                household,
                FeeType::Streetlight,
                &[m(2025, 1)],
                Money::from_major(6),
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();
        assert_eq!(partial.applied[0].status, EntryStatus::Partial);

        // 14 = 4 remaining on january + 10 for february, settled exactly
        let report = ledger
            .coordinator
            .pay_months(
                household,
                FeeType::Streetlight,
                &[m(2025, 1), m(2025, 2)],
                Money::from_major(14),
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();

        assert!(report.is_complete());
        assert!(report.applied.iter().all(|e| e.status == EntryStatus::Paid));
    }

    #[test]
    fn test_partial_batch_failure_keeps_committed_months() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        // february's explicit amount overpays, which only surfaces at apply
        // time; january must stay committed
        let amounts: BTreeMap<Month, Money> = [
            (m(2025, 1), Money::from_major(10)),
            (m(2025, 2), Money::from_major(11)),
        ]
        .into_iter()
        .collect();

        let report = ledger
            .coordinator
            .pay_months_with_amounts(
                household,
                FeeType::Streetlight,
                amounts,
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.applied_months(), vec![m(2025, 1)]);
        let failure = report.failure.unwrap();
        assert_eq!(failure.failed_month, m(2025, 2));
        assert!(matches!(
            failure.reason,
            LedgerError::OverpaymentNotAllowed { .. }
        ));

        // january is a real payment, not rolled back
        let january = ledger
            .store
            .get(household, FeeType::Streetlight, m(2025, 1))
            .unwrap()
            .unwrap();
        assert_eq!(january.status, EntryStatus::Paid);
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::BatchHalted { failed_month, .. } if *failed_month == m(2025, 2))));
    }

    #[test]
    fn test_pay_across_fee_types_is_independent() {
        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        let outcomes = ledger.coordinator.pay_across_fee_types(
            household,
            vec![
                FeeTypeBatch {
                    fee_type: FeeType::Streetlight,
                    months: vec![m(2025, 1), m(2025, 2)],
                    amount: Money::from_major(20),
                    method: PaymentMethod::Cash,
                    reference: None,
                },
                FeeTypeBatch {
                    fee_type: FeeType::Garbage,
                    months: vec![m(2025, 1)],
                    amount: Money::from_major(30),
                    method: PaymentMethod::Cash,
                    reference: None,
                },
            ],
            Some("treasurer".to_string()),
            &ledger.time,
            &mut events,
        );

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| o.outcome.as_ref().is_ok_and(|r| r.is_complete())));

        // one fee type failing leaves the other's outcome intact
        let mixed = ledger.coordinator.pay_across_fee_types(
            household,
            vec![
                FeeTypeBatch {
                    fee_type: FeeType::Streetlight,
                    months: vec![m(2025, 3)],
                    amount: Money::from_major(10),
                    method: PaymentMethod::Cash,
                    reference: None,
                },
                FeeTypeBatch {
                    fee_type: FeeType::Garbage,
                    months: vec![m(2025, 3)], // february garbage still unpaid
                    amount: Money::from_major(30),
                    method: PaymentMethod::Cash,
                    reference: None,
                },
            ],
            None,
            &ledger.time,
            &mut events,
        );
        assert!(mixed[0].outcome.as_ref().is_ok_and(|r| r.is_complete()));
        assert!(mixed[1].outcome.is_err());
    }

    #[test]
    fn test_empty_batch_rejected() {
        let ledger = create_test_ledger();
        let mut events = EventStore::new();

        let result = ledger.coordinator.pay_months(
            Uuid::new_v4(),
            FeeType::Streetlight,
            &[],
            Money::from_major(10),
            PaymentMethod::Cash,
            None,
            None,
            &ledger.time,
            &mut events,
        );
        assert!(matches!(result, Err(LedgerError::InvalidBatch { .. })));
    }

    #[test]
    fn test_reset_round_trip_after_batch() {
        use crate::ledger::reset::LedgerResetter;

        let ledger = create_test_ledger();
        let household = Uuid::new_v4();
        let mut events = EventStore::new();

        ledger
            .coordinator
            .pay_months(
                household,
                FeeType::Streetlight,
                &[m(2025, 1), m(2025, 2)],
                Money::from_major(20),
                PaymentMethod::Cash,
                None,
                None,
                &ledger.time,
                &mut events,
            )
            .unwrap();

        let resetter = LedgerResetter::new(ledger.store.clone());
        let deleted = resetter
            .reset_household(household, FeeType::Streetlight, &ledger.time, &mut events)
            .unwrap();
        assert_eq!(deleted, 2);

        let january = ledger
            .engine
            .entry_or_implicit(household, FeeType::Streetlight, m(2025, 1))
            .unwrap();
        assert_eq!(january.status, EntryStatus::Unpaid);
        assert_eq!(january.amount_paid, Money::ZERO);
        assert_eq!(january.balance(), Money::from_major(10));
    }
}
