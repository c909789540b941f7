use std::collections::BTreeMap;
use std::sync::Arc;

use hourglass_rs::SafeTimeProvider;

use crate::directory::SharedDirectory;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::entry::{LedgerEntry, PaymentRecord};
use crate::ledger::store::SharedStore;
use crate::month::Month;
use crate::schedule::FeeScheduleRegistry;
use crate::types::{EntryStatus, FeeType, HouseholdId};

use super::validator::MonthStanding;
use super::PaymentRequest;

/// applies validated payments to ledger entries
///
/// Each `apply_payment` call is the unit of atomicity: the entry is loaded
/// (or materialized at the resolved charge), checked, and written back with
/// a compare-and-swap, retrying when a concurrent writer got there first.
#[derive(Clone)]
pub struct PaymentEngine {
    store: SharedStore,
    schedule: Arc<FeeScheduleRegistry>,
    directory: SharedDirectory,
}

impl PaymentEngine {
    pub fn new(
        store: SharedStore,
        schedule: Arc<FeeScheduleRegistry>,
        directory: SharedDirectory,
    ) -> Self {
        Self {
            store,
            schedule,
            directory,
        }
    }

    /// stored entry, or the implicit-unpaid entry at the month's resolved
    /// charge when none is persisted
    pub fn entry_or_implicit(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
    ) -> Result<LedgerEntry> {
        if let Some(entry) = self.store.get(household_id, fee_type, month)? {
            return Ok(entry);
        }
        let variant = self.directory.rate_variant(household_id);
        let charge = self.schedule.resolve_charge(fee_type, month, variant)?;
        Ok(LedgerEntry::implicit_unpaid(household_id, fee_type, month, charge))
    }

    /// snapshot of every chargeable month of the year
    pub fn year_standings(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        year: i32,
    ) -> Result<BTreeMap<Month, MonthStanding>> {
        let variant = self.directory.rate_variant(household_id);
        let mut standings = BTreeMap::new();
        for month in Month::months_of_year(year) {
            match self.schedule.resolve_charge(fee_type, month, variant) {
                Ok(_) => {
                    let entry = self.entry_or_implicit(household_id, fee_type, month)?;
                    standings.insert(
                        month,
                        MonthStanding {
                            status: entry.status,
                            balance: entry.balance(),
                        },
                    );
                }
                // months before the fee existed are not chargeable
                Err(LedgerError::NoRateDefined { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(standings)
    }

    /// status-only view of `year_standings`, for selection UIs
    pub fn year_statuses(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        year: i32,
    ) -> Result<BTreeMap<Month, EntryStatus>> {
        Ok(self
            .year_standings(household_id, fee_type, year)?
            .into_iter()
            .map(|(month, standing)| (month, standing.status))
            .collect())
    }

    /// record a payment against a single month
    pub fn apply_payment(
        &self,
        request: PaymentRequest,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<LedgerEntry> {
        if !request.amount.is_positive() {
            return Err(LedgerError::AmountNotPositive { amount: request.amount });
        }

        loop {
            self.guard_sequential(request.household_id, request.fee_type, request.month)?;

            let current =
                self.entry_or_implicit(request.household_id, request.fee_type, request.month)?;

            if request.amount > current.balance() {
                return Err(LedgerError::OverpaymentNotAllowed {
                    month: request.month,
                    charge: current.total_charge,
                    already_paid: current.amount_paid,
                    attempted: request.amount,
                });
            }

            let mut entry = current.clone();
            entry.push_record(PaymentRecord {
                amount: request.amount,
                method: request.method,
                reference: request.reference.clone(),
                paid_at: time_provider.now(),
                paid_by: request.payer_identity.clone(),
            });

            match self.store.upsert(entry, current.version) {
                Ok(stored) => {
                    tracing::debug!(
                        household = %stored.household_id,
                        fee_type = %stored.fee_type,
                        month = %stored.month,
                        amount = %request.amount,
                        status = ?stored.status,
                        "payment applied"
                    );
                    events.emit(Event::PaymentRecorded {
                        household_id: stored.household_id,
                        fee_type: stored.fee_type,
                        month: stored.month,
                        amount: request.amount,
                        method: request.method,
                        new_status: stored.status,
                        timestamp: time_provider.now(),
                    });
                    if stored.is_settled() {
                        events.emit(Event::MonthSettled {
                            household_id: stored.household_id,
                            fee_type: stored.fee_type,
                            month: stored.month,
                            total_charge: stored.total_charge,
                            timestamp: time_provider.now(),
                        });
                    }
                    return Ok(stored);
                }
                // lost the race; reload and re-check
                Err(LedgerError::WriteConflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// every earlier chargeable month of the same year must be fully paid
    fn guard_sequential(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
    ) -> Result<()> {
        let variant = self.directory.rate_variant(household_id);
        let since = self
            .schedule
            .effective_since(fee_type, variant)
            .ok_or(LedgerError::NoRateDefined { fee_type, month })?;

        let mut current = since.max(Month::first_of_year(month.year()));
        while current < month {
            let entry = self.entry_or_implicit(household_id, fee_type, current)?;
            if !entry.is_settled() {
                return Err(LedgerError::EarlierMonthUnpaid { blocking_month: current });
            }
            current = current.next();
        }
        Ok(())
    }
}
