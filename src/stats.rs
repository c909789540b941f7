use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::directory::SharedDirectory;
use crate::errors::{LedgerError, Result};
use crate::ledger::store::SharedStore;
use crate::month::Month;
use crate::schedule::FeeScheduleRegistry;
use crate::types::{EntryStatus, FeeType, HouseholdId};

/// reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Year(i32),
    Month(Month),
}

impl Period {
    fn months(&self) -> Vec<Month> {
        match *self {
            Period::Year(year) => Month::months_of_year(year),
            Period::Month(month) => vec![month],
        }
    }
}

/// collection roll-up for one fee type and period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub expected: Money,
    pub collected: Money,
    pub outstanding: Money,
    pub collection_rate: Rate,
}

/// one row of the yearly status grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStatusRow {
    pub month: Month,
    pub charge: Money,
    pub amount_paid: Money,
    pub balance: Money,
    pub status: EntryStatus,
}

/// read-only roll-ups over the ledger store and fee schedule
pub struct StatisticsAggregator {
    store: SharedStore,
    schedule: Arc<FeeScheduleRegistry>,
    directory: SharedDirectory,
}

impl StatisticsAggregator {
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

    /// expected vs. collected totals across the given household roster
    ///
    /// Months with no applicable rate contribute nothing to `expected`; the
    /// collection rate is zero when nothing was expected.
    pub fn summarize(
        &self,
        fee_type: FeeType,
        period: Period,
        households: &[HouseholdId],
    ) -> Result<FeeSummary> {
        let months = period.months();
        let (from, to) = match (months.first(), months.last()) {
            (Some(&from), Some(&to)) => (from, to),
            _ => (Month::MIN, Month::MAX),
        };

        let mut expected = Money::ZERO;
        let mut collected = Money::ZERO;

        for &household_id in households {
            let variant = self.directory.rate_variant(household_id);
            for &month in &months {
                match self.schedule.resolve_charge(fee_type, month, variant) {
                    Ok(charge) => expected += charge,
                    Err(LedgerError::NoRateDefined { .. }) => continue,
                    Err(e) => return Err(e),
                }
            }
            for entry in self.store.get_range(household_id, fee_type, from, to)? {
                collected += entry.amount_paid;
            }
        }

        Ok(FeeSummary {
            expected,
            collected,
            outstanding: (expected - collected).max(Money::ZERO),
            collection_rate: Rate::ratio(collected, expected),
        })
    }

    /// yearly status grid for one household, for tabular display and export
    pub fn year_grid(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        year: i32,
    ) -> Result<Vec<MonthStatusRow>> {
        let variant = self.directory.rate_variant(household_id);
        let mut rows = Vec::new();

        for month in Month::months_of_year(year) {
            let charge = match self.schedule.resolve_charge(fee_type, month, variant) {
                Ok(charge) => charge,
                Err(LedgerError::NoRateDefined { .. }) => continue,
                Err(e) => return Err(e),
            };
            let (amount_paid, balance, status) =
                match self.store.get(household_id, fee_type, month)? {
                    Some(entry) => (entry.amount_paid, entry.balance(), entry.status),
                    None => (Money::ZERO, charge, EntryStatus::Unpaid),
                };
            rows.push(MonthStatusRow {
                month,
                charge,
                amount_paid,
                balance,
                status,
            });
        }
        Ok(rows)
    }
}
