use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::month::Month;
use crate::types::{EntryStatus, FeeType, HouseholdId, PaymentMethod};

/// one recorded payment against a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub paid_by: Option<String>,
}

/// per-household, per-fee-type, per-month ledger record
///
/// Entries are born implicit (version 0, no records) and become persisted on
/// first payment. `payment_records` is append-only; `amount_paid` and
/// `status` are recomputed from it on every append. `version` increments on
/// every store write and drives optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub household_id: HouseholdId,
    pub fee_type: FeeType,
    pub month: Month,
    pub total_charge: Money,
    pub amount_paid: Money,
    pub status: EntryStatus,
    pub payment_records: Vec<PaymentRecord>,
    pub version: u64,
}

impl LedgerEntry {
    /// the logical default state of a month with no stored record
    pub fn implicit_unpaid(
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
        total_charge: Money,
    ) -> Self {
        let mut entry = Self {
            household_id,
            fee_type,
            month,
            total_charge,
            amount_paid: Money::ZERO,
            status: EntryStatus::Unpaid,
            payment_records: Vec::new(),
            version: 0,
        };
        entry.recompute();
        entry
    }

    /// outstanding balance, never negative
    pub fn balance(&self) -> Money {
        (self.total_charge - self.amount_paid).max(Money::ZERO)
    }

    /// sum of all recorded payments
    pub fn records_total(&self) -> Money {
        self.payment_records.iter().map(|r| r.amount).sum()
    }

    /// append a payment record and recompute paid amount and status
    pub fn push_record(&mut self, record: PaymentRecord) {
        self.payment_records.push(record);
        self.recompute();
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_paid()
    }

    fn recompute(&mut self) {
        self.amount_paid = self.records_total();
        self.status = if self.amount_paid.is_zero() && self.total_charge.is_positive() {
            EntryStatus::Unpaid
        } else if self.amount_paid >= self.total_charge {
            EntryStatus::Paid
        } else {
            EntryStatus::Partial
        };
    }
}
