use thiserror::Error;

use crate::decimal::Money;
use crate::month::Month;
use crate::types::{FeeType, HouseholdId, RateVariant};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("no rate defined for {fee_type} at {month}")]
    NoRateDefined {
        fee_type: FeeType,
        month: Month,
    },

    #[error("rate already defined for {fee_type} ({variant:?}) effective {effective_month}")]
    DuplicateEffectiveMonth {
        fee_type: FeeType,
        variant: RateVariant,
        effective_month: Month,
    },

    #[error("earlier month unpaid: pay {blocking_month} first")]
    EarlierMonthUnpaid {
        blocking_month: Month,
    },

    #[error("must deselect latest month first: {latest_month}")]
    MustDeselectLatestFirst {
        latest_month: Month,
    },

    #[error("month is not selected: {month}")]
    MonthNotSelected {
        month: Month,
    },

    #[error("sequential violation at {first_violating_month}")]
    SequentialViolation {
        first_violating_month: Month,
    },

    #[error("payment amount not positive: {amount}")]
    AmountNotPositive {
        amount: Money,
    },

    #[error("overpayment not allowed for {month}: charge {charge}, paid {already_paid}, attempted {attempted}")]
    OverpaymentNotAllowed {
        month: Month,
        charge: Money,
        already_paid: Money,
        attempted: Money,
    },

    #[error("corrupt write rejected for {household_id}/{fee_type}/{month}: amount_paid {recorded}, records sum {expected}")]
    CorruptWriteRejected {
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
        recorded: Money,
        expected: Money,
    },

    #[error("write conflict on {household_id}/{fee_type}/{month}: expected version {expected}, found {found}")]
    WriteConflict {
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
        expected: u64,
        found: u64,
    },

    #[error("invalid batch: {message}")]
    InvalidBatch {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
