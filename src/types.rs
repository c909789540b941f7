use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a household
pub type HouseholdId = Uuid;

/// recurring fee types billed per household per month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeeType {
    Streetlight,
    Garbage,
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeType::Streetlight => write!(f, "streetlight"),
            FeeType::Garbage => write!(f, "garbage"),
        }
    }
}

/// rate variant axis; `Standard` is the base every variant falls back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum RateVariant {
    #[default]
    Standard,
    /// household operates a business at the address
    Business,
}

/// how a payment was tendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Check,
    OnlineTransfer,
}

/// per-month settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// no payment recorded
    Unpaid,
    /// some payment recorded, balance remains
    Partial,
    /// balance cleared
    Paid,
}

impl EntryStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, EntryStatus::Paid)
    }
}
