pub mod coordinator;
pub mod engine;
pub mod validator;

#[cfg(test)]
mod proptests;

use crate::decimal::Money;
use crate::month::Month;
use crate::types::{FeeType, HouseholdId, PaymentMethod};

pub use coordinator::{
    BatchFailure, BatchPaymentCoordinator, BatchReport, FeeTypeBatch, FeeTypeOutcome,
};
pub use engine::PaymentEngine;
pub use validator::{MonthStanding, SequentialPaymentValidator};

/// single-month payment request
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub household_id: HouseholdId,
    pub fee_type: FeeType,
    pub month: Month,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    /// opaque identity supplied by the session layer
    pub payer_identity: Option<String>,
}

impl PaymentRequest {
    pub fn cash(
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
        amount: Money,
    ) -> Self {
        Self {
            household_id,
            fee_type,
            month,
            amount,
            method: PaymentMethod::Cash,
            reference: None,
            payer_identity: None,
        }
    }
}
