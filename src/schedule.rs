use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::month::Month;
use crate::types::{FeeType, RateVariant};

/// effective-dated fee rate record
///
/// Multiple records per `(fee_type, variant)` form a history; the rate in
/// effect for a month is the one with the greatest `effective_month` not
/// after it. Records are append-only and never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRate {
    pub fee_type: FeeType,
    pub variant: RateVariant,
    pub value: Money,
    pub effective_month: Month,
}

/// resolves the charge for a fee type, month and rate variant
///
/// Variant-specific lookups fall back to the `Standard` rate when the
/// variant has no applicable record of its own.
#[derive(Debug, Default)]
pub struct FeeScheduleRegistry {
    // sorted by effective_month, unique per key
    rates: RwLock<HashMap<(FeeType, RateVariant), Vec<FeeRate>>>,
}

impl FeeScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// append a rate record; effective months must be unique per
    /// `(fee_type, variant)`
    pub fn append_rate(&self, rate: FeeRate, events: &mut EventStore) -> Result<()> {
        let mut rates = self.rates.write().unwrap_or_else(PoisonError::into_inner);
        let history = rates
            .entry((rate.fee_type, rate.variant))
            .or_default();

        match history.binary_search_by_key(&rate.effective_month, |r| r.effective_month) {
            Ok(_) => Err(LedgerError::DuplicateEffectiveMonth {
                fee_type: rate.fee_type,
                variant: rate.variant,
                effective_month: rate.effective_month,
            }),
            Err(position) => {
                events.emit(Event::RateAppended {
                    fee_type: rate.fee_type,
                    variant: rate.variant,
                    value: rate.value,
                    effective_month: rate.effective_month,
                });
                history.insert(position, rate);
                Ok(())
            }
        }
    }

    /// charge in effect for the month, falling back from the variant chain
    /// to the standard chain
    pub fn resolve_charge(
        &self,
        fee_type: FeeType,
        month: Month,
        variant: RateVariant,
    ) -> Result<Money> {
        let rates = self.rates.read().unwrap_or_else(PoisonError::into_inner);

        Self::latest_at(&rates, fee_type, variant, month)
            .or_else(|| {
                if variant != RateVariant::Standard {
                    Self::latest_at(&rates, fee_type, RateVariant::Standard, month)
                } else {
                    None
                }
            })
            .ok_or(LedgerError::NoRateDefined { fee_type, month })
    }

    /// earliest month from which a charge resolves for the variant, if any
    pub fn effective_since(&self, fee_type: FeeType, variant: RateVariant) -> Option<Month> {
        let rates = self.rates.read().unwrap_or_else(PoisonError::into_inner);

        let own = Self::first_effective(&rates, fee_type, variant);
        let base = if variant != RateVariant::Standard {
            Self::first_effective(&rates, fee_type, RateVariant::Standard)
        } else {
            None
        };
        own.into_iter().chain(base).min()
    }

    fn latest_at(
        rates: &HashMap<(FeeType, RateVariant), Vec<FeeRate>>,
        fee_type: FeeType,
        variant: RateVariant,
        month: Month,
    ) -> Option<Money> {
        rates.get(&(fee_type, variant)).and_then(|history| {
            history
                .iter()
                .rev()
                .find(|r| r.effective_month <= month)
                .map(|r| r.value)
        })
    }

    fn first_effective(
        rates: &HashMap<(FeeType, RateVariant), Vec<FeeRate>>,
        fee_type: FeeType,
        variant: RateVariant,
    ) -> Option<Month> {
        rates
            .get(&(fee_type, variant))
            .and_then(|history| history.first())
            .map(|r| r.effective_month)
    }
}
