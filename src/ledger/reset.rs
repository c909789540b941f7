use hourglass_rs::SafeTimeProvider;

use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::store::SharedStore;
use crate::types::{FeeType, HouseholdId};

/// bulk-deletes payment history, returning months to the implicit-unpaid
/// state; intended for administrative correction only
pub struct LedgerResetter {
    store: SharedStore,
}

/// per-household outcome of a bulk reset
#[derive(Debug)]
pub struct HouseholdReset {
    pub household_id: HouseholdId,
    pub result: Result<usize>,
}

impl LedgerResetter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// delete every persisted entry for the household and fee type
    pub fn reset_household(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<usize> {
        let deleted = self.store.delete_all(household_id, fee_type)?;

        tracing::info!(
            household = %household_id,
            fee_type = %fee_type,
            deleted,
            "ledger reset"
        );
        events.emit(Event::LedgerReset {
            household_id,
            fee_type,
            deleted_entries: deleted,
            timestamp: time_provider.now(),
        });
        Ok(deleted)
    }

    /// reset each household independently; one failure never aborts the rest
    pub fn reset_households(
        &self,
        household_ids: &[HouseholdId],
        fee_type: FeeType,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Vec<HouseholdReset> {
        household_ids
            .iter()
            .map(|&household_id| HouseholdReset {
                household_id,
                result: self.reset_household(household_id, fee_type, time_provider, events),
            })
            .collect()
    }
}

impl HouseholdReset {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&LedgerError> {
        self.result.as_ref().err()
    }
}
