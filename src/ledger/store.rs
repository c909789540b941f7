use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::{LedgerError, Result};
use crate::ledger::entry::LedgerEntry;
use crate::month::Month;
use crate::types::{FeeType, HouseholdId};

/// primary key of a ledger entry
pub type LedgerKey = (HouseholdId, FeeType, Month);

/// shared handle used by the engine, resetter and aggregator
pub type SharedStore = Arc<dyn LedgerStore>;

/// storage seam for ledger entries
///
/// `upsert` is the per-key linearization point: callers pass the version they
/// read and the write is rejected with `WriteConflict` when the stored entry
/// has moved on. The store does not enforce the sequential payment rule, but
/// it rejects writes whose `amount_paid` disagrees with the payment records.
pub trait LedgerStore: Send + Sync {
    fn get(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
    ) -> Result<Option<LedgerEntry>>;

    /// entries in `[from, to]`, ordered by month
    fn get_range(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        from: Month,
        to: Month,
    ) -> Result<Vec<LedgerEntry>>;

    /// compare-and-swap write; `expected_version` is 0 for a first write
    fn upsert(&self, entry: LedgerEntry, expected_version: u64) -> Result<LedgerEntry>;

    /// delete every entry for the household and fee type
    fn delete_all(&self, household_id: HouseholdId, fee_type: FeeType) -> Result<usize>;
}

/// in-memory ledger store
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entries: RwLock<BTreeMap<LedgerKey, LedgerEntry>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn get(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
    ) -> Result<Option<LedgerEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&(household_id, fee_type, month)).cloned())
    }

    fn get_range(
        &self,
        household_id: HouseholdId,
        fee_type: FeeType,
        from: Month,
        to: Month,
    ) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .range((household_id, fee_type, from)..=(household_id, fee_type, to))
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn upsert(&self, mut entry: LedgerEntry, expected_version: u64) -> Result<LedgerEntry> {
        let recorded = entry.amount_paid;
        let expected = entry.records_total();
        if recorded != expected {
            tracing::warn!(
                household = %entry.household_id,
                fee_type = %entry.fee_type,
                month = %entry.month,
                %recorded,
                %expected,
                "corrupt write rejected"
            );
            return Err(LedgerError::CorruptWriteRejected {
                household_id: entry.household_id,
                fee_type: entry.fee_type,
                month: entry.month,
                recorded,
                expected,
            });
        }

        let key = (entry.household_id, entry.fee_type, entry.month);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let found = entries.get(&key).map(|e| e.version).unwrap_or(0);
        if found != expected_version {
            return Err(LedgerError::WriteConflict {
                household_id: entry.household_id,
                fee_type: entry.fee_type,
                month: entry.month,
                expected: expected_version,
                found,
            });
        }

        entry.version = expected_version + 1;
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    fn delete_all(&self, household_id: HouseholdId, fee_type: FeeType) -> Result<usize> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let keys: Vec<LedgerKey> = entries
            .range((household_id, fee_type, Month::MIN)..=(household_id, fee_type, Month::MAX))
            .map(|(key, _)| *key)
            .collect();
        for key in &keys {
            entries.remove(key);
        }
        Ok(keys.len())
    }
}
