use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{HouseholdId, RateVariant};

/// external household directory boundary
///
/// The directory is the authority on household attributes; the ledger only
/// consults it for rate variant selection. Unknown households resolve to the
/// standard variant.
pub trait HouseholdDirectory: Send + Sync {
    /// rate variant the household is billed under
    fn rate_variant(&self, household_id: HouseholdId) -> RateVariant;
}

/// shared handle to a directory implementation
pub type SharedDirectory = Arc<dyn HouseholdDirectory>;

/// map-backed directory for tests, demos and small deployments
#[derive(Debug, Default)]
pub struct StaticDirectory {
    variants: HashMap<HouseholdId, RateVariant>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_business(mut self, household_id: HouseholdId) -> Self {
        self.variants.insert(household_id, RateVariant::Business);
        self
    }

    pub fn set(&mut self, household_id: HouseholdId, variant: RateVariant) {
        self.variants.insert(household_id, variant);
    }

    pub fn shared(self) -> SharedDirectory {
        Arc::new(self)
    }
}

impl HouseholdDirectory for StaticDirectory {
    fn rate_variant(&self, household_id: HouseholdId) -> RateVariant {
        self.variants
            .get(&household_id)
            .copied()
            .unwrap_or_default()
    }
}
