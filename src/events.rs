use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::month::Month;
use crate::types::{EntryStatus, FeeType, HouseholdId, PaymentMethod, RateVariant};

/// all events emitted by ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // payment events
    PaymentRecorded {
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
        amount: Money,
        method: PaymentMethod,
        new_status: EntryStatus,
        timestamp: DateTime<Utc>,
    },
    MonthSettled {
        household_id: HouseholdId,
        fee_type: FeeType,
        month: Month,
        total_charge: Money,
        timestamp: DateTime<Utc>,
    },

    // batch events
    BatchApplied {
        household_id: HouseholdId,
        fee_type: FeeType,
        months: Vec<Month>,
        total: Money,
        timestamp: DateTime<Utc>,
    },
    BatchHalted {
        household_id: HouseholdId,
        fee_type: FeeType,
        failed_month: Month,
        applied_count: usize,
        timestamp: DateTime<Utc>,
    },

    // administrative events
    LedgerReset {
        household_id: HouseholdId,
        fee_type: FeeType,
        deleted_entries: usize,
        timestamp: DateTime<Utc>,
    },
    RateAppended {
        fee_type: FeeType,
        variant: RateVariant,
        value: Money,
        effective_month: Month,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
