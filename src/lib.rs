pub mod decimal;
pub mod directory;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod month;
pub mod payments;
pub mod schedule;
pub mod stats;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use directory::{HouseholdDirectory, SharedDirectory, StaticDirectory};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{
    HouseholdReset, LedgerEntry, LedgerKey, LedgerResetter, LedgerStore, MemoryLedgerStore,
    PaymentRecord, SharedStore,
};
pub use month::{Month, MonthParseError};
pub use payments::{
    BatchFailure, BatchPaymentCoordinator, BatchReport, FeeTypeBatch, FeeTypeOutcome,
    MonthStanding, PaymentEngine, PaymentRequest, SequentialPaymentValidator,
};
pub use schedule::{FeeRate, FeeScheduleRegistry};
pub use stats::{FeeSummary, MonthStatusRow, Period, StatisticsAggregator};
pub use types::{EntryStatus, FeeType, HouseholdId, PaymentMethod, RateVariant};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
