pub mod entry;
pub mod reset;
pub mod store;

pub use entry::{LedgerEntry, PaymentRecord};
pub use reset::{HouseholdReset, LedgerResetter};
pub use store::{LedgerKey, LedgerStore, MemoryLedgerStore, SharedStore};
