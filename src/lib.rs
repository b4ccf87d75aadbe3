pub mod attempt;
pub mod coordinator;
pub mod digest;
pub mod entry;
pub mod export;
pub mod hashtype;
pub mod ingest;
pub mod io;
pub mod ledger;
pub mod rank;
pub mod report;
pub mod store;

pub mod prelude {
    pub use crate::attempt::{AttemptOutcome, Attempter};
    pub use crate::coordinator::{AttemptCoordinator, CancelFlag, Resolution};
    pub use crate::entry::Entry;
    pub use crate::hashtype::HashType;
    pub use crate::ledger::StatsLedger;
    pub use crate::store::EntryStore;
}
