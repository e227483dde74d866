//! File-based repository implementations.

mod ledger;

pub use ledger::FileLedger;
