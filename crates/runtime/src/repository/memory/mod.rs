//! In-memory repository implementations for testing and embedding.

mod ledger;

pub use ledger::InMemoryLedger;
