//! Repository layer for data that changes during play.
//!
//! The ledger records, per chat message and action, what each applied change
//! overwrote so that a later revert can restore it exactly. Static scene
//! data is read through collaborators, not repositories.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileLedger;
pub use memory::InMemoryLedger;
pub use traits::{LedgerKey, LedgerRepository};
