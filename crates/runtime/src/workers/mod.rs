//! Background tasks that back the engine.
//!
//! The cache sweeper periodically drops expired geometry so idle scenes do
//! not hold stale entries until the next lookup.

mod sweeper;

pub use sweeper::{CacheSweeper, SweeperHandle};
