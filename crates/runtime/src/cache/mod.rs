//! Position/result cache.
//!
//! Caches values computed for ordered entity pairs at specific positions,
//! bounded by entry count and an estimated byte budget.
mod clock;
mod entry;
mod key;
mod stats;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CacheOptions, Importance};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{EvictionTarget, PositionCache};
