pub mod cache;
pub mod error;
pub mod frequency;
pub mod memory;

pub use cache::{CacheStats, Items, Keys, TieredCache};
pub use error::{CacheError, Result};
pub use frequency::FrequencyTracker;
pub use memory::MemoryTier;
