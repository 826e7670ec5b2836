pub mod config;
pub mod core;
pub mod storage;

// Re-export commonly used types
pub use config::CacheConfig;
pub use core::{
    CacheError, CacheStats, FrequencyTracker, Items, Keys, MemoryTier, Result, TieredCache,
};
pub use storage::{DiskTier, DurableTier, VolatileTier};
