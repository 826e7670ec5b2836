//! Durable-tier implementations
//!
//! The cache core only depends on the [`DurableTier`] trait; anything that
//! can persist bytes behind that contract can back the slow tier.

pub mod disk;
pub mod durable;
pub mod volatile;

pub use disk::DiskTier;
pub use durable::DurableTier;
pub use volatile::VolatileTier;
