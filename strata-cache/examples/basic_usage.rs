//! Minimal tour: fill past capacity, watch the hot set follow the access
//! pattern, then clean up.
//!
//! Run with: cargo run --example basic_usage

use strata_cache::{CacheConfig, TieredCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CacheConfig {
        capacity: 2,
        namespace: Some("example".to_string()),
        data_dir: std::env::temp_dir().join("strata-example"),
    };
    let cache = TieredCache::open(&config)?;

    cache.set("alpha", b"first".to_vec()).await?;
    cache.set("beta", b"second".to_vec()).await?;
    cache.set("gamma", b"third".to_vec()).await?;

    // alpha and beta filled the memory tier; gamma overflowed to disk.
    println!("resident after fill: {:?}", cache.hot_keys().await);

    // Hammer gamma until it earns a memory slot.
    for _ in 0..3 {
        cache.get("gamma").await?;
    }
    println!("resident after reads: {:?}", cache.hot_keys().await);

    for entry in cache.items() {
        let (key, value) = entry?;
        println!("{key} => {} bytes", value.len());
    }

    let stats = cache.stats().await;
    println!(
        "gets={} hits={} promotions={} demotions={}",
        stats.gets, stats.hits, stats.promotions, stats.demotions
    );

    cache.reset().await?;
    Ok(())
}
