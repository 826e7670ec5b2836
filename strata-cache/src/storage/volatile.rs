use std::collections::HashMap;

use super::durable::DurableTier;
use crate::core::error::Result;

/// A [`DurableTier`] backed by a plain in-process map. Nothing survives the
/// process — "durable" in contract only.
///
/// Exists as the reference implementation of the trait and as the backend
/// for tests that should not touch the filesystem.
#[derive(Debug, Default)]
pub struct VolatileTier {
    entries: HashMap<String, Vec<u8>>,
}

impl VolatileTier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableTier for VolatileTier {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.remove(key))
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn items(&self) -> Result<Vec<(String, Vec<u8>)>> {
        Ok(self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
