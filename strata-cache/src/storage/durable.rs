use crate::core::error::Result;

/// Contract for the slow tier: a persistent key-value store that absorbs
/// every key the memory tier has no room for.
///
/// Operations are synchronous, blocking calls — implementations may hit the
/// filesystem or a database, and the cache treats any of them as fallible.
/// A failure surfaces to the cache caller unchanged; the core performs no
/// retries (retry/backoff belongs to the implementation or its caller).
///
/// How bytes are persisted, how keys are indexed, and whether state survives
/// restarts are entirely the implementation's business. So is collision
/// avoidance between instances sharing one backend (see
/// [`DiskTier::open`](crate::storage::DiskTier::open) for the namespace
/// convention the bundled implementation uses).
pub trait DurableTier: Send {
    /// Point lookup. Ok(None) when the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite.
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove `key`, returning its value so the caller can move it to the
    /// other tier. Ok(None) when absent — absence is not an error here.
    fn remove(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Membership test.
    fn contains(&self, key: &str) -> Result<bool>;

    /// Every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    /// Every (key, value) pair currently stored. The default implementation
    /// walks `keys` and re-reads each one, skipping keys that vanish
    /// between the two calls.
    fn items(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut items = Vec::new();
        for key in self.keys()? {
            if let Some(value) = self.get(&key)? {
                items.push((key, value));
            }
        }
        Ok(items)
    }

    /// Number of stored keys.
    fn len(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Release all persisted state for this instance. After this the store
    /// is empty and reusable, as if freshly opened.
    fn clear(&mut self) -> Result<()>;
}
