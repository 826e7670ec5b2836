use radix_trie::{Trie, TrieCommon};

/// The fast tier: an in-process key-value map using a radix trie for
/// memory-efficient storage of string keys.
///
/// This is a plain map with no capacity logic of its own — the bound on
/// resident keys is enforced by the cache orchestrator, which decides what
/// gets to live here.
pub struct MemoryTier {
    entries: Trie<String, Vec<u8>>,
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTier {
    pub fn new() -> Self {
        Self {
            entries: Trie::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Vec<u8>> {
        self.entries.get(key)
    }

    /// Insert or overwrite. Returns the displaced value, if any.
    pub fn insert(&mut self, key: String, value: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(key, value)
    }

    /// Remove `key`, returning its value. None when absent.
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().map(|k| k.to_string()).collect()
    }

    pub fn items(&self) -> Vec<(String, Vec<u8>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries = Trie::new();
    }
}
