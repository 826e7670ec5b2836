use std::collections::HashMap;

/// Per-key access counter with a first-access sequence number.
#[derive(Debug, Clone)]
struct Counter {
    hits: u64,
    first_access: u64,
}

/// Tracks how often each key is accessed and answers "top N keys by count".
///
/// Counts never decrease and are never aged or decayed; a key accessed
/// heavily long ago keeps its rank until it is deleted or the cache is
/// reset. Scalability caveat, not a bug.
#[derive(Debug, Default)]
pub struct FrequencyTracker {
    counts: HashMap<String, Counter>,
    clock: u64,
}

impl FrequencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the access count for `key`, creating the counter on first
    /// access. The creation order is remembered for tie-breaking.
    pub fn increment(&mut self, key: &str) {
        if let Some(counter) = self.counts.get_mut(key) {
            counter.hits += 1;
            return;
        }

        let first_access = self.clock;
        self.clock += 1;
        self.counts.insert(
            key.to_string(),
            Counter {
                hits: 1,
                first_access,
            },
        );
    }

    /// The `n` keys with the highest access counts.
    ///
    /// Ties are broken by first-access order: the key that was incremented
    /// first wins. This is deliberate — under uniform access patterns it
    /// determines exactly which keys stay resident, so it has to be
    /// deterministic rather than whatever the map iteration order yields.
    /// Returns all keys when fewer than `n` exist.
    pub fn top_n(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<(&String, &Counter)> = self.counts.iter().collect();
        ranked.sort_unstable_by(|(_, a), (_, b)| {
            b.hits.cmp(&a.hits).then(a.first_access.cmp(&b.first_access))
        });

        ranked
            .into_iter()
            .take(n)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Current count for `key`, if tracked. Mostly useful for tests and
    /// stats inspection.
    pub fn count(&self, key: &str) -> Option<u64> {
        self.counts.get(key).map(|c| c.hits)
    }

    /// Drop the counter for `key`. No-op when absent.
    pub fn remove(&mut self, key: &str) {
        self.counts.remove(key);
    }

    /// Drop every counter and restart the first-access clock.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.clock = 0;
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_count() {
        let mut tracker = FrequencyTracker::new();

        tracker.increment("a");
        tracker.increment("a");
        tracker.increment("b");

        assert_eq!(tracker.count("a"), Some(2));
        assert_eq!(tracker.count("b"), Some(1));
        assert_eq!(tracker.count("c"), None);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_top_n_ranks_by_count() {
        let mut tracker = FrequencyTracker::new();

        tracker.increment("cold");
        for _ in 0..3 {
            tracker.increment("warm");
        }
        for _ in 0..5 {
            tracker.increment("hot");
        }

        assert_eq!(tracker.top_n(2), vec!["hot".to_string(), "warm".to_string()]);
    }

    #[test]
    fn test_top_n_ties_break_by_first_access() {
        let mut tracker = FrequencyTracker::new();

        tracker.increment("a");
        tracker.increment("b");
        tracker.increment("c");

        // All counts equal: the two earliest-seen keys win.
        assert_eq!(tracker.top_n(2), vec!["a".to_string(), "b".to_string()]);

        // Raising c's count moves it ahead of the tied pair.
        tracker.increment("c");
        assert_eq!(tracker.top_n(2), vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_top_n_with_fewer_keys_than_n() {
        let mut tracker = FrequencyTracker::new();

        tracker.increment("only");
        assert_eq!(tracker.top_n(10), vec!["only".to_string()]);
        assert!(FrequencyTracker::new().top_n(10).is_empty());
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let mut tracker = FrequencyTracker::new();

        tracker.increment("a");
        tracker.remove("a");
        tracker.remove("a");
        tracker.remove("never-seen");

        assert!(tracker.is_empty());
    }

    #[test]
    fn test_clear_resets_first_access_order() {
        let mut tracker = FrequencyTracker::new();

        tracker.increment("a");
        tracker.increment("b");
        tracker.clear();

        tracker.increment("b");
        tracker.increment("a");

        // After clear, b was seen first and wins the tie.
        assert_eq!(tracker.top_n(1), vec!["b".to_string()]);
    }
}
