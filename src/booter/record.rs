use dashmap::DashSet;

/// Dedup keys of every initializer that has run.
///
/// Append-only. `mark` is an atomic test-and-insert, so concurrent
/// resolutions cannot both claim the same key.
#[derive(Debug, Default)]
pub struct InitializationRecord {
    keys: DashSet<String>,
}

impl InitializationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `false` if it was already recorded.
    pub fn mark(&self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sorted snapshot of the recorded keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.iter().map(|key| key.key().clone()).collect();
        keys.sort_unstable();
        keys
    }
}
