// ── Generic reactive collection ──
//
// Lock-free concurrent storage with push-based change notification
// via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection for a single entity type, keyed by
/// store key.
///
/// Uses `DashMap` for O(1) concurrent lookups and `watch` channels for
/// change notification. Every mutation bumps a version counter and
/// rebuilds the snapshot that subscribers receive. Snapshots are sorted
/// by key so consumers see a deterministic order.
pub(crate) struct Collection<T: Clone + Send + Sync + 'static> {
    entries: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> Collection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entries: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace an entry. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, entity: T) -> bool {
        let is_new = self.entries.insert(key, Arc::new(entity)).is_none();
        self.rebuild_snapshot();
        self.bump_version();
        is_new
    }

    /// Update an entry in place, creating it with `init` first if absent.
    ///
    /// The whole read-modify-write happens under the entry lock, so two
    /// merges against the same key cannot lose each other's changes
    /// regardless of arrival order.
    pub(crate) fn merge(
        &self,
        key: &str,
        init: impl FnOnce() -> T,
        apply: impl FnOnce(&mut T),
    ) {
        let mut entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(init()));
        let mut value = (**entry).clone();
        apply(&mut value);
        *entry = Arc::new(value);
        drop(entry);

        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Remove an entry. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.entries.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    /// Remove all entries.
    pub(crate) fn clear(&self) {
        self.entries.clear();
        self.rebuild_snapshot();
        self.bump_version();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values, sorted by key, and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut pairs: Vec<(String, Arc<T>)> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let values: Vec<Arc<T>> = pairs.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: Collection<String> = Collection::new();
        assert!(col.upsert("key1".into(), "hello".into()));
    }

    #[test]
    fn upsert_returns_false_for_existing_key() {
        let col: Collection<String> = Collection::new();
        col.upsert("key1".into(), "hello".into());
        assert!(!col.upsert("key1".into(), "world".into()));
    }

    #[test]
    fn merge_creates_then_updates() {
        let col: Collection<Vec<u32>> = Collection::new();
        col.merge("k", Vec::new, |v| v.push(1));
        col.merge("k", Vec::new, |v| v.push(2));
        assert_eq!(*col.get("k").unwrap(), vec![1, 2]);
    }

    #[test]
    fn remove_returns_entity() {
        let col: Collection<String> = Collection::new();
        col.upsert("key1".into(), "hello".into());
        assert_eq!(*col.remove("key1").unwrap(), "hello");
        assert!(col.get("key1").is_none());
        assert_eq!(col.len(), 0);
    }

    #[test]
    fn snapshot_is_sorted_by_key() {
        let col: Collection<String> = Collection::new();
        col.upsert("b".into(), "2".into());
        col.upsert("a".into(), "1".into());
        col.upsert("c".into(), "3".into());

        let snap = col.snapshot();
        let values: Vec<&str> = snap.iter().map(|v| v.as_str()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn clear_empties_everything() {
        let col: Collection<String> = Collection::new();
        col.upsert("a".into(), "x".into());
        col.upsert("b".into(), "y".into());
        col.clear();
        assert_eq!(col.len(), 0);
        assert!(col.snapshot().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let col: Collection<String> = Collection::new();
        let mut rx = col.subscribe();
        col.upsert("a".into(), "x".into());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
