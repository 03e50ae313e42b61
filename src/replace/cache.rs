//! Build-session memo tables.
//!
//! One [`AssetCache`] lives for one build. It maps source identities to the
//! artifacts already emitted for them, so a stylesheet referenced from ten
//! HTML files is minified, hashed and written once.
//!
//! Each key owns a mutex slot. The check-compute-store sequence for a key
//! runs under that slot's lock, which keeps the at-most-once write guarantee
//! when HTML files are resolved in parallel. Different keys never contend.

use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::{Artifact, ResourceRef};

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Result of a memo lookup.
#[derive(Debug)]
pub struct Lookup<V> {
    pub value: Arc<V>,
    /// `true` when this call computed the value.
    pub fresh: bool,
}

/// Concurrent memo table with per-key initialization.
#[derive(Debug)]
pub struct Memo<K: Eq + Hash, V> {
    slots: DashMap<K, Slot<V>>,
}

impl<K: Eq + Hash, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Memo<K, V> {
    /// Get an initialized value.
    #[cfg(test)]
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.slots.get(key)?.value().clone();
        let guard = slot.lock();
        guard.clone()
    }

    /// Get the value for `key`, computing it with `init` on first use.
    ///
    /// A failed `init` leaves the slot empty; the next caller retries.
    pub fn get_or_try_insert<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<Lookup<V>, E> {
        // Clone the slot out so the shard lock is not held while computing
        let slot = self.slots.entry(key).or_default().value().clone();
        let mut guard = slot.lock();

        if let Some(value) = guard.as_ref() {
            return Ok(Lookup {
                value: Arc::clone(value),
                fresh: false,
            });
        }

        let value = Arc::new(init()?);
        *guard = Some(Arc::clone(&value));
        Ok(Lookup { value, fresh: true })
    }

    /// Number of initialized entries.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().lock().is_some())
            .count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All memo tables of one build session.
#[derive(Debug, Default)]
pub struct AssetCache {
    /// Single stylesheet, keyed by its absolute source path.
    pub styles: Memo<PathBuf, Artifact>,
    /// Merged stylesheet bundle, keyed by the ordered source list.
    pub bundles: Memo<Vec<PathBuf>, Artifact>,
    /// Copied resource (image, font, favicon), keyed by its source path.
    pub resources: Memo<PathBuf, ResourceRef>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of files emitted through this cache.
    pub fn emitted(&self) -> usize {
        self.styles.len() + self.bundles.len() + self.resources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_memo_initializes_once() {
        let memo: Memo<String, usize> = Memo::default();
        let calls = AtomicUsize::new(0);

        let first = memo
            .get_or_try_insert::<()>("a".into(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .unwrap();
        let second = memo
            .get_or_try_insert::<()>("a".into(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .unwrap();

        assert!(first.fresh);
        assert!(!second.fresh);
        assert_eq!(*second.value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.get("a").as_deref(), Some(&1));
    }

    #[test]
    fn test_memo_failed_init_retries() {
        let memo: Memo<String, usize> = Memo::default();
        assert!(memo.get_or_try_insert("a".into(), || Err("boom")).is_err());
        assert!(memo.get("a").is_none());
        assert!(memo.is_empty());

        let lookup = memo.get_or_try_insert::<&str>("a".into(), || Ok(7)).unwrap();
        assert!(lookup.fresh);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_memo_parallel_single_init() {
        let memo: Arc<Memo<PathBuf, usize>> = Arc::new(Memo::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    memo.get_or_try_insert::<()>(PathBuf::from("/a.css"), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(5));
                        Ok(42)
                    })
                    .map(|l| *l.value)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bundle_keys_are_order_sensitive() {
        let memo: Memo<Vec<PathBuf>, &str> = Memo::default();
        let ab = vec![PathBuf::from("/a.css"), PathBuf::from("/b.css")];
        let ba = vec![PathBuf::from("/b.css"), PathBuf::from("/a.css")];

        memo.get_or_try_insert::<()>(ab.clone(), || Ok("ab")).unwrap();
        let lookup = memo.get_or_try_insert::<()>(ba, || Ok("ba")).unwrap();

        assert!(lookup.fresh);
        assert_eq!(memo.len(), 2);
        assert_eq!(memo.get(&ab).as_deref(), Some(&"ab"));
    }
}
