use std::sync::Mutex;

use super::lru::LruStore;
use super::view::ByteView;

/// A concurrency-safe wrapper around an [`LruStore`] of byte views.
///
/// All access is serialized through one mutex, which is only ever held over
/// in-memory map operations. The store itself is built lazily on the first
/// `add`: a group that never caches anything never allocates storage, and a
/// `get` before the first `add` is simply a miss.
pub struct SharedCache {
    capacity_bytes: usize,
    inner: Mutex<Option<LruStore<ByteView>>>,
}

impl SharedCache {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            inner: Mutex::new(None),
        }
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner
            .get_or_insert_with(|| LruStore::new(self.capacity_bytes, None))
            .add(key.to_owned(), value);
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.as_mut().and_then(|lru| lru.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner.as_ref().map(|lru| lru.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn used_bytes(&self) -> usize {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner.as_ref().map(|lru| lru.used_bytes()).unwrap_or(0)
    }
}
