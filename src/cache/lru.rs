use linked_hash_map::LinkedHashMap;

use super::view::ByteView;

/// Cost of a value in bytes, used for capacity accounting.
pub trait ByteWeight {
    fn weight(&self) -> usize;
}

impl ByteWeight for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl ByteWeight for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl ByteWeight for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

/// Invoked with the owned key and value of every entry that falls off the
/// LRU end. Purely a notification; its effects are not observable by callers.
pub type EvictionCallback<V> = Box<dyn FnMut(String, V) + Send>;

/// A size-constrained LRU store.
///
/// Entries are kept in access order: both [`LruStore::add`] and a successful
/// [`LruStore::get`] refresh an entry to the most-recently-used position. The
/// cost of an entry is `key.len() + value.weight()`. After every insert,
/// least-recently-used entries are dropped until the total cost fits the
/// configured capacity. A capacity of zero disables the bound entirely.
pub struct LruStore<V: ByteWeight> {
    capacity_bytes: usize,
    used_bytes: usize,
    map: LinkedHashMap<String, V>,
    on_evict: Option<EvictionCallback<V>>,
}

impl<V: ByteWeight> LruStore<V> {
    /// Creates a store bounded to `capacity_bytes` (0 = unbounded) with an
    /// optional eviction callback.
    pub fn new(capacity_bytes: usize, on_evict: Option<EvictionCallback<V>>) -> Self {
        Self {
            capacity_bytes,
            used_bytes: 0,
            map: LinkedHashMap::new(),
            on_evict,
        }
    }

    /// Inserts or replaces the value for `key` and refreshes it to the
    /// most-recently-used position, then evicts until the capacity holds.
    ///
    /// Replacing an existing entry first releases the old entry's cost, so
    /// repeated updates never drift the byte accounting.
    pub fn add(&mut self, key: String, value: V) {
        let added = key.len() + value.weight();
        if let Some(old) = self.map.insert(key.clone(), value) {
            self.used_bytes -= key.len() + old.weight();
        }
        self.used_bytes += added;
        self.evict_to_capacity();
    }

    /// Looks up `key`, refreshing it to the most-recently-used position on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.map.get_refresh(key).map(|value| &*value)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total cost of all entries in bytes.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    fn evict_to_capacity(&mut self) {
        if self.capacity_bytes == 0 {
            return;
        }
        while self.used_bytes > self.capacity_bytes {
            let Some((key, value)) = self.map.pop_front() else {
                break;
            };
            self.used_bytes -= key.len() + value.weight();
            if let Some(on_evict) = self.on_evict.as_mut() {
                on_evict(key, value);
            }
        }
    }
}
