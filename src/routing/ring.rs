use std::collections::BTreeMap;
use std::sync::Arc;

/// Number of virtual slots each peer occupies on the ring by default.
pub const DEFAULT_REPLICAS: usize = 50;

/// Pluggable 32-bit hash. Must be deterministic across processes, otherwise
/// peers disagree on key ownership.
pub type RingHash = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Returns the default ring hash (CRC32/IEEE).
pub fn default_hash() -> RingHash {
    Arc::new(crc32fast::hash)
}

/// A consistent-hash ring mapping keys to peer identifiers.
///
/// For every registered peer `p` and slot index `i` in `0..replicas`, the ring
/// holds a slot at `hash("{i}{p}")`. A key is owned by the peer of the smallest
/// slot greater than or equal to `hash(key)`, wrapping around to the first
/// slot when the key hashes past the last one.
pub struct Ring {
    replicas: usize,
    hash: RingHash,
    slots: BTreeMap<u32, String>,
}

impl Ring {
    pub fn new() -> Self {
        Self::with_hash(DEFAULT_REPLICAS, default_hash())
    }

    pub fn with_hash(replicas: usize, hash: RingHash) -> Self {
        Self {
            replicas: replicas.max(1),
            hash,
            slots: BTreeMap::new(),
        }
    }

    /// Registers peers on the ring, adding `replicas` slots per peer.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for peer in peers {
            let peer: String = peer.into();
            for i in 0..self.replicas {
                let slot = (self.hash)(format!("{i}{peer}").as_bytes());
                self.slots.insert(slot, peer.clone());
            }
        }
    }

    /// Returns the peer owning `key`, or `None` if no peers are registered.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.slots.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        self.slots
            .range(hash..)
            .next()
            .or_else(|| self.slots.iter().next())
            .map(|(_, peer)| peer.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots (virtual nodes) currently on the ring.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new()
    }
}
