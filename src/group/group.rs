use std::sync::{Arc, OnceLock};

use anyhow::Result;

use crate::cache::shared::SharedCache;
use crate::cache::view::ByteView;
use crate::singleflight::flight::FlightGroup;

use super::loader::Loader;
use super::peer::{FetchRequest, PeerFetcher, PeerPicker};
use super::registry;

/// A named cache namespace.
///
/// Groups are created once per name for the lifetime of the process and are
/// looked up by the transport server via [`registry::lookup`]. A group owns
/// its cache and its flight group; the peer picker is a shared reference
/// attached at most once after construction.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    cache: SharedCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: FlightGroup<ByteView>,
}

impl Group {
    /// Creates the group and registers it under `name`.
    ///
    /// # Panics
    /// Panics if a group with the same name already exists; creating a name
    /// twice is a programmer error.
    pub fn new(name: &str, cache_bytes: usize, loader: impl Loader) -> Arc<Self> {
        let group = Arc::new(Self {
            name: name.to_owned(),
            loader: Arc::new(loader),
            cache: SharedCache::new(cache_bytes),
            peers: OnceLock::new(),
            flight: FlightGroup::new(),
        });
        registry::register(group.clone());
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches the peer picker that routes keys to their owning peer.
    ///
    /// Without a picker the group runs standalone and every miss goes to the
    /// loader.
    ///
    /// # Panics
    /// Panics when called a second time; re-wiring the peer topology of a
    /// live group is a programmer error.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        if self.peers.set(picker).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    /// Looks up `key`, consulting the local cache, the owning peer and
    /// finally the loader.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            anyhow::bail!("key is required");
        }

        if let Some(view) = self.cache.get(key) {
            tracing::debug!("Cache hit for {}/{}", self.name, key);
            return Ok(view);
        }

        self.load(key).await
    }

    /// Number of entries currently cached by this group.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Bytes currently accounted to this group's cache.
    pub fn cached_bytes(&self) -> usize {
        self.cache.used_bytes()
    }

    /// Loads `key` from the owning peer or the loader, coalescing concurrent
    /// callers so the key is fetched once no matter how many requests race.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flight
            .execute(key, || async {
                if let Some(picker) = self.peers.get() {
                    if let Some(peer) = picker.pick_peer(key) {
                        match self.fetch_from_peer(peer.as_ref(), key).await {
                            Ok(view) => return Ok(view),
                            Err(error) => {
                                tracing::warn!(
                                    "Failed to fetch {}/{} from peer, falling back to loader: {:#}",
                                    self.name,
                                    key,
                                    error
                                );
                            }
                        }
                    }
                }

                self.load_locally(key).await
            })
            .await
    }

    /// Invokes the user loader and caches the result locally.
    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await?;
        let view = ByteView::from(bytes);
        self.cache.add(key, view.clone());
        Ok(view)
    }

    /// Fetches `key` from the remote owner. The value is returned without
    /// populating the local cache; the owner already holds the canonical
    /// copy, and keeping a single cached copy per key is deliberate.
    async fn fetch_from_peer(&self, peer: &dyn PeerFetcher, key: &str) -> Result<ByteView> {
        let request = FetchRequest {
            group: self.name.clone(),
            key: key.to_owned(),
        };
        let response = peer.fetch(&request).await?;
        Ok(ByteView::from(response.value))
    }
}
