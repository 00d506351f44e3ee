use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;

use crate::group::peer::{FetchFuture, FetchRequest, FetchResponse, PeerFetcher, PeerPicker};
use crate::routing::ring::{default_hash, Ring, RingHash, DEFAULT_REPLICAS};

use super::protocol::{decode_fetch_response, escape_component, DEFAULT_BASE_PATH};

/// Per-call deadline for a peer fetch.
const FETCH_TIMEOUT: Duration = Duration::from_millis(500);
/// Attempts per fetch; only connection-level failures are retried.
const FETCH_ATTEMPTS: usize = 3;

/// Ring and per-peer clients, replaced wholesale on every peer-set update so
/// a picker either sees the old topology or the new one, never a blend.
struct PoolState {
    ring: Ring,
    fetchers: HashMap<String, Arc<HttpFetcher>>,
}

/// Peer picker backed by HTTP.
///
/// The pool knows this process's own advertised base URL, builds a
/// consistent-hash ring over the configured peer set, and hands out an
/// [`HttpFetcher`] for every key owned by a remote peer. Keys owned by this
/// process resolve to `None`, which tells the group to serve locally.
pub struct HttpPool {
    self_url: String,
    base_path: String,
    replicas: usize,
    hash: RingHash,
    client: reqwest::Client,
    state: Mutex<PoolState>,
}

impl HttpPool {
    /// Creates a pool with the default base path, replica count and hash.
    ///
    /// `self_url` is the base URL this process advertises to its peers, e.g.
    /// `http://10.0.0.2:8001`. The peer set configured via
    /// [`HttpPool::set_peers`] must contain exactly this string for the
    /// local-versus-remote decision to be consistent cluster-wide.
    pub fn new(self_url: &str) -> Arc<Self> {
        Self::with_options(self_url, DEFAULT_BASE_PATH, DEFAULT_REPLICAS, default_hash())
    }

    /// Creates a pool with explicit routing options. All peers must use the
    /// same base path, replica count and hash function.
    pub fn with_options(
        self_url: &str,
        base_path: &str,
        replicas: usize,
        hash: RingHash,
    ) -> Arc<Self> {
        let cleaned = base_path.trim_matches('/');
        let base_path = if cleaned.is_empty() {
            "/".to_string()
        } else {
            format!("/{cleaned}/")
        };

        let state = Mutex::new(PoolState {
            ring: Ring::with_hash(replicas, hash.clone()),
            fetchers: HashMap::new(),
        });

        Arc::new(Self {
            self_url: self_url.trim_end_matches('/').to_owned(),
            base_path,
            replicas,
            hash,
            client: reqwest::Client::new(),
            state,
        })
    }

    /// Replaces the peer set. The ring and the client map are rebuilt from
    /// scratch and swapped in atomically.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| peer.into().trim_end_matches('/').to_owned())
            .collect();

        let mut ring = Ring::with_hash(self.replicas, self.hash.clone());
        ring.add(peers.iter().cloned());

        let fetchers = peers
            .iter()
            .map(|peer| {
                let base = format!("{}{}", peer, self.base_path);
                (
                    peer.clone(),
                    Arc::new(HttpFetcher::new(self.client.clone(), base)),
                )
            })
            .collect();

        tracing::info!("Peer set updated: {} peer(s)", peers.len());
        let mut state = self.state.lock().expect("pool lock poisoned");
        *state = PoolState { ring, fetchers };
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let state = self.state.lock().expect("pool lock poisoned");
        let owner = state.ring.get(key)?;
        if owner == self.self_url {
            return None;
        }
        tracing::debug!("Picked peer {} for key {}", owner, key);
        let fetcher = state.fetchers.get(owner)?.clone();
        Some(fetcher)
    }
}

/// HTTP client handle bound to one remote peer.
pub struct HttpFetcher {
    client: reqwest::Client,
    /// Peer base URL joined with the base path, e.g.
    /// `http://10.0.0.2:8001/_peercache/`.
    base: String,
}

impl HttpFetcher {
    pub(crate) fn new(client: reqwest::Client, base: String) -> Self {
        Self { client, base }
    }

    async fn do_fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let url = format!(
            "{}{}/{}",
            self.base,
            escape_component(&request.group),
            escape_component(&request.key)
        );

        let response = self
            .get_with_retry(&url, FETCH_TIMEOUT, FETCH_ATTEMPTS)
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("peer returned {status}");
        }

        let body = response.bytes().await?;
        decode_fetch_response(&body)
    }

    async fn get_with_retry(
        &self,
        url: &str,
        timeout: Duration,
        attempts: usize,
    ) -> Result<reqwest::Response> {
        let mut delay_ms = 150u64;

        for attempt in 0..attempts {
            let response = self.client.get(url).timeout(timeout).send().await;

            match response {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if attempt + 1 == attempts {
                        return Err(anyhow::anyhow!(error));
                    }
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(anyhow::anyhow!("retry attempts exhausted"))
    }
}

impl PeerFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> FetchFuture<'a> {
        Box::pin(self.do_fetch(request))
    }
}
