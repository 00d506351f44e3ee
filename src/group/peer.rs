use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;

/// A request for a value held by another peer.
///
/// The transport decides how this is carried on the wire; the HTTP binding
/// encodes both fields into the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Name of the cache group to consult on the remote peer.
    pub group: String,
    /// The key to look up.
    pub key: String,
}

/// The value returned by the owning peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// The cached bytes.
    pub value: Vec<u8>,
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchResponse>> + Send + 'a>>;

/// A handle for querying one specific remote peer.
pub trait PeerFetcher: Send + Sync + 'static {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> FetchFuture<'a>;
}

/// Resolves which peer owns a key.
///
/// `None` means "serve locally": either this process owns the key, or no
/// peers are registered at all. No network call is issued in that case.
pub trait PeerPicker: Send + Sync + 'static {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}
