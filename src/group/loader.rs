use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// The source of truth behind a cache group.
///
/// Invoked on a cache miss for the key's owning peer, at most once across all
/// concurrent callers of that key. The returned bytes are assumed to be the
/// same for the same key for the lifetime of the process; failures are
/// propagated to the caller and never cached.
pub trait Loader: Send + Sync + 'static {
    fn load(&self, key: &str) -> LoadFuture<'_>;
}

/// Adapts a plain async closure into a [`Loader`].
pub struct LoaderFn<F> {
    load: F,
}

impl<F, Fut> LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
{
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
{
    fn load(&self, key: &str) -> LoadFuture<'_> {
        Box::pin((self.load)(key.to_owned()))
    }
}
