//! Distributed Group-Cache Library
//!
//! This library crate defines the core modules that make up the distributed cache.
//! It serves as the foundation for the node binary (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`cache`**: The local storage layer. Implements an immutable byte view,
//!   a byte-accounted LRU store, and a mutex-guarded shared cache wrapper.
//! - **`routing`**: The key placement layer. A consistent-hash ring with virtual
//!   slots maps every key to exactly one owning peer, deterministically on all nodes.
//! - **`singleflight`**: The load coalescer. Concurrent requests for the same key
//!   share one in-flight load instead of hitting the source of truth in parallel.
//! - **`group`**: The orchestration layer. A `Group` is a named cache namespace
//!   that composes local lookup, peer routing, single-flight and the user loader
//!   into a coherent read path.
//! - **`http`**: The peer transport. Serves cache lookups to other peers over HTTP
//!   and fetches from remote owners, using a compact binary response encoding.

pub mod cache;
pub mod group;
pub mod http;
pub mod routing;
pub mod singleflight;
