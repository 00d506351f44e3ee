//! Cache Group Module
//!
//! Implements the read-path orchestration around the local cache layer.
//!
//! ## Architecture Overview
//! A [`group::Group`] is a named cache namespace. Each group carries its own
//! byte capacity, its own [`loader::Loader`] (the source of truth) and an
//! optional peer picker. A lookup walks the path:
//!
//! 1. **Local cache**: a hit is returned immediately.
//! 2. **Single-flight**: on a miss, concurrent callers for the same key are
//!    coalesced into one load.
//! 3. **Peer routing**: if another peer owns the key, the value is fetched
//!    from it over the transport; the owning peer keeps the only cached copy.
//! 4. **Loader fallback**: if this peer owns the key, or the remote fetch
//!    failed, the user loader is invoked and the result is cached locally.
//!
//! ## Submodules
//! - **`loader`**: The capability handed in by the user to fetch authoritative
//!   bytes for a key.
//! - **`peer`**: Transport-neutral capabilities for picking and querying the
//!   peer that owns a key.
//! - **`group`**: The orchestrator itself.
//! - **`registry`**: Process-wide name -> group lookup used by the transport
//!   server to resolve incoming requests.

pub mod group;
pub mod loader;
pub mod peer;
pub mod registry;

pub use group::Group;
pub use registry::lookup;
