//! Local Cache Module
//!
//! Implements the in-process storage layer that backs every cache group.
//!
//! ## Core Concepts
//! - **Immutability**: All cached values are [`view::ByteView`]s. Once constructed,
//!   the underlying bytes can never change, so views are shared across tasks
//!   without copying.
//! - **Byte accounting**: The [`lru::LruStore`] tracks the cost of every entry as
//!   `key length + value length` and evicts least-recently-used entries until the
//!   configured byte capacity is respected.
//! - **Lazy construction**: [`shared::SharedCache`] serializes access through a
//!   mutex and only allocates the LRU store on the first write, so empty groups
//!   stay cheap.

pub mod lru;
pub mod shared;
pub mod view;
