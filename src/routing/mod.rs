//! Key Placement Module
//!
//! Decides which peer owns a given key, deterministically on every node.
//!
//! ## Mechanism
//! - **Consistent hashing**: Peers are projected onto a ring of 32-bit hash
//!   slots; a key belongs to the peer at the first slot clockwise of the key's
//!   hash, wrapping around at the end of the slot space.
//! - **Virtual slots**: Each peer occupies a configurable number of slots
//!   (50 by default) so that load stays balanced even with few peers.
//! - **Determinism**: All nodes build the ring from the same peer set with the
//!   same hash function, so routing decisions agree cluster-wide without any
//!   coordination.

pub mod ring;
