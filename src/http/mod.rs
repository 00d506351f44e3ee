//! Peer Transport Module
//!
//! HTTP binding of the peer-to-peer cache protocol.
//!
//! ## Wire Contract
//! - **Request**: `GET <base path><group>/<key>` with both components
//!   percent-escaped by the client and unescaped by the server. No body.
//! - **Response**: `200 OK` with `Content-Type: application/octet-stream` and
//!   a length-delimited binary record carrying the value as field 1
//!   (protobuf-compatible wire format). `400` for a malformed path, `404` for
//!   an unknown group, `500` with the error message when the lookup fails.
//!
//! ## Submodules
//! - **`protocol`**: The URL grammar constants, escaping helpers, and the
//!   binary response codec.
//! - **`handlers`**: The axum router a host process mounts to serve peers.
//! - **`pool`**: The peer picker implementation: a consistent-hash ring over
//!   the peer set plus one HTTP client handle per peer.

pub mod handlers;
pub mod pool;
pub mod protocol;

pub use pool::HttpPool;

#[cfg(test)]
mod tests;
