//! Load Coalescing Module
//!
//! Deduplicates concurrent invocations of the same expensive load.
//!
//! ## Mechanism
//! When several callers ask for the same key at once, only the first one runs
//! the actual work. Everyone else subscribes to a completion signal and, once
//! the work finishes, observes exactly the same outcome. The in-flight record
//! is removed before the signal fires, so a request arriving after completion
//! starts a fresh flight.
//!
//! The coalescer does not retry and does not classify errors; whatever the
//! work produced is handed to every waiting caller as-is.

pub mod flight;
