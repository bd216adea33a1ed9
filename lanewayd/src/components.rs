//! Holds components of a Laneway node.
//!
//! The mempool is a `tower::Service` driven by the consensus engine. Tracing is
//! installed once at startup.

pub mod mempool;
pub mod tracing;
