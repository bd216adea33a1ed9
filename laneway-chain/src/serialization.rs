//! Consensus-critical serialization.
//!
//! This module contains four traits: `LanewaySerialize` and `LanewayDeserialize`,
//! analogs of the Serde `Serialize` and `Deserialize` traits but intended for
//! the canonical transaction and proposal formats, and `WriteLanewayExt` and
//! `ReadLanewayExt`, extension traits for `io::Read` and `io::Write` with utility
//! functions for reading and writing data (e.g., the compactsize integer format).
//!
//! Every validator must derive the same bytes, and therefore the same hashes,
//! from the same transaction, so all formats here are canonical: decoding rejects
//! non-minimal integers, invalid UTF-8 and trailing data.

mod error;
mod laneway_deserialize;
mod laneway_serialize;
mod read_laneway;
mod write_laneway;

pub mod sha256d;

#[cfg(test)]
mod tests;

pub use error::SerializationError;
pub use laneway_deserialize::{
    laneway_deserialize_bytes_external_count, laneway_deserialize_external_count,
    LanewayDeserialize, LanewayDeserializeInto, TrustedPreallocate,
};
pub use laneway_serialize::{
    laneway_serialize_bytes, laneway_serialize_external_count, LanewaySerialize,
    MAX_PROTOCOL_MESSAGE_LEN,
};
pub use read_laneway::ReadLanewayExt;
pub use write_laneway::WriteLanewayExt;
