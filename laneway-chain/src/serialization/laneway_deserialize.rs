use std::{
    convert::{TryFrom, TryInto},
    io,
};

use super::{ReadLanewayExt, SerializationError, MAX_PROTOCOL_MESSAGE_LEN};

/// Consensus-critical deserialization for Laneway.
///
/// This trait provides a generic deserialization for the formats every validator
/// must agree on, such as transactions and block proposals. In other contexts,
/// such as configuration or RPC output, it would be preferable to use Serde.
pub trait LanewayDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    ///
    /// This function has a `laneway_` prefix to alert the reader that the
    /// serialization in use is consensus-critical serialization, rather than
    /// some other kind of serialization.
    fn laneway_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;

    /// Deserialize `self` from exactly `bytes`, rejecting any trailing data.
    ///
    /// Trailing data would give one value several encodings, and therefore
    /// several hashes.
    fn laneway_deserialize_exact(bytes: &[u8]) -> Result<Self, SerializationError> {
        let mut reader = io::Cursor::new(bytes);
        let value = Self::laneway_deserialize(&mut reader)?;

        if reader.position() != bytes.len() as u64 {
            return Err(SerializationError::Parse("trailing data after value"));
        }

        Ok(value)
    }
}

/// Deserialize a `Vec`, where the number of items is set by a compactsize
/// prefix in the data.
///
/// See `laneway_deserialize_external_count` for more details, and usage
/// information.
impl<T: LanewayDeserialize + TrustedPreallocate> LanewayDeserialize for Vec<T> {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compactsize()?.try_into()?;
        laneway_deserialize_external_count(len, reader)
    }
}

/// Implement LanewayDeserialize for Vec<u8> directly instead of using the blanket Vec implementation
///
/// This allows us to optimize the inner loop into a single call to `read_exact()`
/// Note that we don't implement TrustedPreallocate for u8.
/// This allows the optimization without relying on specialization.
impl LanewayDeserialize for Vec<u8> {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compactsize()?.try_into()?;
        laneway_deserialize_bytes_external_count(len, reader)
    }
}

/// Deserialize a `Vec` containing `external_count` items.
///
/// Use `laneway_deserialize_external_count` when the array count is determined by
/// other data. Use `Vec::laneway_deserialize` for data that contains a compactsize
/// count, followed by the data array.
pub fn laneway_deserialize_external_count<
    R: io::Read,
    T: LanewayDeserialize + TrustedPreallocate,
>(
    external_count: usize,
    mut reader: R,
) -> Result<Vec<T>, SerializationError> {
    match u64::try_from(external_count) {
        Ok(external_count) if external_count > T::max_allocation() => {
            return Err(SerializationError::Parse(
                "Vector longer than max_allocation",
            ))
        }
        Ok(_) => {}
        Err(_) => return Err(SerializationError::Parse("Vector longer than u64::MAX")),
    }
    let mut vec = Vec::with_capacity(external_count);
    for _ in 0..external_count {
        vec.push(T::laneway_deserialize(&mut reader)?);
    }
    Ok(vec)
}

/// `laneway_deserialize_external_count`, specialised for raw bytes.
///
/// This allows us to optimize the inner loop into a single call to `read_exact()`.
pub fn laneway_deserialize_bytes_external_count<R: io::Read>(
    external_count: usize,
    mut reader: R,
) -> Result<Vec<u8>, SerializationError> {
    if external_count > MAX_U8_ALLOCATION {
        return Err(SerializationError::Parse(
            "Byte vector longer than MAX_U8_ALLOCATION",
        ));
    }
    let mut vec = vec![0u8; external_count];
    reader.read_exact(&mut vec)?;
    Ok(vec)
}

/// Read a compactsize-prefixed UTF-8 string.
impl LanewayDeserialize for String {
    fn laneway_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        let bytes: Vec<_> = Vec::laneway_deserialize(reader)?;
        String::from_utf8(bytes).map_err(|_| SerializationError::Parse("invalid utf-8"))
    }
}

/// A byte vector nested inside another vector, such as the transactions of a proposal,
/// always takes at least one byte for its length.
impl TrustedPreallocate for Vec<u8> {
    fn max_allocation() -> u64 {
        MAX_PROTOCOL_MESSAGE_LEN as u64
    }
}

/// Helper for deserializing more succinctly via type inference
pub trait LanewayDeserializeInto {
    /// Deserialize based on type inference
    fn laneway_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: LanewayDeserialize;
}

impl<R: io::Read> LanewayDeserializeInto for R {
    fn laneway_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: LanewayDeserialize,
    {
        T::laneway_deserialize(self)
    }
}

/// Blind preallocation of a Vec<T: TrustedPreallocate> is based on a bounded length. This is in contrast
/// to blind preallocation of a generic Vec<T>, which is a DOS vector.
///
/// The max_allocation() function provides a loose upper bound on the size of the Vec<T: TrustedPreallocate>
/// which can possibly be received from an honest client. If this limit is too low, Laneway may reject valid
/// transactions or proposals.
pub trait TrustedPreallocate {
    /// Provides a ***loose upper bound*** on the size of the Vec<T: TrustedPreallocate>
    /// which can possibly be received from an honest client.
    fn max_allocation() -> u64;
}

/// The length of the longest valid `Vec<u8>` that can be received.
///
/// It takes 5 bytes to encode a compactsize representing any number between 2^16 and (2^32 - 1).
pub(crate) const MAX_U8_ALLOCATION: usize = MAX_PROTOCOL_MESSAGE_LEN - 5;
