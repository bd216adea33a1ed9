use std::io;

use super::WriteLanewayExt;

/// Consensus-critical serialization for Laneway.
///
/// This trait provides a generic serialization for the formats every validator
/// must agree on, such as transactions and block proposals. In other contexts,
/// such as configuration or RPC output, it would be preferable to use Serde.
pub trait LanewaySerialize: Sized {
    /// Write `self` to the given `writer` using the canonical format.
    ///
    /// This function has a `laneway_` prefix to alert the reader that the
    /// serialization in use is consensus-critical serialization, rather than
    /// some other kind of serialization.
    ///
    /// Notice that the error type is [`std::io::Error`]; this indicates that
    /// serialization MUST be infallible up to errors in the underlying writer.
    /// In other words, any type implementing `LanewaySerialize` must make illegal
    /// states unrepresentable.
    fn laneway_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error>;

    /// Helper function to construct a vec to serialize the current struct into
    fn laneway_serialize_to_vec(&self) -> Result<Vec<u8>, io::Error> {
        let mut data = Vec::new();
        self.laneway_serialize(&mut data)?;
        Ok(data)
    }

    /// Get the size of `self` by using a fake writer.
    fn laneway_serialized_size(&self) -> usize {
        let mut writer = FakeWriter(0);
        self.laneway_serialize(&mut writer)
            .expect("writing to a FakeWriter should never fail");
        writer.0
    }
}

/// A fake writer helper used to get object lengths without allocating RAM.
pub struct FakeWriter(pub usize);

impl io::Write for FakeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serialize a `Vec` as a compactsize number of items, then the items.
///
/// See `laneway_serialize_external_count` for more details, and usage information.
impl<T: LanewaySerialize> LanewaySerialize for Vec<T> {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compactsize(self.len() as u64)?;
        laneway_serialize_external_count(self, writer)
    }
}

/// Serialize a byte vector as a compactsize number of items, then the items.
//
// we specifically want to serialize `Vec`s here, rather than generic slices
#[allow(clippy::ptr_arg)]
pub fn laneway_serialize_bytes<W: io::Write>(vec: &Vec<u8>, mut writer: W) -> Result<(), io::Error> {
    writer.write_compactsize(vec.len() as u64)?;
    writer.write_all(vec)
}

/// Serialize a typed `Vec` **without** writing the number of items as a
/// compactsize.
///
/// Use `laneway_serialize_external_count` when the array count is determined by
/// other data. Use `Vec::laneway_serialize` for data that contains a compactsize
/// count, followed by the data array.
//
// we specifically want to serialize `Vec`s here, rather than generic slices
#[allow(clippy::ptr_arg)]
pub fn laneway_serialize_external_count<W: io::Write, T: LanewaySerialize>(
    vec: &Vec<T>,
    mut writer: W,
) -> Result<(), io::Error> {
    for x in vec {
        x.laneway_serialize(&mut writer)?;
    }
    Ok(())
}

/// Serialize a raw byte vector with its compactsize length.
///
/// Byte vectors are serialized directly, rather than using the generic
/// `Vec<T>` impl, because `u8` does not implement `LanewaySerialize`.
impl LanewaySerialize for Vec<u8> {
    fn laneway_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        laneway_serialize_bytes(self, writer)
    }
}

/// Write a compactsize-prefixed UTF-8 `&str`.
impl LanewaySerialize for &str {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compactsize(self.len() as u64)?;
        writer.write_all(self.as_bytes())
    }
}

/// Write a compactsize-prefixed UTF-8 `String`.
impl LanewaySerialize for String {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.as_str().laneway_serialize(&mut writer)
    }
}

/// The maximum length of a transaction or block proposal, in bytes.
///
/// This value is used to calculate safe preallocation limits for some types.
pub const MAX_PROTOCOL_MESSAGE_LEN: usize = 4 * 1024 * 1024;
