use std::io;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{SerializationError, MAX_PROTOCOL_MESSAGE_LEN};

/// Extends [`io::Read`] with the length prefixes and fixed-size fields used by
/// transactions and proposals.
pub trait ReadLanewayExt: io::Read {
    /// Reads a length prefix in the `CompactSize` encoding.
    ///
    /// Only the shortest encoding of each value is accepted, so every length has
    /// exactly one byte representation. Lengths larger than
    /// [`MAX_PROTOCOL_MESSAGE_LEN`] can't describe a valid message, and are
    /// rejected before anything is allocated for them.
    ///
    /// ```
    /// use std::io::Cursor;
    /// use laneway_chain::serialization::ReadLanewayExt;
    ///
    /// assert_eq!(Cursor::new(b"\x12").read_compactsize().unwrap(), 0x12);
    /// assert_eq!(Cursor::new(b"\xfd\xfd\x00").read_compactsize().unwrap(), 0xfd);
    ///
    /// // 0x12 fits in one byte, so the three byte form is rejected
    /// Cursor::new(b"\xfd\x12\x00").read_compactsize().unwrap_err();
    /// ```
    fn read_compactsize(&mut self) -> Result<u64, SerializationError> {
        let (size, min) = match self.read_u8()? {
            n @ 0x00..=0xfc => (u64::from(n), 0),
            0xfd => (u64::from(self.read_u16::<LittleEndian>()?), 0xfd),
            0xfe => (u64::from(self.read_u32::<LittleEndian>()?), 0x1_0000),
            0xff => (self.read_u64::<LittleEndian>()?, 0x1_0000_0000),
        };

        if size < min {
            return Err(SerializationError::Parse("non-canonical compactsize"));
        }

        if size > MAX_PROTOCOL_MESSAGE_LEN as u64 {
            return Err(SerializationError::Parse(
                "compactsize larger than protocol message limit",
            ));
        }

        Ok(size)
    }

    /// Reads a fixed-size field, such as an address, hash, or signature.
    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut bytes = [0; N];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl<R: io::Read + ?Sized> ReadLanewayExt for R {}
