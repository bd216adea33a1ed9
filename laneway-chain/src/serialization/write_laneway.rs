use std::io;

use byteorder::{LittleEndian, WriteBytesExt};

/// Extends [`io::Write`] with the length prefix encoding used by transactions
/// and proposals.
pub trait WriteLanewayExt: io::Write {
    /// Writes `n` in the shortest `CompactSize` encoding.
    ///
    /// ```
    /// use laneway_chain::serialization::WriteLanewayExt;
    ///
    /// let mut buf = Vec::new();
    /// buf.write_compactsize(0xaafd).unwrap();
    /// assert_eq!(buf, b"\xfd\xfd\xaa");
    /// ```
    fn write_compactsize(&mut self, n: u64) -> io::Result<()> {
        if let Ok(n @ 0..=0xfc) = u8::try_from(n) {
            self.write_u8(n)
        } else if let Ok(n) = u16::try_from(n) {
            self.write_u8(0xfd)?;
            self.write_u16::<LittleEndian>(n)
        } else if let Ok(n) = u32::try_from(n) {
            self.write_u8(0xfe)?;
            self.write_u32::<LittleEndian>(n)
        } else {
            self.write_u8(0xff)?;
            self.write_u64::<LittleEndian>(n)
        }
    }
}

impl<W: io::Write + ?Sized> WriteLanewayExt for W {}
