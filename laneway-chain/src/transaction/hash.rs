use std::fmt;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};

use crate::serialization::{
    sha256d, LanewayDeserialize, LanewaySerialize, ReadLanewayExt, SerializationError,
    TrustedPreallocate, MAX_PROTOCOL_MESSAGE_LEN,
};

use super::Transaction;

/// A transaction hash: the double SHA-256 of the transaction's canonical encoding.
///
/// Note: Laneway displays transaction hashes in big-endian byte-order,
/// following the u256 convention set by Bitcoin. Ordering is by the
/// internal byte array, which is the order used to break priority ties.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Hash)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Returns the hash of `bytes`, which must be a canonical transaction encoding.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        use std::io::Write;

        let mut hash_writer = sha256d::Writer::default();
        hash_writer
            .write_all(bytes)
            .expect("Sha256dWriter is infallible");

        Self(hash_writer.finish())
    }
}

impl<'a> From<&'a Transaction> for Hash {
    fn from(transaction: &'a Transaction) -> Self {
        let mut hash_writer = sha256d::Writer::default();
        transaction
            .laneway_serialize(&mut hash_writer)
            .expect("Transactions must serialize into the hash.");
        Self(hash_writer.finish())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed_bytes = self.0;
        reversed_bytes.reverse();
        f.write_str(&hex::encode(reversed_bytes))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed_bytes = self.0;
        reversed_bytes.reverse();
        f.debug_tuple("transaction::Hash")
            .field(&hex::encode(reversed_bytes))
            .finish()
    }
}

impl std::str::FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if hex::decode_to_slice(s, &mut bytes[..]).is_err() {
            Err(SerializationError::Parse("hex decoding error"))
        } else {
            bytes.reverse();
            Ok(Hash(bytes))
        }
    }
}

impl LanewaySerialize for Hash {
    fn laneway_serialize<W: std::io::Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        writer.write_all(&self.0)
    }
}

impl LanewayDeserialize for Hash {
    fn laneway_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Hash(reader.read_array()?))
    }
}

impl TrustedPreallocate for Hash {
    fn max_allocation() -> u64 {
        (MAX_PROTOCOL_MESSAGE_LEN / 32) as u64
    }
}
