//! Unmined transactions and their pre-calculated identifiers.
//!
//! The mempool and the proposal builder work with [`UnminedTx`]s, which keep the
//! canonical bytes of a transaction beside the decoded transaction, so that sizes
//! and hashes are computed once at admission.

use std::{fmt, sync::Arc};

use crate::serialization::{LanewayDeserialize, LanewaySerialize, SerializationError};

use super::{Hash, Transaction};

/// An unmined transaction, and its pre-calculated unique identifying ID.
#[derive(Clone, Eq, PartialEq)]
pub struct UnminedTx {
    /// A unique identifier for this unmined transaction.
    pub id: Hash,

    /// The unmined transaction itself.
    pub transaction: Arc<Transaction>,

    /// The canonical encoding of the transaction.
    pub bytes: Arc<[u8]>,

    /// The size in bytes of the serialized transaction data
    pub size: usize,
}

impl fmt::Display for UnminedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.id, self.size)
    }
}

impl fmt::Debug for UnminedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnminedTx")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("messages", &self.transaction.messages.len())
            .finish()
    }
}

impl UnminedTx {
    /// Decodes an unmined transaction from its canonical encoding.
    ///
    /// Non-canonical encodings and trailing data are rejected, so every
    /// accepted byte string has exactly one hash.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self, SerializationError> {
        let bytes = bytes.into();
        let transaction = Transaction::laneway_deserialize_exact(&bytes)?;

        Ok(Self {
            id: Hash::of_bytes(&bytes),
            transaction: Arc::new(transaction),
            size: bytes.len(),
            bytes,
        })
    }

    /// Returns the gas limit of this transaction.
    pub fn gas_limit(&self) -> u64 {
        self.transaction.gas_limit()
    }
}

impl From<Transaction> for UnminedTx {
    fn from(transaction: Transaction) -> Self {
        let bytes: Arc<[u8]> = transaction
            .laneway_serialize_to_vec()
            .expect("serializing into a vec never fails")
            .into();

        Self {
            id: Hash::of_bytes(&bytes),
            transaction: Arc::new(transaction),
            size: bytes.len(),
            bytes,
        }
    }
}

impl From<&Transaction> for UnminedTx {
    fn from(transaction: &Transaction) -> Self {
        transaction.clone().into()
    }
}
