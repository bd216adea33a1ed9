//! Block heights and block proposals.

use std::{fmt, io};

use serde::{Deserialize, Serialize};

use crate::{
    serialization::{
        LanewayDeserialize, LanewayDeserializeInto, LanewaySerialize, SerializationError,
    },
    transaction::UnminedTx,
};


/// The height of a block is the length of the chain back to the genesis block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(pub u32);

impl Height {
    /// The minimum Height.
    pub const MIN: Height = Height(0);

    /// The maximum Height.
    pub const MAX: Height = Height(u32::MAX - 1);

    /// Returns the next height, or `None` if `self` is [`Height::MAX`].
    pub fn next(self) -> Option<Height> {
        self.0
            .checked_add(1)
            .map(Height)
            .filter(|height| *height <= Height::MAX)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for Height {
    type Err = SerializationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse() {
            Ok(h) if (Height(h) <= Height::MAX) => Ok(Height(h)),
            Ok(_) => Err(SerializationError::Parse("Height exceeds maximum height")),
            Err(_) => Err(SerializationError::Parse("Height(u32) integer parse error")),
        }
    }
}

/// A candidate block body: an ordered list of encoded transactions.
///
/// Transactions are kept as raw bytes, because a proposal from another node
/// may contain bytes that don't decode. Those proposals must be rejected,
/// not fail to parse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Proposal {
    /// The encoded transactions, in execution order.
    pub transactions: Vec<Vec<u8>>,
}

impl Proposal {
    /// Builds a proposal from `transactions`, in order.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a UnminedTx>) -> Self {
        Self {
            transactions: transactions
                .into_iter()
                .map(|tx| tx.bytes.to_vec())
                .collect(),
        }
    }

    /// Returns the total size of the encoded transactions, which is the size
    /// checked against block byte budgets.
    pub fn transaction_bytes(&self) -> usize {
        self.transactions.iter().map(Vec::len).sum()
    }

    /// Returns the number of transactions in this proposal.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns `true` if this proposal has no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl LanewaySerialize for Proposal {
    fn laneway_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        self.transactions.laneway_serialize(writer)
    }
}

impl LanewayDeserialize for Proposal {
    fn laneway_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(Proposal {
            transactions: reader.laneway_deserialize_into()?,
        })
    }
}
