//! Transactions and transaction-related structures.
//!
//! A [`Transaction`] is an ordered list of typed [`Message`]s, the accounts that
//! signed it, the fee it pays and its signatures. Laneway does not interpret
//! message payloads, except for the auction bid message in [`auction`], which
//! the mempool and proposal rules depend on.

use std::collections::BTreeSet;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::{
    address::Address,
    amount::{Amount, NonNegative},
};

pub mod auction;
mod hash;
mod serialize;
mod unmined;

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;


pub use auction::MsgAuctionBid;
pub use hash::Hash;
pub use unmined::UnminedTx;

/// A Laneway transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// The messages executed by this transaction, in order.
    pub messages: Vec<Message>,

    /// The accounts that signed this transaction, and their sequence numbers.
    pub signers: Vec<Signer>,

    /// The fee paid by this transaction.
    pub fee: Fee,

    /// An arbitrary note attached by the sender.
    pub memo: String,

    /// One signature per signer, checked by ante validation.
    pub signatures: Vec<Signature>,
}

/// A typed message inside a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    /// The fully qualified message type, for example `/ibc.core.client.v1.MsgUpdateClient`.
    pub type_url: String,

    /// The encoded message payload.
    pub value: Vec<u8>,
}

/// An account that signed a transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Signer {
    /// The signing account.
    pub address: Address,

    /// The account sequence number this transaction was signed at.
    pub sequence: u64,
}

/// The fee paid by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fee {
    /// The amount paid, in base units of `denom`.
    pub amount: Amount<NonNegative>,

    /// The denomination of `amount`.
    pub denom: String,

    /// The maximum gas this transaction may consume.
    pub gas_limit: u64,
}

/// An opaque 64-byte signature.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signature")
            .field(&hex::encode(self.0))
            .finish()
    }
}

impl Transaction {
    /// Compute the hash (id) of this transaction.
    pub fn hash(&self) -> Hash {
        Hash::from(self)
    }

    /// Returns the addresses that signed this transaction.
    pub fn signer_set(&self) -> BTreeSet<Address> {
        self.signers.iter().map(|signer| signer.address).collect()
    }

    /// Returns `true` if `address` signed this transaction.
    pub fn is_signed_by(&self, address: &Address) -> bool {
        self.signers.iter().any(|signer| &signer.address == address)
    }

    /// Returns the fee amount paid in `denom`, or zero if the fee uses another denomination.
    pub fn fee_in(&self, denom: &str) -> Amount<NonNegative> {
        if self.fee.denom == denom {
            self.fee.amount
        } else {
            Amount::zero()
        }
    }

    /// Returns the gas limit of this transaction.
    pub fn gas_limit(&self) -> u64 {
        self.fee.gas_limit
    }

    /// Returns `true` if any message in this transaction has type `type_url`.
    pub fn has_message_type(&self, type_url: &str) -> bool {
        self.messages
            .iter()
            .any(|message| message.type_url == type_url)
    }
}
