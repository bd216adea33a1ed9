//! Errors that can occur when adding transactions to the mempool.

use thiserror::Error;

use laneway_chain::{
    amount::{Amount, NonNegative},
    serialization::SerializationError,
    transaction, Address,
};
use laneway_consensus::{error::BidError, LaneKind};

use crate::BoxError;

/// A transaction was not added to the mempool.
///
/// These errors are returned to the submitter. None of them are fatal to the node.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum MempoolError {
    #[error("transaction could not be decoded: {0}")]
    Decode(#[from] SerializationError),

    #[error("transaction {hash} failed ante validation: {source}")]
    AnteValidation {
        hash: transaction::Hash,
        #[source]
        source: BoxError,
    },

    #[error("invalid auction bid: {0}")]
    MalformedBid(#[from] BidError),

    #[error("bidder {bidder} has {available} available, but bid {bid}")]
    InsufficientBidFunds {
        bidder: Address,
        bid: Amount<NonNegative>,
        available: Amount<NonNegative>,
    },

    #[error("could not query the balance of bidder {bidder}: {source}")]
    BalanceUnavailable {
        bidder: Address,
        #[source]
        source: BoxError,
    },

    #[error("bidder {bidder} already has bid {existing} in the mempool")]
    DuplicateBidder {
        bidder: Address,
        existing: transaction::Hash,
    },

    #[error("bundled transaction {0} was not submitted with the bid, and is not in the mempool")]
    UnresolvedBundle(transaction::Hash),

    #[error("the {0} lane is full, and the transaction does not outrank its lowest-priority entries")]
    CapacityExceeded(LaneKind),

    #[error("transaction {0} is already in the mempool")]
    DuplicateTx(transaction::Hash),

    #[error("no configured lane matches the transaction")]
    NoMatchingLane,
}
