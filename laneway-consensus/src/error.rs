//! Errors that can occur when checking lane and auction rules.
//!
//! Each error variant corresponds to a rule, so enumerating all possible
//! verification failures enumerates the rules we implement, and ensures that
//! we don't reject transactions or blocks for a non-enumerated reason.

use thiserror::Error;

use laneway_chain::{
    amount::{self, Amount, NonNegative},
    serialization::SerializationError,
    transaction, Address,
};

use crate::{lane::LaneKind, BoxError};

/// A transaction carries an auction bid message that can't be accepted.
///
/// Transactions without a bid message are never a `BidError`:
/// [`extract`](crate::auction::extract) returns `Ok(None)` for them.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum BidError {
    #[error("bid message payload could not be decoded: {0}")]
    Decode(#[from] SerializationError),

    #[error("bid amount is negative or out of range: {0}")]
    Amount(#[from] amount::Error),

    #[error("transaction has {0} bid messages, only one is allowed")]
    MultipleBids(usize),

    #[error("bid transaction must not contain any other messages")]
    MixedMessages,

    #[error("bidder {0} did not sign the bid transaction")]
    BidderNotSigner(Address),

    #[error("bid has an empty bundle")]
    EmptyBundle,

    #[error("bundle contains transaction {0} more than once")]
    DuplicateBundleTransaction(transaction::Hash),

    #[error("bundle has {actual} transactions, the maximum is {max}")]
    BundleTooLarge { actual: usize, max: usize },

    #[error("bid of {bid} is below the reserve fee of {reserve}")]
    BelowReserve {
        bid: Amount<NonNegative>,
        reserve: Amount<NonNegative>,
    },

    #[error("bundled transaction {0} is itself an auction bid")]
    NestedBid(transaction::Hash),

    #[error("bundled transaction {0} is signed by the bidder after another signer's transaction")]
    FrontRunning(transaction::Hash),

    #[error("bundled transaction {0} is signed by a third set of signers")]
    TooManySigners(transaction::Hash),

    #[error("bundled transaction {expected} is missing, found {found:?}")]
    BundleMismatch {
        expected: transaction::Hash,
        found: Option<transaction::Hash>,
    },
}

/// A transaction can't be assigned to a lane.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum LaneError {
    #[error("invalid auction bid: {0}")]
    Bid(#[from] BidError),

    #[error("no configured lane matches the transaction")]
    NoMatchingLane,
}

/// The configured lane layout is unusable.
///
/// Layout errors are configuration defects, which stop the node at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LaneLayoutError {
    #[error("at least one lane must be configured")]
    Empty,

    #[error("the default lane is missing, so some transactions would match no lane")]
    MissingDefault,

    #[error("the default lane must be the last lane, it matches every transaction")]
    DefaultNotLast,

    #[error("the {0} lane is configured more than once")]
    DuplicateLane(LaneKind),

    #[error("the mev lane must be the first lane, bids are executed at the top of the block")]
    MevNotFirst,

    #[error("the {kind} lane has max_block_space_percent {percent}, the maximum is 100")]
    InvalidBlockSpace { kind: LaneKind, percent: u8 },

    #[error("the auction bid message type can't be a free message type")]
    FreeBidMessage,

    #[error("the block budget must allow at least one transaction and one byte")]
    EmptyBlockBudget,
}

/// A proposed block can't have been built by an honest proposer.
///
/// A `ProposalError` becomes a reject vote. It is never a local failure.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum ProposalError {
    #[error("proposal could not be decoded: {0}")]
    Decode(#[source] SerializationError),

    #[error("transaction {index} could not be decoded: {source}")]
    TransactionDecode {
        index: usize,
        #[source]
        source: SerializationError,
    },

    #[error("proposal has {actual} transactions, the maximum is {max}")]
    TooManyTransactions { actual: usize, max: u32 },

    #[error("proposal has {actual} transaction bytes, the maximum is {max}")]
    TooManyBytes { actual: u64, max: u64 },

    #[error("proposal has {actual} gas, the maximum is {max}")]
    TooMuchGas { actual: u128, max: u64 },

    #[error("proposal contains transaction {0} more than once")]
    DuplicateTransaction(transaction::Hash),

    #[error("transaction {hash} can't be assigned to a lane: {source}")]
    Lane {
        hash: transaction::Hash,
        #[source]
        source: LaneError,
    },

    #[error("ordering violation: {0}")]
    OrderingViolation(#[from] OrderingViolation),

    #[error("the {kind} lane uses {actual} bytes, its limit is {max}")]
    LaneSpaceExceeded {
        kind: LaneKind,
        actual: u64,
        max: u64,
    },

    #[error("auction bid {hash} is invalid: {source}")]
    Bid {
        hash: transaction::Hash,
        #[source]
        source: BidError,
    },

    #[error("transaction {hash} failed validation: {source}")]
    Ante {
        hash: transaction::Hash,
        #[source]
        source: BoxError,
    },
}

/// The transactions in a proposed block are not in lane order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum OrderingViolation {
    #[error("{hash} in the {found} lane comes after a transaction in the {after} lane")]
    LaneOrder {
        hash: transaction::Hash,
        found: LaneKind,
        after: LaneKind,
    },

    #[error("{hash} in the {kind} lane does not have a lower priority than the transaction before it")]
    PriorityOrder {
        hash: transaction::Hash,
        kind: LaneKind,
    },

    #[error("auction bid {0} is not the only bid in the block")]
    MultipleBids(transaction::Hash),
}
