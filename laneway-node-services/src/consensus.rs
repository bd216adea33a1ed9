//! The callbacks the consensus engine makes into the node.
//!
//! The consensus engine is external. It submits transactions with
//! [`Request::CheckTx`], asks the proposer for a block with
//! [`Request::PrepareProposal`], asks every validator to vote on a block with
//! [`Request::ProcessProposal`], and reports committed blocks with
//! [`Request::Commit`].

use std::collections::HashSet;

use laneway_chain::{
    block::{self, Proposal},
    transaction::{self, UnminedTx},
};

/// A request from the consensus engine, or a mempool query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    /// Admit a transaction into the mempool.
    ///
    /// `siblings` are other encoded transactions submitted alongside it. Auction
    /// bids use them to supply their bundled transactions. A bid's bundle can
    /// also refer to transactions already in the mempool.
    ///
    /// Returns [`Response::Accepted`], or an error describing the rejection.
    CheckTx {
        /// The encoded transaction.
        transaction: Vec<u8>,

        /// Encoded transactions submitted with `transaction`.
        siblings: Vec<Vec<u8>>,
    },

    /// Build a block for `height` from the mempool.
    ///
    /// `max_bytes` is the consensus engine's limit on the total size of the
    /// block's transactions. The node also applies its own configured budget.
    ///
    /// Returns [`Response::Proposal`].
    PrepareProposal {
        /// The height of the block being built.
        height: block::Height,

        /// The maximum total transaction bytes.
        max_bytes: u64,
    },

    /// Vote on a block proposed for `height`.
    ///
    /// Returns [`Response::ProcessProposal`]. Invalid blocks are a reject vote,
    /// not an error.
    ProcessProposal {
        /// The height of the proposed block.
        height: block::Height,

        /// The encoded [`Proposal`].
        proposal: Vec<u8>,
    },

    /// Remove the transactions in a committed block from the mempool.
    ///
    /// Returns [`Response::Committed`].
    Commit {
        /// The height of the committed block.
        height: block::Height,

        /// The committed block.
        block: Proposal,
    },

    /// Query all transaction ids in the mempool.
    TransactionIds,

    /// Query matching transactions in the mempool.
    TransactionsById(HashSet<transaction::Hash>),

    /// Query matching recently rejected or evicted transaction ids.
    RejectedTransactionIds(HashSet<transaction::Hash>),
}

/// A response to a [`Request`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// The transaction with this id was added to the mempool.
    Accepted(transaction::Hash),

    /// The encoded block built by [`Request::PrepareProposal`].
    Proposal(Vec<u8>),

    /// The vote on a [`Request::ProcessProposal`].
    ProcessProposal(ProposalVote),

    /// The transactions removed by a [`Request::Commit`].
    Committed(RemovedTransactionIds),

    /// All transaction ids in the mempool.
    TransactionIds(HashSet<transaction::Hash>),

    /// Matching transactions from the mempool.
    Transactions(Vec<UnminedTx>),

    /// Matching recently rejected or evicted transaction ids.
    RejectedTransactionIds(HashSet<transaction::Hash>),
}

/// A validator's vote on a proposed block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProposalVote {
    /// The block could have been built by an honest proposer.
    Accept,

    /// The block breaks the lane or auction rules, for the given reason.
    Reject(String),
}

impl ProposalVote {
    /// Returns `true` if this is an accept vote.
    pub fn is_accept(&self) -> bool {
        matches!(self, ProposalVote::Accept)
    }
}

/// The transactions removed from the mempool when a block is committed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RemovedTransactionIds {
    /// Transactions included in the committed block.
    pub mined: HashSet<transaction::Hash>,

    /// Auction bids whose bundles included a committed transaction.
    pub invalidated: HashSet<transaction::Hash>,
}
