//! Laneway mempool.
//!
//! The mempool holds admitted transactions in lanes, builds block proposals
//! from them, and verifies proposals from other validators.
//!
//! [`Mempool`] is the `tower::Service` the consensus engine calls. It answers
//! each [`Request`] the engine makes:
//!
//! - `CheckTx`: admit a transaction, see [`admission`],
//! - `PrepareProposal`: select transactions for a block, see [`Storage::select`],
//! - `ProcessProposal`: vote on a block, see [`laneway_consensus::proposal`],
//! - `Commit`: remove committed and invalidated transactions.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
    task::{Context, Poll},
};

use futures::future::FutureExt;
use tower::{Service, ServiceExt};

use laneway_chain::{
    block::Proposal,
    serialization::LanewaySerialize,
    transaction,
};
use laneway_consensus::{error::LaneLayoutError, proposal, LaneRules};
use laneway_node_services::{
    ante, balance,
    consensus::{ProposalVote, Request, Response},
};

pub use crate::BoxError;

mod admission;
mod config;
mod error;
mod storage;


pub use self::{
    admission::Admission,
    config::{Config, LaneCapacity},
    error::MempoolError,
    storage::{LaneEntry, Storage},
};

/// Mempool async management and query service.
///
/// The mempool is the set of all admitted transactions that this node is aware
/// of that have yet to be committed in a block.
pub struct Mempool<A, B> {
    /// The lane rules, shared by admission, block building, and block verification.
    rules: Arc<LaneRules>,

    /// The mempool storage itself.
    ///
    /// Correctness: only [`Admission`] is allowed to insert transactions into
    /// `storage`, as transactions must be validated beforehand.
    storage: Arc<Mutex<Storage>>,

    /// Checks and inserts submitted transactions.
    admission: Admission<A, B>,

    /// Verifies proposed blocks.
    verifier: proposal::Verifier<A>,
}

impl<A, B> Mempool<A, B>
where
    A: Service<ante::Request, Response = ante::Response, Error = BoxError> + Clone + Send + 'static,
    A::Future: Send + 'static,
    B: Service<balance::Request, Response = balance::Response, Error = BoxError>
        + Clone
        + Send
        + 'static,
    B::Future: Send + 'static,
{
    /// Returns a new mempool using the `consensus` lane rules and the mempool `config`.
    ///
    /// Returns an error if the lane layout is invalid. Layout errors are
    /// configuration defects, so the node should not start.
    pub fn new(
        consensus: &laneway_consensus::Config,
        config: &Config,
        ante: A,
        balance: B,
    ) -> Result<Self, LaneLayoutError> {
        let rules = Arc::new(LaneRules::new(consensus)?);
        let storage = Arc::new(Mutex::new(Storage::new(rules.clone(), config)));

        tracing::info!(
            lanes = ?rules.lanes().iter().map(|lane| lane.kind).collect::<Vec<_>>(),
            fee_denom = rules.fee_denom(),
            "created mempool",
        );

        Ok(Self {
            admission: Admission::new(rules.clone(), storage.clone(), ante.clone(), balance),
            verifier: proposal::Verifier::new(rules.clone(), ante),
            rules,
            storage,
        })
    }

    /// Returns the lane rules used by this mempool.
    pub fn rules(&self) -> &LaneRules {
        &self.rules
    }

    /// Locks and returns the mempool storage.
    pub fn storage(&self) -> MutexGuard<'_, Storage> {
        self.storage
            .lock()
            .expect("unexpected panic while the mempool lock was held")
    }

    /// Builds an encoded block proposal from the mempool.
    fn prepare_proposal(&self, max_bytes: u64) -> Result<Vec<u8>, BoxError> {
        let budget = self.rules.block_budget();
        let max_bytes = max_bytes.min(budget.max_bytes);

        let transactions = self.storage().select(max_bytes, budget.max_txs as usize);
        let proposal = Proposal::from_transactions(&transactions);

        tracing::info!(
            transactions = proposal.len(),
            bytes = proposal.transaction_bytes(),
            max_bytes,
            "built proposal",
        );

        Ok(proposal.laneway_serialize_to_vec()?)
    }
}

impl<A, B> Service<Request> for Mempool<A, B>
where
    A: Service<ante::Request, Response = ante::Response, Error = BoxError> + Clone + Send + 'static,
    A::Future: Send + 'static,
    B: Service<balance::Request, Response = balance::Response, Error = BoxError>
        + Clone
        + Send
        + 'static,
    B::Future: Send + 'static,
{
    type Response = Response;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The ante and balance services are checked for readiness on each call.
        Poll::Ready(Ok(()))
    }

    /// Call the mempool service.
    ///
    /// Errors are transaction rejections, or failures of the services the
    /// mempool depends on. Invalid proposals are a reject vote, not an error.
    #[instrument(name = "mempool", skip(self, request))]
    fn call(&mut self, request: Request) -> Self::Future {
        match request {
            Request::CheckTx {
                transaction,
                siblings,
            } => self
                .admission
                .clone()
                .check_tx(transaction, siblings)
                .map(|result| {
                    result
                        .map(Response::Accepted)
                        .map_err(BoxError::from)
                })
                .boxed(),

            Request::PrepareProposal { height, max_bytes } => {
                let span = tracing::info_span!("prepare_proposal", %height);
                let response = span
                    .in_scope(|| self.prepare_proposal(max_bytes))
                    .map(Response::Proposal);

                async move { response }.boxed()
            }

            Request::ProcessProposal { height, proposal } => self
                .verifier
                .clone()
                .oneshot(proposal::Request { height, proposal })
                .map(|result| {
                    let vote = match result {
                        Ok(_) => ProposalVote::Accept,
                        Err(error) => ProposalVote::Reject(error.to_string()),
                    };

                    Ok(Response::ProcessProposal(vote))
                })
                .boxed(),

            Request::Commit { height, block } => {
                let mined_ids = block
                    .transactions
                    .iter()
                    .map(|bytes| transaction::Hash::of_bytes(bytes))
                    .collect();

                let mut storage = self.storage();
                let removed = storage.commit(height, &mined_ids);

                tracing::debug!(
                    %height,
                    mined = removed.mined.len(),
                    invalidated = removed.invalidated.len(),
                    remaining = storage.transaction_count(),
                    remaining_bytes = storage.total_serialized_size(),
                    "removed committed transactions",
                );
                drop(storage);

                async move { Ok(Response::Committed(removed)) }.boxed()
            }

            Request::TransactionIds => {
                let response = Response::TransactionIds(self.storage().tx_ids());
                async move { Ok(response) }.boxed()
            }

            Request::TransactionsById(ids) => {
                let response = Response::Transactions(self.storage().transactions(&ids));
                async move { Ok(response) }.boxed()
            }

            Request::RejectedTransactionIds(ids) => {
                let response =
                    Response::RejectedTransactionIds(self.storage().rejected_transactions(ids));
                async move { Ok(response) }.boxed()
            }
        }
    }
}
