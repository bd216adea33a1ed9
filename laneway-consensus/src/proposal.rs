//! Block proposal verification.
//!
//! Every validator, including the proposer, runs the proposal verifier on every
//! candidate block. A block is accepted if and only if it could have been built
//! from a mempool by an honest proposer using the same lane rules:
//!   - structural checks: decoding, duplicates, and the block budget,
//!   - lane checks: lane order, priority order, bid bundles, and lane block space,
//!   - read-only ante validation of every transaction, in block order.
//!
//! Verification is provided via a `tower::Service`, like the other Laneway
//! services.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::FutureExt;
use tower::{Service, ServiceExt};
use tracing::Instrument;

use laneway_chain::{
    block::{self, Proposal},
    serialization::LanewayDeserialize,
    transaction::{self, UnminedTx},
};
use laneway_node_services::ante;

use crate::{error::ProposalError, lane::LaneRules, BoxError};

pub mod check;

#[cfg(test)]
mod tests;

/// A request to verify a proposed block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    /// The height the block is proposed for.
    pub height: block::Height,

    /// The encoded [`Proposal`].
    pub proposal: Vec<u8>,
}

/// A proposed block that passed verification.
#[derive(Clone, Debug)]
pub struct VerifiedProposal {
    /// The decoded transactions, in block order.
    pub transactions: Vec<UnminedTx>,

    /// The id of the block's auction bid, if it has one.
    pub bid: Option<transaction::Hash>,
}

/// A service that verifies proposed blocks.
#[derive(Clone, Debug)]
pub struct Verifier<A> {
    /// The lane rules shared with the block builder.
    rules: Arc<LaneRules>,

    /// The ante validation service, called in read-only mode.
    ante: A,
}

impl<A> Verifier<A> {
    /// Returns a new proposal verifier using `rules` and `ante`.
    pub fn new(rules: Arc<LaneRules>, ante: A) -> Self {
        Self { rules, ante }
    }
}

impl<A> Service<Request> for Verifier<A>
where
    A: Service<ante::Request, Response = ante::Response, Error = BoxError>
        + Clone
        + Send
        + 'static,
    A::Future: Send + 'static,
{
    type Response = VerifiedProposal;
    type Error = ProposalError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Ante readiness is checked for each transaction.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let rules = self.rules.clone();
        let mut ante = self.ante.clone();
        let span = tracing::info_span!("verify_proposal", height = %request.height);

        async move {
            let height = request.height;
            let proposal = Proposal::laneway_deserialize_exact(&request.proposal)
                .map_err(ProposalError::Decode)?;

            // Since errors cause an early exit, do the quick checks first.
            check::budget_is_valid(&rules, &proposal)?;
            let transactions = check::decode_transactions(&proposal)?;
            check::gas_is_valid(&rules, &transactions)?;
            let bid = check::lane_order_is_valid(&rules, &transactions)?;

            for tx in &transactions {
                let fee_exempt = rules.is_fee_exempt(&tx.transaction);
                let ante_request = ante::Request::simulate(tx.clone(), height, fee_exempt);

                let result = match ante.ready().await {
                    Ok(ante) => ante.call(ante_request).await,
                    Err(error) => Err(error),
                };

                if let Err(source) = result {
                    return Err(ProposalError::Ante {
                        hash: tx.id,
                        source,
                    });
                }
            }

            tracing::trace!(
                transactions = transactions.len(),
                has_bid = bid.is_some(),
                "verified proposal"
            );

            Ok(VerifiedProposal { transactions, bid })
        }
        .instrument(span)
        .inspect(|result| match result {
            Ok(_) => {
                metrics::counter!("laneway.proposal.accepted", 1);
            }
            Err(error) => {
                tracing::warn!(?error, "rejected proposal");
                metrics::counter!("laneway.proposal.rejected", 1);
            }
        })
        .boxed()
    }
}
