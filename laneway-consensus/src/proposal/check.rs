//! Consensus check functions for proposed blocks.
//!
//! These checks only depend on the block and the lane rules, never on the
//! verifying node's mempool, so every validator reaches the same verdict.

use std::collections::HashSet;

use laneway_chain::{
    block::Proposal,
    transaction::{self, UnminedTx},
};

use crate::{
    error::{OrderingViolation, ProposalError},
    lane::{LaneKind, LaneRules, OrderKey},
};

/// Checks the transaction count and byte size of `proposal` against the
/// configured block budget.
pub fn budget_is_valid(rules: &LaneRules, proposal: &Proposal) -> Result<(), ProposalError> {
    let budget = rules.block_budget();

    if proposal.len() > budget.max_txs as usize {
        return Err(ProposalError::TooManyTransactions {
            actual: proposal.len(),
            max: budget.max_txs,
        });
    }

    let bytes = proposal.transaction_bytes() as u64;
    if bytes > budget.max_bytes {
        return Err(ProposalError::TooManyBytes {
            actual: bytes,
            max: budget.max_bytes,
        });
    }

    Ok(())
}

/// Decodes every transaction in `proposal`, and checks that no transaction
/// appears twice.
pub fn decode_transactions(proposal: &Proposal) -> Result<Vec<UnminedTx>, ProposalError> {
    let mut seen = HashSet::with_capacity(proposal.len());

    proposal
        .transactions
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            let tx = UnminedTx::from_bytes(bytes.as_slice())
                .map_err(|source| ProposalError::TransactionDecode { index, source })?;

            if !seen.insert(tx.id) {
                return Err(ProposalError::DuplicateTransaction(tx.id));
            }

            Ok(tx)
        })
        .collect()
}

/// Checks the total gas limit of `transactions`, if the block budget limits gas.
pub fn gas_is_valid(rules: &LaneRules, transactions: &[UnminedTx]) -> Result<(), ProposalError> {
    let Some(max) = rules.block_budget().max_gas else {
        return Ok(());
    };

    let actual: u128 = transactions
        .iter()
        .map(|tx| u128::from(tx.gas_limit()))
        .sum();

    if actual > u128::from(max) {
        return Err(ProposalError::TooMuchGas { actual, max });
    }

    Ok(())
}

/// Checks that `transactions` are in lane order, and returns the id of the
/// auction bid, if there is one.
///
/// A block built from the mempool is the concatenation of each lane's
/// transactions, in layout order. So:
/// - lanes never go backwards,
/// - within a lane, order keys strictly increase (priority strictly decreases,
///   with ties broken by ascending hash),
/// - a bid is immediately followed by its complete bundle, in bundle order,
/// - there is at most one bid,
/// - each lane stays within its share of block space.
pub fn lane_order_is_valid(
    rules: &LaneRules,
    transactions: &[UnminedTx],
) -> Result<Option<transaction::Hash>, ProposalError> {
    let block_bytes = rules.block_budget().max_bytes;

    let mut current_lane: Option<(usize, LaneKind)> = None;
    let mut previous_key: Option<OrderKey> = None;
    let mut lane_bytes: u64 = 0;
    let mut bid_id = None;

    let mut position = 0;
    while position < transactions.len() {
        let tx = &transactions[position];
        let assignment = rules
            .assign(tx)
            .map_err(|source| ProposalError::Lane { hash: tx.id, source })?;

        if assignment.bid.is_some() && bid_id.is_some() {
            return Err(OrderingViolation::MultipleBids(tx.id).into());
        }

        match current_lane {
            Some((index, kind)) if assignment.index < index => {
                return Err(OrderingViolation::LaneOrder {
                    hash: tx.id,
                    found: assignment.kind,
                    after: kind,
                }
                .into());
            }
            Some((index, _)) if assignment.index == index => {
                if previous_key.is_some_and(|previous| assignment.key <= previous) {
                    return Err(OrderingViolation::PriorityOrder {
                        hash: tx.id,
                        kind: assignment.kind,
                    }
                    .into());
                }
            }
            _ => {
                current_lane = Some((assignment.index, assignment.kind));
                previous_key = None;
                lane_bytes = 0;
            }
        }

        let mut entry_bytes = tx.size as u64;
        let mut entry_len = 1;

        if let Some(bid) = &assignment.bid {
            let auction = rules.auction();
            let bundle_end = (position + 1 + bid.bundle.len()).min(transactions.len());
            let bundle = &transactions[position + 1..bundle_end];

            auction
                .check_bid(bid)
                .and_then(|()| auction.check_bundle(bid, bundle))
                .map_err(|source| ProposalError::Bid { hash: tx.id, source })?;

            entry_bytes += bundle.iter().map(|tx| tx.size as u64).sum::<u64>();
            entry_len += bundle.len();
            bid_id = Some(tx.id);
        }

        lane_bytes += entry_bytes;
        let max = rules.lanes()[assignment.index].max_bytes(block_bytes);
        if lane_bytes > max {
            return Err(ProposalError::LaneSpaceExceeded {
                kind: assignment.kind,
                actual: lane_bytes,
                max,
            });
        }

        previous_key = Some(assignment.key);
        position += entry_len;
    }

    Ok(bid_id)
}
