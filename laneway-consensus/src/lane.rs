//! Lane assignment and priority order.
//!
//! Lanes are a fixed, ordered set of transaction classes. Each transaction
//! belongs to the first lane whose match rule accepts it, and within a lane,
//! transactions are ordered by a lane-specific priority.
//!
//! These rules are part of the protocol: the block builder and the block
//! verifier both use [`LaneRules`], so a block built by one validator is
//! accepted by every other validator with the same configuration.

use std::{cmp::Ordering, collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use laneway_chain::{
    amount::{Amount, NonNegative},
    transaction::{self, MsgAuctionBid, Transaction, UnminedTx},
};

use crate::{
    auction::{self, AuctionBid},
    config::{AuctionParams, BlockBudget, Config},
    error::{LaneError, LaneLayoutError},
};

#[cfg(test)]
mod tests;

/// The kinds of lane.
///
/// Lanes are a closed set: their match rules and priorities are consensus rules.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    /// Auction bids and their bundles, executed at the top of the block.
    Mev,

    /// Fee-exempt transactions, such as relayer messages.
    Free,

    /// Every other transaction, ordered by fee per unit of gas.
    Default,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LaneKind::Mev => "mev",
            LaneKind::Free => "free",
            LaneKind::Default => "default",
        })
    }
}

/// The priority of a transaction within its lane.
///
/// Priorities are only comparable within a lane. Comparing priorities from
/// different lanes orders them by lane kind.
#[derive(Copy, Clone, Debug)]
pub enum Priority {
    /// The amount bid for the top of the block.
    Bid(Amount<NonNegative>),

    /// The total fee paid.
    Fee(Amount<NonNegative>),

    /// The fee paid per unit of gas.
    FeePerGas {
        /// The total fee paid.
        fee: Amount<NonNegative>,
        /// The transaction's gas limit.
        gas_limit: u64,
    },
}

impl Priority {
    fn rank(&self) -> u8 {
        match self {
            Priority::Bid(_) => 0,
            Priority::Fee(_) => 1,
            Priority::FeePerGas { .. } => 2,
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        use Priority::*;

        match (self, other) {
            (Bid(a), Bid(b)) | (Fee(a), Fee(b)) => a.cmp(b),
            (
                FeePerGas {
                    fee: fee_a,
                    gas_limit: gas_a,
                },
                FeePerGas {
                    fee: fee_b,
                    gas_limit: gas_b,
                },
            ) => {
                // fee_a / gas_a <=> fee_b / gas_b, without rounding.
                // A zero gas limit counts as one unit of gas.
                let gas_a = u128::from((*gas_a).max(1));
                let gas_b = u128::from((*gas_b).max(1));

                (u128::from(*fee_a) * gas_b).cmp(&(u128::from(*fee_b) * gas_a))
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

/// The position of a transaction within a lane.
///
/// Keys sort in lane order: higher priority first, and equal priorities by
/// ascending transaction hash. Ties are never broken by arrival order, which
/// differs between nodes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OrderKey {
    /// The transaction's priority.
    pub priority: Priority,

    /// The transaction's id.
    pub id: transaction::Hash,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A lane in a validated layout.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Lane {
    /// The kind of transactions in this lane.
    pub kind: LaneKind,

    /// The lane's share of block bytes, or zero for no limit.
    pub max_block_space_percent: u8,
}

impl Lane {
    /// Returns the maximum bytes this lane can use in a block of `block_bytes`.
    pub fn max_bytes(&self, block_bytes: u64) -> u64 {
        if self.max_block_space_percent == 0 {
            block_bytes
        } else {
            // Can't overflow: u64 * 100 fits in u128.
            (u128::from(block_bytes) * u128::from(self.max_block_space_percent) / 100) as u64
        }
    }
}

/// The lane a transaction belongs to.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// The lane's index in the layout.
    pub index: usize,

    /// The lane's kind.
    pub kind: LaneKind,

    /// The transaction's position within the lane.
    pub key: OrderKey,

    /// The auction bid, if the transaction is a bid.
    pub bid: Option<AuctionBid>,
}

/// The validated lane layout and the rules for assigning transactions to lanes.
#[derive(Clone, Debug)]
pub struct LaneRules {
    lanes: Vec<Lane>,
    fee_denom: String,
    free_message_types: HashSet<String>,
    auction: AuctionParams,
    block: BlockBudget,
}

impl LaneRules {
    /// Validates `config`, and returns the rules it describes.
    pub fn new(config: &Config) -> Result<Self, LaneLayoutError> {
        if config.lanes.is_empty() {
            return Err(LaneLayoutError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, lane) in config.lanes.iter().enumerate() {
            if !seen.insert(lane.kind) {
                return Err(LaneLayoutError::DuplicateLane(lane.kind));
            }

            if lane.max_block_space_percent > 100 {
                return Err(LaneLayoutError::InvalidBlockSpace {
                    kind: lane.kind,
                    percent: lane.max_block_space_percent,
                });
            }

            match lane.kind {
                LaneKind::Mev if index != 0 => return Err(LaneLayoutError::MevNotFirst),
                LaneKind::Default if index != config.lanes.len() - 1 => {
                    return Err(LaneLayoutError::DefaultNotLast)
                }
                _ => {}
            }
        }

        if !seen.contains(&LaneKind::Default) {
            return Err(LaneLayoutError::MissingDefault);
        }

        if config
            .free_message_types
            .iter()
            .any(|type_url| type_url == MsgAuctionBid::TYPE_URL)
        {
            return Err(LaneLayoutError::FreeBidMessage);
        }

        if config.block.max_bytes == 0 || config.block.max_txs == 0 {
            return Err(LaneLayoutError::EmptyBlockBudget);
        }

        Ok(Self {
            lanes: config
                .lanes
                .iter()
                .map(|lane| Lane {
                    kind: lane.kind,
                    max_block_space_percent: lane.max_block_space_percent,
                })
                .collect(),
            fee_denom: config.fee_denom.clone(),
            free_message_types: config.free_message_types.iter().cloned().collect(),
            auction: config.auction.clone(),
            block: config.block.clone(),
        })
    }

    /// Returns the lanes, in block order.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Returns the index of the lane of `kind`, if it is configured.
    pub fn lane_index(&self, kind: LaneKind) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.kind == kind)
    }

    /// Returns the fee denomination.
    pub fn fee_denom(&self) -> &str {
        &self.fee_denom
    }

    /// Returns the auction parameters.
    pub fn auction(&self) -> &AuctionParams {
        &self.auction
    }

    /// Returns the configured block budget.
    pub fn block_budget(&self) -> &BlockBudget {
        &self.block
    }

    /// Returns `true` if every message in `transaction` is a free message type.
    ///
    /// Transactions without messages are never free.
    pub fn is_free(&self, transaction: &Transaction) -> bool {
        !transaction.messages.is_empty()
            && transaction
                .messages
                .iter()
                .all(|message| self.free_message_types.contains(&message.type_url))
    }

    /// Returns `true` if `transaction` is validated without a minimum fee.
    pub fn is_fee_exempt(&self, transaction: &Transaction) -> bool {
        self.lane_index(LaneKind::Free).is_some() && self.is_free(transaction)
    }

    /// Assigns `tx` to the first lane that matches it.
    ///
    /// Bids only match the mev lane. A malformed bid is an error, even if a
    /// later lane would match it.
    pub fn assign(&self, tx: &UnminedTx) -> Result<Assignment, LaneError> {
        let bid = auction::extract(&tx.transaction)?;

        for (index, lane) in self.lanes.iter().enumerate() {
            let priority = match (lane.kind, &bid) {
                (LaneKind::Mev, Some(bid)) => Priority::Bid(bid.bid),
                (LaneKind::Free, None) if self.is_free(&tx.transaction) => {
                    Priority::Fee(tx.transaction.fee_in(&self.fee_denom))
                }
                (LaneKind::Default, None) => Priority::FeePerGas {
                    fee: tx.transaction.fee_in(&self.fee_denom),
                    gas_limit: tx.gas_limit(),
                },
                _ => continue,
            };

            return Ok(Assignment {
                index,
                kind: lane.kind,
                key: OrderKey {
                    priority,
                    id: tx.id,
                },
                bid,
            });
        }

        Err(LaneError::NoMatchingLane)
    }
}
