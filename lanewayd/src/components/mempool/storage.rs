//! Mempool transaction storage.
//!
//! The main struct [`Storage`] holds the lanes and the recently evicted
//! transactions. [`Storage`] is effectively the data structure of the mempool.
//! Convenient methods to manage it are included.
//!
//! [`Storage`] does not expose a service so it can only be used by other code directly.
//! Only code inside the [`crate::components::mempool`] module has access to it.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use laneway_chain::{
    block::Height,
    transaction::{self, UnminedTx},
    Address,
};
use laneway_consensus::{LaneKind, LaneRules};
use laneway_node_services::consensus::RemovedTransactionIds;

use self::{
    eviction_list::EvictionList,
    lane_set::{LaneSet, Replacement},
};
use super::{config, MempoolError};

pub use self::lane_set::LaneEntry;

#[cfg(test)]
pub mod tests;

mod eviction_list;
mod lane_set;

/// The size limit for the recently evicted list.
///
/// The list is only used to answer rejection queries, so it's fine to
/// forget the oldest evictions.
pub(crate) const MAX_EVICTION_MEMORY_ENTRIES: usize = 40_000;

/// Holds the mempool lanes and recently evicted transactions.
pub struct Storage {
    /// The lane rules, shared with admission and proposal verification.
    rules: Arc<LaneRules>,

    /// One set per configured lane, in lane order.
    lanes: Vec<LaneSet>,

    /// The lane index of every lane entry.
    ///
    /// A transaction is an entry in at most one lane.
    lane_of: HashMap<transaction::Hash, usize>,

    /// The bid that bundles each bundled transaction.
    ///
    /// A transaction is either a lane entry or a bundle member, never both.
    bundled: HashMap<transaction::Hash, transaction::Hash>,

    /// The bid transaction of each bidder with a bid in the mempool.
    bidders: HashMap<Address, transaction::Hash>,

    /// Transactions evicted to make room for higher-priority transactions.
    evicted: EvictionList,

    /// The height of the last committed block, if any.
    tip_height: Option<Height>,
}

impl Drop for Storage {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Storage {
    /// Returns empty storage for the lanes in `rules`, sized by `config`.
    pub(crate) fn new(rules: Arc<LaneRules>, config: &config::Config) -> Self {
        let lanes = rules
            .lanes()
            .iter()
            .map(|lane| match lane.kind {
                LaneKind::Mev => LaneSet::new(
                    LaneKind::Mev,
                    Some(1),
                    None,
                    Replacement::BidIncrement(rules.auction().min_bid_increment),
                ),
                LaneKind::Free => LaneSet::new(
                    LaneKind::Free,
                    config.free_lane.max_txs(),
                    config.free_lane.max_bytes,
                    Replacement::HigherPriority,
                ),
                LaneKind::Default => LaneSet::new(
                    LaneKind::Default,
                    config.default_lane.max_txs(),
                    config.default_lane.max_bytes,
                    Replacement::HigherPriority,
                ),
            })
            .collect();

        Self {
            rules,
            lanes,
            lane_of: HashMap::new(),
            bundled: HashMap::new(),
            bidders: HashMap::new(),
            evicted: EvictionList::new(MAX_EVICTION_MEMORY_ENTRIES, config.eviction_memory_time),
            tip_height: None,
        }
    }

    /// Insert `entry` into the lane at `lane_index`.
    ///
    /// Returns an error if the transaction is already in the mempool, as a lane
    /// entry or in a bundle. Also returns an error if its bidder already has a
    /// bid in the mempool, or if its lane is full of transactions that it
    /// doesn't outrank.
    ///
    /// Bundled transactions that are also lane entries are moved into the bid's
    /// bundle. If inserting this transaction evicts other transactions, they
    /// are added to the recently evicted list.
    pub fn insert(
        &mut self,
        lane_index: usize,
        entry: LaneEntry,
    ) -> Result<transaction::Hash, MempoolError> {
        let tx_id = entry.id();
        let bidder = entry.bid.as_ref().map(|bid| bid.bidder);

        // Security: transactions must not get refreshed by new submissions,
        // because that would let a submitter keep a transaction live forever.
        if self.contains(&tx_id) {
            return Err(MempoolError::DuplicateTx(tx_id));
        }

        if let Some(bidder) = bidder {
            if let Some(existing) = self.bidders.get(&bidder) {
                return Err(MempoolError::DuplicateBidder {
                    bidder,
                    existing: *existing,
                });
            }
        }

        let bundle_ids: Vec<transaction::Hash> = entry.bundle.iter().map(|tx| tx.id).collect();

        let lane = &mut self.lanes[lane_index];
        let kind = lane.kind();
        let evicted = lane.insert(entry).map_err(|_| {
            tracing::debug!(
                ?tx_id,
                lane = %kind,
                lane_len = lane.len(),
                "lane is full, and the transaction does not outrank its entries",
            );

            MempoolError::CapacityExceeded(kind)
        })?;

        self.lane_of.insert(tx_id, lane_index);
        if let Some(bidder) = bidder {
            self.bidders.insert(bidder, tx_id);
        }

        for victim in evicted {
            tracing::info!(
                evicted_id = ?victim.id(),
                ?tx_id,
                lane = %kind,
                "evicted lower-priority transaction from a full lane",
            );

            self.forget(&victim);
            for tx in victim.transactions() {
                // A transaction shared with the new bundle is still live.
                if !bundle_ids.contains(&tx.id) {
                    self.evicted.insert(tx.id);
                }
            }

            metrics::counter!("laneway.mempool.evicted", 1, "lane" => kind.to_string());
        }

        for member_id in bundle_ids {
            if let Some(member_lane) = self.lane_of.get(&member_id).copied() {
                if let Some(member) = self.lanes[member_lane].remove(&member_id) {
                    tracing::debug!(?member_id, bid_id = ?tx_id, "moved lane entry into a bundle");
                    self.forget(&member);
                }
            }

            self.bundled.insert(member_id, tx_id);
        }

        self.update_rejected_metrics();

        Ok(tx_id)
    }

    /// Selects transactions for a block, in lane order.
    ///
    /// Lanes are drained in layout order. Within each lane, entries are taken
    /// in priority order, skipping entries that don't fit the remaining budget.
    /// Each lane is also limited to its share of `max_bytes`.
    ///
    /// A bid and its bundle are never split: either all of them are selected,
    /// or none are. A transaction that was already selected inside a bundle is
    /// skipped in its own lane.
    ///
    /// Selection never mutates the mempool.
    pub fn select(&self, max_bytes: u64, max_txs: usize) -> Vec<UnminedTx> {
        let max_gas = self.rules.block_budget().max_gas.map(u128::from);

        let mut selected = Vec::new();
        let mut included = HashSet::new();
        let mut block_bytes = 0;
        let mut block_gas = 0;

        'lanes: for (lane, lane_set) in self.rules.lanes().iter().zip(&self.lanes) {
            let lane_max_bytes = lane.max_bytes(max_bytes);
            let mut lane_bytes = 0;

            for entry in lane_set.entries() {
                if selected.len() >= max_txs {
                    break 'lanes;
                }

                if entry.transactions().any(|tx| included.contains(&tx.id)) {
                    continue;
                }

                let size = entry.size();
                let gas = entry.gas_limit();

                if selected.len() + entry.transaction_count() > max_txs
                    || block_bytes + size > max_bytes
                    || lane_bytes + size > lane_max_bytes
                    || max_gas.is_some_and(|max| block_gas + gas > max)
                {
                    continue;
                }

                for tx in entry.transactions() {
                    included.insert(tx.id);
                    selected.push(tx.clone());
                }

                block_bytes += size;
                block_gas += gas;
                lane_bytes += size;
            }
        }

        selected
    }

    /// Removes the lane entries with ids in `tx_ids`, and returns the removed ids.
    ///
    /// Ids that aren't in the mempool are ignored, so removing the same ids
    /// twice doesn't change anything the second time.
    pub fn remove(&mut self, tx_ids: &HashSet<transaction::Hash>) -> HashSet<transaction::Hash> {
        let mut removed = HashSet::new();

        for tx_id in tx_ids {
            let Some(lane_index) = self.lane_of.get(tx_id).copied() else {
                continue;
            };

            if let Some(entry) = self.lanes[lane_index].remove(tx_id) {
                self.forget(&entry);
                removed.insert(*tx_id);
            }
        }

        removed
    }

    /// Removes the transactions in a block committed at `height`.
    ///
    /// Also removes bids whose bundles contain a committed transaction, because
    /// those bundles can't be executed again.
    pub fn commit(
        &mut self,
        height: Height,
        mined_ids: &HashSet<transaction::Hash>,
    ) -> RemovedTransactionIds {
        let mined = self.remove(mined_ids);

        let invalidated: Vec<LaneEntry> = self
            .lanes
            .iter_mut()
            .flat_map(|lane| {
                lane.remove_all_that(|entry| {
                    entry.bundle.iter().any(|tx| mined_ids.contains(&tx.id))
                })
            })
            .collect();

        let invalidated = invalidated
            .iter()
            .map(|entry| {
                self.forget(entry);
                entry.id()
            })
            .collect();

        self.tip_height = Some(height);

        RemovedTransactionIds { mined, invalidated }
    }

    /// Removes every transaction and every rejection.
    pub fn clear(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
        self.lane_of.clear();
        self.bundled.clear();
        self.bidders.clear();
        self.evicted.clear();
        self.update_rejected_metrics();
    }

    /// Returns the height that newly admitted transactions are checked at.
    pub fn next_height(&self) -> Height {
        self.tip_height
            .map_or(Height::MIN, |tip| tip.next().unwrap_or(Height::MAX))
    }

    /// Returns `true` if a lane entry or a bundled transaction has id `tx_id`.
    pub fn contains(&self, tx_id: &transaction::Hash) -> bool {
        self.lane_of.contains_key(tx_id) || self.bundled.contains_key(tx_id)
    }

    /// Returns the id of the bid that bundles `tx_id`, if any.
    #[cfg(test)]
    pub fn bundled_by(&self, tx_id: &transaction::Hash) -> Option<transaction::Hash> {
        self.bundled.get(tx_id).copied()
    }

    /// Returns the id of `bidder`'s bid, if it has one in the mempool.
    pub fn bid_from(&self, bidder: &Address) -> Option<transaction::Hash> {
        self.bidders.get(bidder).copied()
    }

    /// Returns the transaction with id `tx_id`, if it is a lane entry or in a bundle.
    pub fn resident(&self, tx_id: &transaction::Hash) -> Option<UnminedTx> {
        if let Some(lane_index) = self.lane_of.get(tx_id) {
            return self.lanes[*lane_index]
                .get(tx_id)
                .map(|entry| entry.transaction.clone());
        }

        let bid_id = self.bundled.get(tx_id)?;
        let lane_index = self.lane_of.get(bid_id)?;

        self.lanes[*lane_index]
            .get(bid_id)?
            .bundle
            .iter()
            .find(|tx| &tx.id == tx_id)
            .cloned()
    }

    /// Returns the ids of all the transactions in the mempool, including bundled transactions.
    pub fn tx_ids(&self) -> HashSet<transaction::Hash> {
        self.all_transactions().map(|tx| tx.id).collect()
    }

    /// Returns the transactions with ids in `tx_ids`.
    pub fn transactions(&self, tx_ids: &HashSet<transaction::Hash>) -> Vec<UnminedTx> {
        let mut seen = HashSet::new();

        self.all_transactions()
            .filter(|tx| tx_ids.contains(&tx.id) && seen.insert(tx.id))
            .cloned()
            .collect()
    }

    /// Returns the ids in `tx_ids` that were recently evicted.
    pub fn rejected_transactions(
        &self,
        tx_ids: HashSet<transaction::Hash>,
    ) -> HashSet<transaction::Hash> {
        tx_ids
            .into_iter()
            .filter(|tx_id| self.evicted.contains_key(tx_id))
            .collect()
    }

    /// Returns the number of lane entries in the mempool.
    ///
    /// A bid and its bundle are one entry.
    pub fn transaction_count(&self) -> usize {
        self.lane_of.len()
    }

    /// Returns the number of entries in the lane of `kind`.
    pub fn lane_len(&self, kind: LaneKind) -> usize {
        self.lanes
            .iter()
            .find(|lane| lane.kind() == kind)
            .map_or(0, LaneSet::len)
    }

    /// Returns the total size of the transactions in the mempool, including bundles.
    pub fn total_serialized_size(&self) -> u64 {
        self.lanes.iter().map(LaneSet::total_bytes).sum()
    }

    /// Returns the lane entries, in lane order.
    pub fn entries(&self) -> impl Iterator<Item = &LaneEntry> + '_ {
        self.lanes.iter().flat_map(|lane| lane.entries())
    }

    fn all_transactions(&self) -> impl Iterator<Item = &UnminedTx> + '_ {
        self.entries().flat_map(|entry| entry.transactions())
    }

    /// Removes the indexes for an entry that was removed from its lane.
    fn forget(&mut self, entry: &LaneEntry) {
        self.lane_of.remove(&entry.id());

        for tx in &entry.bundle {
            if self.bundled.get(&tx.id) == Some(&entry.id()) {
                self.bundled.remove(&tx.id);
            }
        }

        if let Some(bid) = &entry.bid {
            if self.bidders.get(&bid.bidder) == Some(&entry.id()) {
                self.bidders.remove(&bid.bidder);
            }
        }
    }

    /// Update metrics related to the recently evicted list.
    ///
    /// Must be called every time the list changes.
    fn update_rejected_metrics(&mut self) {
        metrics::gauge!(
            "laneway.mempool.rejected.transaction.ids",
            self.evicted.len() as f64
        );
    }
}
