//! The set of transactions held by one mempool lane.

use std::{
    collections::{BTreeMap, HashMap},
    iter,
};

use laneway_chain::{
    amount::{Amount, NonNegative},
    transaction::{self, UnminedTx},
};
use laneway_consensus::{auction::AuctionBid, lane::OrderKey, LaneKind};


/// A transaction in a lane, with its auction bundle if it is a bid.
#[derive(Clone, Debug)]
pub struct LaneEntry {
    /// The transaction's position in the lane.
    pub key: OrderKey,

    /// The transaction.
    pub transaction: UnminedTx,

    /// The auction bid, for entries in the mev lane.
    pub bid: Option<AuctionBid>,

    /// The bundled transactions, in execution order.
    ///
    /// Empty unless the entry is a bid.
    pub bundle: Vec<UnminedTx>,
}

impl LaneEntry {
    /// Returns the id of the entry's transaction.
    pub fn id(&self) -> transaction::Hash {
        self.transaction.id
    }

    /// Returns the entry's transactions, in block order.
    pub fn transactions(&self) -> impl Iterator<Item = &UnminedTx> + '_ {
        iter::once(&self.transaction).chain(self.bundle.iter())
    }

    /// Returns the number of transactions in the entry.
    pub fn transaction_count(&self) -> usize {
        1 + self.bundle.len()
    }

    /// Returns the total size of the entry's transactions.
    pub fn size(&self) -> u64 {
        self.transactions().map(|tx| tx.size as u64).sum()
    }

    /// Returns the total gas limit of the entry's transactions.
    pub fn gas_limit(&self) -> u128 {
        self.transactions()
            .map(|tx| u128::from(tx.gas_limit()))
            .sum()
    }
}

/// When a new entry can take the place of an entry already in a full lane.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Replacement {
    /// The new entry must have a strictly higher priority.
    HigherPriority,

    /// The new bid must be higher, by at least this increment.
    BidIncrement(Amount<NonNegative>),
}

/// The new entry doesn't fit in the lane, and doesn't outrank enough of its
/// entries to make room.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LaneFull;

/// A bounded set of lane entries, in lane priority order.
pub struct LaneSet {
    /// The kind of lane.
    kind: LaneKind,

    /// The entries, in lane order.
    entries: BTreeMap<OrderKey, LaneEntry>,

    /// The order key of each entry's transaction.
    keys: HashMap<transaction::Hash, OrderKey>,

    /// The total size of the entries, including bundles.
    total_bytes: u64,

    /// The maximum number of entries.
    max_entries: Option<usize>,

    /// The maximum total size of the entries.
    max_bytes: Option<u64>,

    /// The rule for replacing entries when the lane is full.
    replacement: Replacement,
}

impl Drop for LaneSet {
    fn drop(&mut self) {
        // zero the metrics on drop
        self.clear()
    }
}

impl LaneSet {
    /// Returns an empty lane of `kind`.
    pub fn new(
        kind: LaneKind,
        max_entries: Option<usize>,
        max_bytes: Option<u64>,
        replacement: Replacement,
    ) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
            keys: HashMap::new(),
            total_bytes: 0,
            max_entries,
            max_bytes,
            replacement,
        }
    }

    /// Returns the kind of lane.
    pub fn kind(&self) -> LaneKind {
        self.kind
    }

    /// Returns the number of entries in the lane.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the lane has no entries.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total size of the entries in the lane.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns `true` if an entry's transaction has id `id`.
    ///
    /// Bundled transactions are not entries.
    #[cfg(test)]
    pub fn contains(&self, id: &transaction::Hash) -> bool {
        self.keys.contains_key(id)
    }

    /// Returns the entry whose transaction has id `id`.
    pub fn get(&self, id: &transaction::Hash) -> Option<&LaneEntry> {
        self.keys.get(id).and_then(|key| self.entries.get(key))
    }

    /// Returns the entries in lane order: highest priority first.
    ///
    /// Iteration never mutates the lane.
    pub fn entries(&self) -> impl Iterator<Item = &LaneEntry> + '_ {
        self.entries.values()
    }

    /// Inserts `entry`, evicting lower-priority entries if the lane is full.
    ///
    /// Returns the evicted entries. Entries are only evicted if `entry` outranks
    /// them, and evicting them makes room for `entry`. Otherwise, the lane is
    /// unchanged.
    ///
    /// The caller must check that the transaction isn't already in the lane.
    pub fn insert(&mut self, entry: LaneEntry) -> Result<Vec<LaneEntry>, LaneFull> {
        let size = entry.size();

        if self.max_bytes.is_some_and(|max| size > max) {
            return Err(LaneFull);
        }

        let mut count = self.entries.len() + 1;
        let mut bytes = self.total_bytes + size;
        let mut victims = Vec::new();

        // Lowest priority first
        for (key, incumbent) in self.entries.iter().rev() {
            if self.fits(count, bytes) {
                break;
            }

            if !self.outranks(&entry, incumbent) {
                return Err(LaneFull);
            }

            victims.push(*key);
            count -= 1;
            bytes -= incumbent.size();
        }

        if !self.fits(count, bytes) {
            return Err(LaneFull);
        }

        let evicted = victims
            .iter()
            .filter_map(|key| self.remove_key(key))
            .collect();

        self.total_bytes += size;
        self.keys.insert(entry.id(), entry.key);
        self.entries.insert(entry.key, entry);

        self.update_metrics();

        Ok(evicted)
    }

    /// Removes the entry whose transaction has id `id`, if there is one.
    pub fn remove(&mut self, id: &transaction::Hash) -> Option<LaneEntry> {
        let key = *self.keys.get(id)?;
        let removed = self.remove_key(&key);

        self.update_metrics();

        removed
    }

    /// Removes all entries that match `predicate`, and returns them.
    pub fn remove_all_that(
        &mut self,
        predicate: impl Fn(&LaneEntry) -> bool,
    ) -> Vec<LaneEntry> {
        let keys: Vec<OrderKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(key, _)| *key)
            .collect();

        let removed = keys
            .iter()
            .filter_map(|key| self.remove_key(key))
            .collect();

        self.update_metrics();

        removed
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
        self.total_bytes = 0;
        self.update_metrics();
    }

    fn remove_key(&mut self, key: &OrderKey) -> Option<LaneEntry> {
        let entry = self.entries.remove(key)?;

        self.keys.remove(&entry.id());
        self.total_bytes -= entry.size();

        Some(entry)
    }

    /// Returns `true` if `count` entries of `bytes` total size fit in the lane.
    fn fits(&self, count: usize, bytes: u64) -> bool {
        self.max_entries.map_or(true, |max| count <= max)
            && self.max_bytes.map_or(true, |max| bytes <= max)
    }

    /// Returns `true` if `new` can replace `incumbent`.
    ///
    /// Equal priorities never replace each other: the first entry admitted stays.
    fn outranks(&self, new: &LaneEntry, incumbent: &LaneEntry) -> bool {
        match self.replacement {
            Replacement::HigherPriority => new.key.priority > incumbent.key.priority,
            Replacement::BidIncrement(increment) => match (&new.bid, &incumbent.bid) {
                (Some(new), Some(incumbent)) => {
                    new.bid > incumbent.bid
                        && (incumbent.bid + increment).is_ok_and(|minimum| new.bid >= minimum)
                }
                _ => false,
            },
        }
    }

    /// Update metrics related to the lane.
    ///
    /// Must be called every time the lane changes.
    fn update_metrics(&self) {
        let lane = self.kind.to_string();

        metrics::gauge!(
            "laneway.mempool.lane.transactions",
            self.entries.len() as f64,
            "lane" => lane.clone()
        );
        metrics::gauge!(
            "laneway.mempool.lane.bytes",
            self.total_bytes as f64,
            "lane" => lane
        );
    }
}
