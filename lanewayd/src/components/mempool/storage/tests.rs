//! Tests and test utility functions for mempool storage.

use std::sync::Arc;

use laneway_chain::transaction::{self, Transaction, UnminedTx};
use laneway_consensus::{Config, LaneRules};

use super::{LaneEntry, MempoolError, Storage};
use crate::components::mempool::config;


/// Returns validated lane rules for `config`.
pub fn rules(config: &Config) -> Arc<LaneRules> {
    Arc::new(LaneRules::new(config).expect("test lane layouts are valid"))
}

/// Returns empty storage using the default lane rules and mempool config.
pub fn default_storage() -> Storage {
    Storage::new(rules(&Config::default()), &config::Config::default())
}

/// Returns the lane index and lane entry for `transaction`.
///
/// `bundle` must be empty unless `transaction` is a bid.
pub fn lane_entry(
    rules: &LaneRules,
    transaction: impl Into<UnminedTx>,
    bundle: Vec<UnminedTx>,
) -> (usize, LaneEntry) {
    let transaction = transaction.into();
    let assignment = rules
        .assign(&transaction)
        .expect("test transactions match a lane");

    let entry = LaneEntry {
        key: assignment.key,
        transaction,
        bid: assignment.bid,
        bundle,
    };

    (assignment.index, entry)
}

/// Inserts `transaction` and its `bundle` into `storage`, skipping admission checks.
pub fn insert(
    storage: &mut Storage,
    transaction: Transaction,
    bundle: Vec<UnminedTx>,
) -> Result<transaction::Hash, MempoolError> {
    let rules = storage.rules.clone();
    let (lane_index, entry) = lane_entry(&rules, transaction, bundle);

    storage.insert(lane_index, entry)
}
