//! User-configurable mempool parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mempool configuration section.
///
/// These settings only affect this node's mempool. Lane order, block space and
/// auction rules are in the consensus section, because every validator must use
/// the same values.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The capacity of the free lane.
    pub free_lane: LaneCapacity,

    /// The capacity of the default lane.
    pub default_lane: LaneCapacity,

    /// The mempool transaction eviction age limit.
    ///
    /// This limits the maximum amount of time evicted transaction IDs stay in
    /// the mempool rejection list. Transactions are evicted when a
    /// higher-priority transaction arrives at a full lane.
    #[serde(with = "humantime_serde")]
    pub eviction_memory_time: Duration,
}

/// The maximum size of a mempool lane.
///
/// The mev lane always holds a single bid, so it isn't configurable.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LaneCapacity {
    /// The maximum number of transactions in the lane, or zero for no limit.
    pub max_txs: usize,

    /// The maximum total size of the transactions in the lane, if any.
    pub max_bytes: Option<u64>,
}

impl LaneCapacity {
    /// Returns the transaction limit, if the lane has one.
    pub fn max_txs(&self) -> Option<usize> {
        (self.max_txs != 0).then_some(self.max_txs)
    }
}

impl Default for LaneCapacity {
    fn default() -> Self {
        Self {
            max_txs: 0,
            max_bytes: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            free_lane: LaneCapacity {
                max_txs: 10,
                max_bytes: None,
            },
            default_lane: LaneCapacity::default(),
            eviction_memory_time: Duration::from_secs(60 * 60),
        }
    }
}
