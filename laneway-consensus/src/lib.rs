//! Lane and auction rules for Laneway.
//!
//! This crate implements the rules that decide which transactions a block can
//! contain, and in what order:
//!
//! 1. *Lane assignment*: every transaction belongs to the first configured lane
//!    whose match rule accepts it. Auction bids belong to the mev lane,
//!    fee-exempt relayer transactions to the free lane, and everything else to
//!    the default lane.
//!
//! 2. *Priority order*: within a lane, transactions are ordered by a
//!    lane-specific priority, with ties broken by transaction hash.
//!
//! 3. *Auction rules*: a bid must meet the reserve fee, and its bundle must be
//!    complete, in order, free of nested bids, and not front-run other signers.
//!
//! The mempool in `lanewayd` uses these rules to build blocks, and the
//! [`proposal::Verifier`] uses them to check blocks built by other validators.
//! Both sides must use the same rules, or validators would disagree.

#![doc(html_root_url = "https://docs.rs/laneway_consensus")]
#![allow(clippy::try_err)]

pub mod auction;
pub mod config;
pub mod error;
pub mod lane;
pub mod proposal;

pub use config::{AuctionParams, BlockBudget, Config, LaneConfig};
pub use lane::{LaneKind, LaneRules};

/// A boxed [`std::error::Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
