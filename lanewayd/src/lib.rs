//! Laneway is a block-building node for chains whose consensus engine calls out
//! to the application to check transactions and to build and vote on blocks.
//!
//! ## Lanes
//!
//! The mempool holds transactions in lanes. Each block is built by taking the
//! lanes in their configured order:
//!
//! 1. the **mev** lane holds the single highest top-of-block auction bid, and
//!    the bundle of transactions the bid pays for,
//! 2. the **free** lane holds fee-exempt relayer transactions, ordered by fee,
//! 3. the **default** lane holds every other transaction, ordered by fee per gas.
//!
//! Every validator checks proposed blocks against the same lane rules, so a
//! proposer can't reorder or insert transactions without being rejected.
//!
//! ## Integration
//!
//! The consensus engine drives the node through the
//! [`components::mempool::Mempool`] service, using the requests in
//! [`laneway_node_services::consensus`]. The application supplies ante
//! validation and balance queries as `tower` services.
//!
//! ## Configuration
//!
//! The command below writes the default `lanewayd.toml` config:
//!
//! ```console
//! lanewayd generate -o lanewayd.toml
//! ```
//!
//! See [`config::LanewaydConfig`] for more information about how to configure Laneway.

#![doc(html_root_url = "https://docs.rs/lanewayd")]
#![allow(clippy::cognitive_complexity)]

#[macro_use]
extern crate tracing;

/// Error type alias to make working with tower traits easier.
///
/// Note: the 'static lifetime bound means that the *type* cannot have any
/// non-'static lifetimes, (e.g., when a type contains a borrow and is
/// parameterized by 'a), *not* that the object itself has 'static lifetime.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub mod commands;
pub mod components;
pub mod config;
