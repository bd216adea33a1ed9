//! The interfaces of the services around the Laneway mempool.
//!
//! - [`consensus`]: the callbacks the external consensus engine makes into the node,
//! - [`ante`]: per-transaction validity checks, provided by the application,
//! - [`balance`]: account balance queries, used to check auction bids.

pub mod ante;
pub mod balance;
pub mod consensus;

/// Error type alias to make working with tower traits easier.
///
/// Note: the 'static lifetime bound means that the *type* cannot have any
/// non-'static lifetimes, (e.g., when a type contains a borrow and is
/// parameterized by 'a), *not* that the object itself has 'static lifetime.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
