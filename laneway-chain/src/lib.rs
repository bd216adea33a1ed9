//! Core data structures for Laneway: amounts, addresses, transactions, and
//! block proposals, with their canonical encodings.
#![doc(html_root_url = "https://docs.rs/laneway_chain")]
#![deny(missing_docs)]

pub mod address;
pub mod amount;
pub mod block;
pub mod serialization;
pub mod transaction;

pub use address::Address;
