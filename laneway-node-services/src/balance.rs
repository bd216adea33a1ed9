//! Account balance queries.

use laneway_chain::{
    amount::{Amount, NonNegative},
    Address,
};

/// A request to the balance service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    /// The spendable balance of `address` in `denom`, after any escrowed amounts.
    AvailableBalance {
        /// The account to look up.
        address: Address,

        /// The denomination to look up.
        denom: String,
    },
}

/// A response from the balance service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// The balance requested by [`Request::AvailableBalance`].
    AvailableBalance(Amount<NonNegative>),
}
