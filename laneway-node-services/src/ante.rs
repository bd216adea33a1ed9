//! Ante validation requests and responses.
//!
//! The ante service checks signatures, sequence numbers, and fee sufficiency.
//! It is implemented by the application, and its errors are returned to the
//! submitter unchanged.

use laneway_chain::{block, transaction::UnminedTx};

/// Whether an ante check may commit its state changes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Admission into the mempool. Sequence numbers and fee deductions are
    /// tracked in the application's check state.
    Check,

    /// Read-only validation of a proposed block. Nothing is committed.
    Simulate,
}

/// A request to validate a single transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    /// The transaction to validate.
    pub transaction: UnminedTx,

    /// Whether the check may commit state.
    pub mode: Mode,

    /// The height of the block this transaction is being validated for.
    pub height: block::Height,

    /// `true` if the transaction belongs to a fee-exempt lane, and must not be
    /// rejected for paying too little fee.
    pub fee_exempt: bool,
}

impl Request {
    /// Returns a mempool admission request for `transaction`.
    pub fn check(transaction: UnminedTx, height: block::Height, fee_exempt: bool) -> Self {
        Self {
            transaction,
            mode: Mode::Check,
            height,
            fee_exempt,
        }
    }

    /// Returns a read-only proposal validation request for `transaction`.
    pub fn simulate(transaction: UnminedTx, height: block::Height, fee_exempt: bool) -> Self {
        Self {
            transaction,
            mode: Mode::Simulate,
            height,
            fee_exempt,
        }
    }
}

/// A successful ante validation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// The transaction is valid, and would use at most `gas_wanted` gas.
    Valid {
        /// The gas the transaction asked for.
        gas_wanted: u64,
    },
}
