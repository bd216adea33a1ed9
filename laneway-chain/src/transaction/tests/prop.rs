//! Randomised property tests for transactions.

use proptest::prelude::*;

use crate::{
    serialization::{LanewayDeserialize, LanewaySerialize},
    transaction::{Hash, Transaction, UnminedTx},
};

proptest! {
    /// The canonical encoding decodes to the same transaction, with the same hash.
    #[test]
    fn transaction_has_one_encoding(transaction in any::<Transaction>()) {
        laneway_test::init();

        let bytes = transaction.laneway_serialize_to_vec()?;
        let unmined = UnminedTx::from_bytes(bytes.clone())?;

        prop_assert_eq!(unmined.transaction.as_ref(), &transaction);
        prop_assert_eq!(unmined.id, transaction.hash());
        prop_assert_eq!(unmined.size, bytes.len());
        prop_assert_eq!(unmined.size, transaction.laneway_serialized_size());
    }

    /// Appending data to a transaction always makes it invalid.
    #[test]
    fn trailing_data_is_rejected(transaction in any::<Transaction>(), extra in any::<u8>()) {
        laneway_test::init();

        let mut bytes = transaction.laneway_serialize_to_vec()?;
        bytes.push(extra);

        prop_assert!(Transaction::laneway_deserialize_exact(&bytes).is_err());
    }

    /// Transactions that differ in any field have different hashes.
    #[test]
    fn memo_changes_hash(transaction in any::<Transaction>()) {
        laneway_test::init();

        let mut other = transaction.clone();
        other.memo.push('!');

        prop_assert_ne!(Hash::from(&transaction), Hash::from(&other));
    }
}
