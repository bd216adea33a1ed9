//! Fixed test vectors for transactions and bid messages.

use color_eyre::eyre::Result;

use crate::{
    address::Address,
    serialization::{LanewayDeserialize, LanewaySerialize, SerializationError},
    transaction::{Hash, Message, MsgAuctionBid, Transaction, UnminedTx},
};

#[test]
fn bid_message_round_trip() -> Result<()> {
    laneway_test::init();

    let bundle = [Hash([1; 32]), Hash([2; 32])];
    let transaction = Transaction::test_bid(Address::test_address(7), 0, 100, &bundle);

    let bid = MsgAuctionBid::from_message(&transaction.messages[0])?
        .expect("the test bid has the bid message type");

    assert_eq!(bid.bidder, Address::test_address(7));
    assert_eq!(bid.bid, 100);
    assert_eq!(bid.transactions, bundle);

    Ok(())
}

#[test]
fn other_message_types_are_not_bids() -> Result<()> {
    laneway_test::init();

    let transfer = Transaction::test_transfer(Address::test_address(1), 0, 10, 1_000);
    assert_eq!(MsgAuctionBid::from_message(&transfer.messages[0])?, None);

    Ok(())
}

#[test]
fn truncated_bid_payload_is_an_error() {
    laneway_test::init();

    let message = Message {
        type_url: MsgAuctionBid::TYPE_URL.to_string(),
        value: vec![0; 25],
    };

    let result = MsgAuctionBid::from_message(&message);
    assert!(matches!(result, Err(SerializationError::Io(_))));
}

#[test]
fn negative_bids_decode() -> Result<()> {
    laneway_test::init();

    let transaction = Transaction::test_bid(Address::test_address(3), 0, -5, &[Hash([9; 32])]);
    let bid = MsgAuctionBid::from_message(&transaction.messages[0])?
        .expect("the test bid has the bid message type");

    assert_eq!(bid.bid.units(), -5);

    Ok(())
}

#[test]
fn transaction_without_messages_is_rejected() -> Result<()> {
    laneway_test::init();

    let mut transaction = Transaction::test_transfer(Address::test_address(1), 0, 10, 1_000);
    transaction.messages.clear();

    let bytes = transaction.laneway_serialize_to_vec()?;
    let result = Transaction::laneway_deserialize_exact(&bytes);

    assert!(matches!(
        result,
        Err(SerializationError::Parse("transaction has no messages"))
    ));

    Ok(())
}

#[test]
fn signature_count_must_match_signers() -> Result<()> {
    laneway_test::init();

    let mut transaction = Transaction::test_transfer(Address::test_address(1), 0, 10, 1_000);
    transaction.signatures.push(transaction.signatures[0]);

    let bytes = transaction.laneway_serialize_to_vec()?;
    assert!(UnminedTx::from_bytes(bytes).is_err());

    Ok(())
}

#[test]
fn fee_in_other_denom_is_zero() {
    laneway_test::init();

    let mut transaction = Transaction::test_transfer(Address::test_address(1), 0, 10, 1_000);
    assert_eq!(transaction.fee_in("ulane"), 10);

    transaction.fee.denom = "uatom".to_string();
    assert_eq!(transaction.fee_in("ulane"), 0);
}

#[test]
fn garbage_is_a_decode_error() {
    laneway_test::init();

    assert!(UnminedTx::from_bytes(vec![0xff, 0x00, 0x01]).is_err());
    assert!(UnminedTx::from_bytes(Vec::new()).is_err());
}
