//! Fixed test vectors for the canonical encoding rules.

use std::io::Cursor;

use color_eyre::eyre::Result;

use crate::serialization::{
    LanewayDeserialize, LanewayDeserializeInto, ReadLanewayExt, SerializationError,
    MAX_PROTOCOL_MESSAGE_LEN,
};

#[test]
fn non_canonical_compactsize_is_rejected() {
    laneway_test::init();

    for bytes in [
        &b"\xfd\xfc\x00"[..],
        &b"\xfe\xff\xff\x00\x00"[..],
        &b"\xff\xff\xff\xff\xff\x00\x00\x00\x00"[..],
    ] {
        let result = Cursor::new(bytes).read_compactsize();
        assert!(
            matches!(result, Err(SerializationError::Parse(_))),
            "unexpected result for {bytes:?}: {result:?}",
        );
    }
}

#[test]
fn oversized_compactsize_is_rejected() {
    laneway_test::init();

    let mut bytes = vec![0xfe];
    bytes.extend(((MAX_PROTOCOL_MESSAGE_LEN + 1) as u32).to_le_bytes());

    assert!(Cursor::new(bytes).read_compactsize().is_err());
}

#[test]
fn truncated_bytes_are_io_errors() -> Result<()> {
    laneway_test::init();

    // Claims 3 bytes, but only has 2.
    let result: Result<Vec<u8>, _> = Cursor::new(b"\x03ab").laneway_deserialize_into();
    assert!(matches!(result, Err(SerializationError::Io(_))));

    let bytes: Vec<u8> = Cursor::new(b"\x02ab").laneway_deserialize_into()?;
    assert_eq!(bytes, b"ab");

    Ok(())
}

#[test]
fn invalid_utf8_is_rejected() {
    laneway_test::init();

    let result = String::laneway_deserialize_exact(b"\x02\xc3\x28");
    assert!(matches!(result, Err(SerializationError::Parse("invalid utf-8"))));
}

#[test]
fn nested_byte_vectors() -> Result<()> {
    laneway_test::init();

    let nested: Vec<Vec<u8>> = Vec::laneway_deserialize_exact(b"\x02\x01a\x00")?;
    assert_eq!(nested, vec![b"a".to_vec(), Vec::new()]);

    Ok(())
}
