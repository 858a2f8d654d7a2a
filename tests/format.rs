//! Golden wire-format tests: exact byte layouts checked against the
//! reference BCS encodings.

use bcschema::{
    bool,
    bytes,
    enumeration,
    fixed_array,
    lazy,
    option,
    string,
    structure,
    tuple,
    u256,
    u64,
    u8,
    vector,
    DynBcsType,
    Error,
    Value,
    WriterOptions,
};
use num_bigint::BigUint;


#[test]
fn u64_encodes_little_endian() {
    let bytes = u64().serialize(&1311768467750121216).unwrap();
    assert_eq!(bytes.to_hex(), "00efcdab78563412");
    assert_eq!(bytes.parse().unwrap(), 1311768467750121216);
}

#[test]
fn thousand_byte_vector_has_two_byte_prefix() {
    let input = vec![0xffu8; 1000];
    let bytes = vector(u8()).serialize(&input).unwrap();
    let out = bytes.to_bytes();
    assert_eq!(out.len(), 1002);
    assert_eq!(&out[..2], [0xe8, 0x07]);
    assert!(out[2..].iter().all(|&b| b == 0xff));
    assert_eq!(bytes.parse().unwrap(), input);
}

#[test]
fn coin_struct_matches_reference_encoding() {
    let coin = structure("Coin", vec![
        ("value", u64().dynamic()),
        ("owner", string().dynamic()),
        ("is_locked", bool().dynamic()),
    ]);
    let input = Value::struct_of([
        ("value", Value::U64(412412400000)),
        ("owner", Value::Str("Big Wallet Guy".into())),
        ("is_locked", Value::Bool(false)),
    ]);
    let bytes = coin.serialize(&input).unwrap();
    assert_eq!(
        bytes.to_hex(),
        "80d1b105600000000e4269672057616c6c65742047757900",
    );
    assert_eq!(bytes.parse().unwrap(), input);
}

#[test]
fn enum_variant_encodes_declaration_index_and_payload() {
    let schema = enumeration("E", vec![
        ("Variant0", Some(bcschema::u16().dynamic())),
        ("Variant1", Some(u8().dynamic())),
        ("Variant2", Some(string().dynamic())),
    ]);
    let bytes = schema
        .serialize(&Value::enum_of("Variant2", Value::Str("hello".into())))
        .unwrap();
    assert_eq!(bytes.to_hex(), "020568656c6c6f");
}

#[test]
fn fixed_array_of_options_matches_reference_encoding() {
    let schema = fixed_array(3, option(u8()));
    let input = vec![Some(1), None, Some(3)];
    let bytes = schema.serialize(&input).unwrap();
    assert_eq!(bytes.to_hex(), "0101000103");
    assert_eq!(bytes.parse().unwrap(), input);
}

#[test]
fn tuple_of_options_matches_reference_encoding() {
    let schema = tuple(vec![option(u8()).dynamic(), option(u8()).dynamic()]);
    let input = Value::Tuple(vec![Value::none(), Value::some(Value::U8(1))]);
    let bytes = schema.serialize(&input).unwrap();
    assert_eq!(bytes.to_hex(), "000101");
    assert_eq!(bytes.parse().unwrap(), input);
}

#[test]
fn unsigned_boundaries_round_trip() {
    assert_eq!(u8().serialize(&0).unwrap().to_bytes(), [0x00]);
    assert_eq!(u8().serialize(&255).unwrap().to_bytes(), [0xff]);
    assert_eq!(u64().serialize(&0).unwrap().to_bytes(), [0; 8]);
    assert_eq!(u64().serialize(&u64::MAX).unwrap().to_bytes(), [0xff; 8]);
    assert_eq!(
        bcschema::u128().serialize(&u128::MAX).unwrap().to_bytes(),
        [0xff; 16],
    );
    let u256_max = (BigUint::from(1u8) << 256) - 1u8;
    let envelope = u256().serialize(&u256_max).unwrap();
    assert_eq!(envelope.to_bytes(), [0xff; 32]);
    assert_eq!(envelope.parse().unwrap(), u256_max);
}

#[test]
fn range_checks_fire_before_any_byte_is_written() {
    assert!(matches!(
        u256().serialize(&(BigUint::from(1u8) << 256)),
        Err(Error::Validation(_)),
    ));
    assert!(matches!(
        bytes(4).serialize(&vec![1, 2, 3]),
        Err(Error::Validation(_)),
    ));
    assert!(matches!(
        fixed_array(2, u8()).serialize(&vec![1, 2, 3]),
        Err(Error::Validation(_)),
    ));
}

#[test]
fn capacity_bound_is_enforced() {
    let schema = vector(u8());
    let input = vec![0u8; 100];
    let options = WriterOptions {
        initial_size: 16,
        max_size: Some(64),
        grow_chunk: 16,
    };
    assert!(matches!(
        schema.serialize_with(&input, options),
        Err(Error::Capacity(_)),
    ));

    let generous = WriterOptions {
        initial_size: 16,
        max_size: Some(256),
        grow_chunk: 16,
    };
    let bytes = schema.serialize_with(&input, generous).unwrap();
    assert_eq!(bytes.to_bytes().len(), 101);
}

#[test]
fn serialization_is_deterministic() {
    let schema = structure("S", vec![
        ("a", vector(u8()).dynamic()),
        ("b", option(string()).dynamic()),
    ]);
    let input = Value::struct_of([
        ("a", Value::Seq(vec![Value::U8(9), Value::U8(8)])),
        ("b", Value::some(Value::Str("x".into()))),
    ]);
    let first = schema.serialize(&input).unwrap();
    let second = schema.serialize(&input).unwrap();
    assert_eq!(first.to_bytes(), second.to_bytes());
}

#[test]
fn empty_string_and_multibyte_string_round_trip() {
    assert_eq!(string().serialize(&String::new()).unwrap().to_bytes(), [0x00]);

    let s = "çå∞≠¢õß∂ƒ∫".to_string();
    let envelope = string().serialize(&s).unwrap();
    assert_eq!(envelope.parse().unwrap(), s);
}

#[test]
fn deeply_nested_options_round_trip() {
    let schema = option(vector(option(u8())));
    for input in [
        None,
        Some(vec![]),
        Some(vec![None, Some(0), Some(255)]),
    ] {
        let envelope = schema.serialize(&input).unwrap();
        assert_eq!(envelope.parse().unwrap(), input);
    }
}

fn tree_schema() -> DynBcsType {
    structure("Tree", vec![
        ("label", u8().dynamic()),
        ("children", vector(lazy(tree_schema)).dynamic()),
    ])
}

fn node(label: u8, children: Vec<Value>) -> Value {
    Value::struct_of([
        ("label", Value::U8(label)),
        ("children", Value::Seq(children)),
    ])
}

#[test]
fn recursive_schema_through_lazy() {
    let schema = tree_schema();
    let input = node(1, vec![
        node(2, vec![]),
        node(3, vec![node(4, vec![])]),
    ]);
    let envelope = schema.serialize(&input).unwrap();
    assert_eq!(
        envelope.to_bytes(),
        [0x01, 0x02, 0x02, 0x00, 0x03, 0x01, 0x04, 0x00],
    );
    assert_eq!(envelope.parse().unwrap(), input);
}

#[test]
fn trailing_bytes_are_rejected_by_parse() {
    assert!(matches!(
        u8().parse(&[0x01, 0x02]),
        Err(Error::Malformed(_)),
    ));
}

#[test]
fn short_input_is_rejected() {
    assert!(matches!(
        u64().parse(&[0x01, 0x02]),
        Err(Error::ShortBuffer { .. }),
    ));
    // vector claims 3 elements but carries 1
    assert!(matches!(
        vector(u8()).parse(&[0x03, 0x01]),
        Err(Error::ShortBuffer { .. }),
    ));
}
