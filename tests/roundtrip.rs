//! Property tests: round-trip, determinism, prefix and discriminant
//! layout over generated inputs.

use bcschema::{
    enumeration,
    option,
    string,
    u32,
    u64,
    uleb128,
    vector,
    DynBcsType,
    Error,
    Reader,
    Value,
    WriterOptions,
};
use proptest::prelude::*;


proptest! {
    #[test]
    fn u64_round_trips(n in any::<u64>()) {
        let envelope = u64().serialize(&n).unwrap();
        prop_assert_eq!(envelope.to_bytes(), &n.to_le_bytes()[..]);
        prop_assert_eq!(envelope.parse().unwrap(), n);
    }

    #[test]
    fn uleb128_round_trips(n in any::<u32>()) {
        let envelope = uleb128().serialize(&n).unwrap();
        prop_assert!(envelope.to_bytes().len() <= 5);
        prop_assert_eq!(envelope.parse().unwrap(), n);
    }

    #[test]
    fn strings_round_trip(s in ".*") {
        let envelope = string().serialize(&s).unwrap();
        prop_assert_eq!(envelope.parse().unwrap(), s);
    }

    #[test]
    fn options_round_trip(input in proptest::option::of(any::<u32>())) {
        let envelope = option(u32()).serialize(&input).unwrap();
        prop_assert_eq!(envelope.to_bytes()[0], input.is_some() as u8);
        prop_assert_eq!(envelope.parse().unwrap(), input);
    }

    #[test]
    fn vectors_prefix_their_length(v in proptest::collection::vec(any::<u32>(), 0..300)) {
        let envelope = vector(u32()).serialize(&v).unwrap();
        let mut reader = Reader::new(envelope.to_bytes());
        prop_assert_eq!(reader.read_uleb128().unwrap() as usize, v.len());
        prop_assert_eq!(envelope.parse().unwrap(), v);
    }

    #[test]
    fn serialization_is_deterministic(v in proptest::collection::vec(any::<u64>(), 0..50)) {
        let schema = vector(u64());
        let first = schema.serialize(&v).unwrap();
        let second = schema.serialize(&v).unwrap();
        prop_assert_eq!(first.to_bytes(), second.to_bytes());
    }

    #[test]
    fn enum_discriminant_is_the_declaration_index(ord in 0usize..300) {
        let variants: Vec<(String, Option<DynBcsType>)> = (0..300)
            .map(|i| (format!("V{}", i), None))
            .collect();
        let schema = enumeration("Wide", variants);
        let envelope = schema
            .serialize(&Value::enum_of(format!("V{}", ord), Value::Unit))
            .unwrap();
        let mut reader = Reader::new(envelope.to_bytes());
        prop_assert_eq!(reader.read_uleb128().unwrap() as usize, ord);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn writer_capacity_is_a_hard_ceiling(len in 0usize..100, max in 1usize..100) {
        let options = WriterOptions {
            initial_size: 1,
            max_size: Some(max),
            grow_chunk: 7,
        };
        let input = vec![0u8; len];
        // one prefix byte for any length under 128
        let needed = len + 1;
        match vector(bcschema::u8()).serialize_with(&input, options) {
            Ok(envelope) => {
                prop_assert!(needed <= max);
                prop_assert_eq!(envelope.to_bytes().len(), needed);
            }
            Err(Error::Capacity(_)) => prop_assert!(needed > max),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
