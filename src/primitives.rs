//! Primitive schema constructors: the leaves every compound schema is
//! built from.

use crate::{
    error::{
        ensure,
        error,
    },
    schema::BcsType,
    uleb128 as uleb128_mod,
};
use num_bigint::BigUint;


macro_rules! uint_types {
    ($($f:ident($t:ident, $read:ident, $write:ident, $size:expr),)*)=>{$(
        pub fn $f() -> BcsType<$t> {
            BcsType::new(
                stringify!($t),
                |reader| reader.$read(),
                |value: &$t, writer| {
                    writer.$write(*value)?;
                    Ok(())
                },
            )
            .with_serialized_size(|_| Some($size))
        }
    )*};
}

uint_types!(
    u8(u8, read_u8, write_u8, 1),
    u16(u16, read_u16, write_u16, 2),
    u32(u32, read_u32, write_u32, 4),
    u64(u64, read_u64, write_u64, 8),
    u128(u128, read_u128, write_u128, 16),
);

/// 256-bit unsigned integer, carried as a `BigUint`. Inputs of 2^256 or
/// more fail validation before anything is written.
pub fn u256() -> BcsType<BigUint> {
    BcsType::new(
        "u256",
        |reader| reader.read_u256(),
        |value: &BigUint, writer| {
            writer.write_u256(value)?;
            Ok(())
        },
    )
    .with_serialized_size(|_| Some(32))
    .with_validate(|value: &BigUint| {
        ensure!(value.bits() <= 256, Validation, "{} does not fit in a u256", value);
        Ok(())
    })
}

/// One byte, `0x00` or `0x01` only.
pub fn bool() -> BcsType<bool> {
    BcsType::new(
        "bool",
        |reader| match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(error!(Malformed, "{:#04x} is not a valid bool byte", n)),
        },
        |value: &bool, writer| {
            writer.write_u8(*value as u8)?;
            Ok(())
        },
    )
    .with_serialized_size(|_| Some(1))
}

/// A bare ULEB128 value (lengths and tags use this framing implicitly;
/// this schema exposes it as a value in its own right).
pub fn uleb128() -> BcsType<u32> {
    BcsType::new(
        "uleb128",
        |reader| reader.read_uleb128(),
        |value: &u32, writer| {
            writer.write_uleb128(*value)?;
            Ok(())
        },
    )
    .with_serialized_size(|value| Some(uleb128_mod::encoded_len(*value)))
}

/// Fixed-size byte blob: exactly `n` raw bytes, no length prefix.
pub fn bytes(n: usize) -> BcsType<Vec<u8>> {
    BcsType::new(
        format!("bytes[{}]", n),
        move |reader| Ok(reader.read_bytes(n)?.to_vec()),
        |value: &Vec<u8>, writer| {
            writer.write_bytes(value)?;
            Ok(())
        },
    )
    .with_serialized_size(move |_| Some(n))
    .with_validate(move |value: &Vec<u8>| {
        ensure!(
            value.len() == n,
            Validation,
            "expected exactly {} byte(s), got {}",
            n,
            value.len(),
        );
        Ok(())
    })
}

/// UTF-8 string encoded as `vector<u8>` over its bytes. Parsing bytes
/// that are not valid UTF-8 fails.
pub fn string() -> BcsType<String> {
    BcsType::new(
        "string",
        |reader| {
            let len = reader.read_uleb128()? as usize;
            let bytes = reader.read_bytes(len)?;
            String::from_utf8(bytes.to_vec())
                .map_err(|_| error!(Malformed, "string bytes are not valid UTF-8"))
        },
        |value: &String, writer| {
            let bytes = value.as_bytes();
            let len = u32::try_from(bytes.len()).map_err(|_| {
                error!(Validation, "string of {} bytes exceeds u32 length", bytes.len())
            })?;
            writer.write_uleb128(len)?;
            writer.write_bytes(bytes)?;
            Ok(())
        },
    )
    .with_serialized_size(|value: &String| {
        let len = u32::try_from(value.len()).ok()?;
        Some(uleb128_mod::encoded_len(len) + value.len())
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn uints_encode_little_endian_at_fixed_widths() {
        assert_eq!(u8().serialize(&0).unwrap().to_bytes(), [0x00]);
        assert_eq!(u8().serialize(&255).unwrap().to_bytes(), [0xff]);
        assert_eq!(u16().serialize(&0x0201).unwrap().to_bytes(), [0x01, 0x02]);
        assert_eq!(
            u64().serialize(&u64::MAX).unwrap().to_bytes(),
            [0xff; 8],
        );
        assert_eq!(
            u128().serialize(&u128::MAX).unwrap().to_bytes(),
            [0xff; 16],
        );
    }

    #[test]
    fn u256_round_trips_at_the_top_of_its_range() {
        let max = (BigUint::from(1u8) << 256) - 1u8;
        let bytes = u256().serialize(&max).unwrap();
        assert_eq!(bytes.to_bytes(), [0xff; 32]);
        assert_eq!(bytes.parse().unwrap(), max);
    }

    #[test]
    fn u256_rejects_out_of_range_input() {
        let too_big = BigUint::from(1u8) << 256;
        assert!(matches!(
            u256().serialize(&too_big),
            Err(Error::Validation(_)),
        ));
    }

    #[test]
    fn bool_parses_only_zero_and_one() {
        assert!(!bool().parse(&[0x00]).unwrap());
        assert!(bool().parse(&[0x01]).unwrap());
        assert!(matches!(
            bool().parse(&[0x02]),
            Err(Error::Malformed(_)),
        ));
    }

    #[test]
    fn bytes_validates_exact_length() {
        let blob = bytes(3);
        assert_eq!(
            blob.serialize(&vec![1, 2, 3]).unwrap().to_bytes(),
            [1u8, 2, 3],
        );
        assert!(matches!(
            blob.serialize(&vec![1, 2]),
            Err(Error::Validation(_)),
        ));
        assert!(matches!(
            blob.serialize(&vec![1, 2, 3, 4]),
            Err(Error::Validation(_)),
        ));
    }

    #[test]
    fn strings_are_uleb_prefixed_utf8() {
        let s = string();
        let empty = s.serialize(&String::new()).unwrap();
        assert_eq!(empty.to_bytes(), [0x00]);

        let multibyte = "çå∞≠¢õß∂ƒ∫".to_string();
        let bytes = s.serialize(&multibyte).unwrap();
        assert_eq!(bytes.to_bytes()[0] as usize, multibyte.len());
        assert_eq!(bytes.parse().unwrap(), multibyte);
    }

    #[test]
    fn string_parse_rejects_invalid_utf8() {
        // two bytes of payload, 0xff 0xfe is not UTF-8
        assert!(matches!(
            string().parse(&[0x02, 0xff, 0xfe]),
            Err(Error::Malformed(_)),
        ));
    }

    #[test]
    fn uleb128_schema_sizes_itself() {
        assert_eq!(uleb128().serialized_size(&127), Some(1));
        assert_eq!(uleb128().serialized_size(&128), Some(2));
        assert_eq!(
            uleb128().serialize(&1000).unwrap().to_bytes(),
            [0xe8, 0x07],
        );
    }
}
