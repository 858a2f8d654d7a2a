//! Runtime-composable schemas for BCS (Binary Canonical Serialization),
//! the deterministic little-endian binary format of the Diem/Move/Sui
//! ecosystems. A schema is a value built from combinators: it knows how
//! to read its shape out of bytes, how to write it back, what it is
//! called, and how to validate input before a single byte moves. The
//! format carries no type information on the wire beyond enum
//! discriminants, so the same schema has to sit on both ends.
//!
//! Typical usage pattern:
//!
//! - build a schema once from the combinator constructors
//! - call `.serialize(&value)` to get an envelope of bytes that can be
//!   re-encoded as hex/base58/base64 or parsed back
//! - call `.parse(&bytes)` to decode, or `.read(&mut reader)` to decode
//!   a prefix of a larger frame
//! - layer `.transform(...)` over a schema to expose your own domain
//!   type instead of the wire shape
//! - use `lazy` for recursive schemas and [`BcsRegistry`] if you need
//!   the older string-named registry interface
//!
//! The data model supports:
//!
//! - unsigned integers `u8` through `u256` (fixed-width little-endian)
//!   and bare ULEB128 values
//! - `bool`, UTF-8 strings, fixed-size byte blobs
//! - options, vectors, fixed-length arrays, maps
//! - tuples, structs (declaration-ordered named fields), and enums
//!   (tagged unions with ULEB128 discriminants)
//!
//! ```
//! use bcschema::{structure, string, u64, bool, Value};
//!
//! let coin = structure("Coin", vec![
//!     ("value", u64().dynamic()),
//!     ("owner", string().dynamic()),
//!     ("is_locked", bool().dynamic()),
//! ]);
//!
//! let input = Value::struct_of([
//!     ("value", Value::U64(412412400000)),
//!     ("owner", Value::Str("Big Wallet Guy".into())),
//!     ("is_locked", Value::Bool(false)),
//! ]);
//!
//! let bytes = coin.serialize(&input).unwrap();
//! assert_eq!(bytes.to_hex(), "80d1b105600000000e4269672057616c6c65742047757900");
//! assert_eq!(bytes.parse().unwrap(), input);
//! ```

pub mod error;
pub mod value;

mod compound;
mod envelope;
mod primitives;
mod reader;
mod registry;
mod schema;
mod uleb128;
mod writer;

pub use crate::{
    compound::{
        enumeration,
        fixed_array,
        map,
        option,
        structure,
        tuple,
        vector,
    },
    envelope::Serialized,
    error::{
        Error,
        Result,
    },
    primitives::{
        bool,
        bytes,
        string,
        u128,
        u16,
        u256,
        u32,
        u64,
        u8,
        uleb128,
    },
    reader::Reader,
    registry::BcsRegistry,
    schema::{
        lazy,
        BcsType,
        DynBcsType,
    },
    value::{
        EnumValue,
        FromValue,
        IntoValue,
        StructField,
        Value,
    },
    writer::{
        Writer,
        WriterOptions,
    },
};
