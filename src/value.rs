//! Dynamic representation of data within the BCS data model, the currency
//! of the heterogeneous schemas (tuple, struct, enum) and of the registry
//! facade.

use crate::error::{
    Result,
    ensure,
    bail,
};
use num_bigint::BigUint;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Unit,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(BigUint),
    Bytes(Vec<u8>),
    Str(String),
    Option(Option<Box<Value>>),
    /// Homogeneous sequence (vectors, fixed arrays, maps-as-pair-lists).
    Seq(Vec<Value>),
    /// Heterogeneous positional sequence.
    Tuple(Vec<Value>),
    /// Fields in declaration order.
    Struct(Vec<StructField>),
    Enum(EnumValue),
}

/// Item in `Value::Struct`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub value: Value,
}

/// Item in `Value::Enum`. `variant_ord` is filled in when parsing; on
/// write the variant is resolved by name against the schema's declaration
/// order and any ord supplied here is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub variant_ord: usize,
    pub variant_name: String,
    pub value: Box<Value>,
}

impl Value {
    /// Short label for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::U256(_) => "u256",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::Option(_) => "option",
            Value::Seq(_) => "seq",
            Value::Tuple(_) => "tuple",
            Value::Struct(_) => "struct",
            Value::Enum(_) => "enum",
        }
    }

    /// Build a `Value::Struct` from `(name, value)` pairs.
    pub fn struct_of<N: Into<String>>(
        fields: impl IntoIterator<Item = (N, Value)>,
    ) -> Value {
        Value::Struct(
            fields
                .into_iter()
                .map(|(name, value)| StructField { name: name.into(), value })
                .collect(),
        )
    }

    /// Build a `Value::Enum` carrying the named variant.
    pub fn enum_of<N: Into<String>>(variant: N, value: Value) -> Value {
        Value::Enum(EnumValue {
            variant_ord: 0,
            variant_name: variant.into(),
            value: Box::new(value),
        })
    }

    pub fn some(value: Value) -> Value {
        Value::Option(Some(Box::new(value)))
    }

    pub fn none() -> Value {
        Value::Option(None)
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| &f.value),
            _ => None,
        }
    }
}

/// Conversion of a typed parse result into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion of a [`Value`] back into a typed serialization input.
///
/// Conversions are strict: the variant has to match the target type, no
/// integer widening or narrowing happens. The one convenience is that
/// byte sequences are accepted both as `Value::Bytes` and as a
/// `Value::Seq` of `Value::U8`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

macro_rules! scalar_values {
    ($($t:ty => $variant:ident,)*)=>{$(
        impl IntoValue for $t {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $t {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => bail!(
                        Validation,
                        "expected {}, got {}",
                        stringify!($t),
                        other.kind(),
                    ),
                }
            }
        }

        impl From<$t> for Value {
            fn from(v: $t) -> Value {
                Value::$variant(v)
            }
        }
    )*};
}

scalar_values!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    BigUint => U256,
    String => Str,
);

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Seq(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Seq(elems) | Value::Tuple(elems) => {
                elems.iter().map(T::from_value).collect()
            }
            Value::Bytes(bytes) => bytes
                .iter()
                .map(|&b| T::from_value(&Value::U8(b)))
                .collect(),
            other => bail!(Validation, "expected a sequence, got {}", other.kind()),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        Value::Option(self.map(|v| Box::new(v.into_value())))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => Ok(Some(T::from_value(inner)?)),
            other => bail!(Validation, "expected an option, got {}", other.kind()),
        }
    }
}

impl<A: IntoValue, B: IntoValue> IntoValue for (A, B) {
    fn into_value(self) -> Value {
        Value::Tuple(vec![self.0.into_value(), self.1.into_value()])
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Tuple(elems) | Value::Seq(elems) => {
                ensure!(
                    elems.len() == 2,
                    Validation,
                    "expected a pair, got {} element(s)",
                    elems.len(),
                );
                Ok((A::from_value(&elems[0])?, B::from_value(&elems[1])?))
            }
            other => bail!(Validation, "expected a pair, got {}", other.kind()),
        }
    }
}


#[cfg(test)]
use crate::error::Error;

#[test]
fn scalar_conversions_round_trip() {
    assert_eq!(7u8.into_value(), Value::U8(7));
    assert_eq!(u8::from_value(&Value::U8(7)).unwrap(), 7);
    assert_eq!(
        String::from_value(&Value::Str("hi".into())).unwrap(),
        "hi",
    );
}

#[test]
fn conversions_are_strict_about_variants() {
    assert!(matches!(
        u8::from_value(&Value::U16(7)),
        Err(Error::Validation(_)),
    ));
    assert!(matches!(
        u64::from_value(&Value::Str("7".into())),
        Err(Error::Validation(_)),
    ));
}

#[test]
fn byte_vecs_accept_both_bytes_and_seq() {
    let from_bytes = Vec::<u8>::from_value(&Value::Bytes(vec![1, 2])).unwrap();
    let from_seq =
        Vec::<u8>::from_value(&Value::Seq(vec![Value::U8(1), Value::U8(2)])).unwrap();
    assert_eq!(from_bytes, from_seq);
}

#[test]
fn struct_of_preserves_declaration_order() {
    let v = Value::struct_of([("b", Value::U8(2)), ("a", Value::U8(1))]);
    match &v {
        Value::Struct(fields) => {
            assert_eq!(fields[0].name, "b");
            assert_eq!(fields[1].name, "a");
        }
        _ => panic!("expected a struct"),
    }
    assert_eq!(v.field("a"), Some(&Value::U8(1)));
    assert_eq!(v.field("missing"), None);
}

#[test]
fn options_nest() {
    let v = Some(Some(3u8)).into_value();
    assert_eq!(v, Value::some(Value::some(Value::U8(3))));
    let back = Option::<Option<u8>>::from_value(&v).unwrap();
    assert_eq!(back, Some(Some(3)));
}
