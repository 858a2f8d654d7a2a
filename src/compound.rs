//! Compound schema constructors: sequences, options, tuples, structs,
//! tagged unions, and maps, all built on top of other schemas.
//!
//! The homogeneous combinators (`vector`, `fixed_array`, `option`, `map`)
//! stay fully generic over the element schema's types. The heterogeneous
//! ones (`tuple`, `structure`, `enumeration`) take element schemas erased
//! to the dynamic [`Value`] currency via [`BcsType::dynamic`].

use crate::{
    error::{
        Result,
        ensure,
        error,
        bail,
    },
    schema::{
        BcsType,
        DynBcsType,
    },
    uleb128,
    value::{
        EnumValue,
        StructField,
        Value,
    },
};
use std::sync::Arc;


/// ULEB128 length prefix followed by that many elements.
pub fn vector<T, I>(elem: BcsType<T, I>) -> BcsType<Vec<T>, Vec<I>>
where
    T: 'static,
    I: 'static,
{
    let name = format!("vector<{}>", elem.name());
    let read_elem = elem.clone();
    let write_elem = elem.clone();
    let size_elem = elem;
    BcsType::new(
        name,
        move |reader| reader.read_vec(|reader, _, _| read_elem.read(reader)),
        move |values: &Vec<I>, writer| {
            writer.write_vec(values, |writer, value, _, _| {
                write_elem.write(value, writer)
            })?;
            Ok(())
        },
    )
    .with_serialized_size(move |values: &Vec<I>| {
        let len = u32::try_from(values.len()).ok()?;
        let mut total = uleb128::encoded_len(len);
        for value in values {
            total += size_elem.serialized_size(value)?;
        }
        Some(total)
    })
}

/// Exactly `n` elements, no length prefix. Input of any other length
/// fails validation.
pub fn fixed_array<T, I>(n: usize, elem: BcsType<T, I>) -> BcsType<Vec<T>, Vec<I>>
where
    T: 'static,
    I: 'static,
{
    let name = format!("[{}; {}]", elem.name(), n);
    let read_elem = elem.clone();
    let write_elem = elem.clone();
    let size_elem = elem.clone();
    let validate_elem = elem;
    BcsType::new(
        name,
        move |reader| reader.read_fixed(n, |reader, _, _| read_elem.read(reader)),
        move |values: &Vec<I>, writer| {
            writer.write_fixed(values, n, |writer, value, _, _| {
                write_elem.write(value, writer)
            })?;
            Ok(())
        },
    )
    .with_serialized_size(move |values: &Vec<I>| {
        if values.len() != n {
            return None;
        }
        values.iter().map(|v| size_elem.serialized_size(v)).sum()
    })
    .with_validate(move |values: &Vec<I>| {
        ensure!(
            values.len() == n,
            Validation,
            "expected exactly {} element(s), got {}",
            n,
            values.len(),
        );
        for value in values {
            validate_elem.validate(value)?;
        }
        Ok(())
    })
}

/// The two-variant tagged union `{None, Some(T)}`, flattened to
/// `Option<T>`: tag `0x00` for absent, `0x01` followed by the payload for
/// present.
pub fn option<T, I>(elem: BcsType<T, I>) -> BcsType<Option<T>, Option<I>>
where
    T: 'static,
    I: 'static,
{
    let name = format!("option<{}>", elem.name());
    let enum_name = name.clone();
    let read_elem = elem.clone();
    let write_elem = elem.clone();
    let size_elem = elem.clone();
    let validate_elem = elem;
    BcsType::new(
        name,
        move |reader| match reader.read_uleb128()? {
            0 => Ok(None),
            1 => Ok(Some(read_elem.read(reader)?)),
            tag => Err(error!(
                Malformed,
                "unknown discriminant {} for {}",
                tag,
                enum_name,
            )),
        },
        move |value: &Option<I>, writer| match value {
            None => {
                writer.write_uleb128(0)?;
                Ok(())
            }
            Some(inner) => {
                writer.write_uleb128(1)?;
                write_elem.write(inner, writer)
            }
        },
    )
    .with_serialized_size(move |value: &Option<I>| match value {
        None => Some(1),
        Some(inner) => Some(1 + size_elem.serialized_size(inner)?),
    })
    .with_validate(move |value: &Option<I>| match value {
        None => Ok(()),
        Some(inner) => validate_elem.validate(inner),
    })
}

/// Heterogeneous positional sequence: elements back to back, no length
/// prefix. Accepts `Value::Tuple` or `Value::Seq` input of matching
/// arity; parses to `Value::Tuple`.
pub fn tuple(elems: Vec<DynBcsType>) -> DynBcsType {
    let name = format!(
        "({})",
        elems
            .iter()
            .map(|e| e.name().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    );
    let elems = Arc::new(elems);
    let read_elems = Arc::clone(&elems);
    let write_elems = Arc::clone(&elems);
    let validate_elems = Arc::clone(&elems);
    let write_name = name.clone();
    let validate_name = name.clone();
    BcsType::new(
        name,
        move |reader| {
            let mut out = Vec::with_capacity(read_elems.len());
            for elem in read_elems.iter() {
                out.push(elem.read(reader)?);
            }
            Ok(Value::Tuple(out))
        },
        move |value: &Value, writer| {
            let values = tuple_input(&write_name, &write_elems, value)?;
            for (elem, value) in write_elems.iter().zip(values) {
                elem.write(value, writer)?;
            }
            Ok(())
        },
    )
    .with_validate(move |value: &Value| {
        let values = tuple_input(&validate_name, &validate_elems, value)?;
        for (elem, value) in validate_elems.iter().zip(values) {
            elem.validate(value)?;
        }
        Ok(())
    })
}

fn tuple_input<'v>(
    name: &str,
    elems: &[DynBcsType],
    value: &'v Value,
) -> Result<&'v [Value]> {
    let values = match value {
        Value::Tuple(values) | Value::Seq(values) => values,
        other => bail!(
            Validation,
            "{} expects a positional sequence, got {}",
            name,
            other.kind(),
        ),
    };
    ensure!(
        values.len() == elems.len(),
        Validation,
        "{} expects {} element(s), got {}",
        name,
        elems.len(),
        values.len(),
    );
    Ok(values)
}

/// Named fields in declaration order. Parses to a `Value::Struct` whose
/// fields keep that order; on write the input fields may come in any
/// order and are matched by name. A missing field is an error, extra
/// fields are ignored.
pub fn structure<N: Into<String>>(
    name: impl Into<String>,
    fields: Vec<(N, DynBcsType)>,
) -> DynBcsType {
    let name = name.into();
    let fields: Arc<Vec<(String, DynBcsType)>> = Arc::new(
        fields
            .into_iter()
            .map(|(field_name, schema)| (field_name.into(), schema))
            .collect(),
    );
    let read_fields = Arc::clone(&fields);
    let write_fields = Arc::clone(&fields);
    let validate_fields = Arc::clone(&fields);
    let write_name = name.clone();
    let validate_name = name.clone();
    BcsType::new(
        name,
        move |reader| {
            let mut out = Vec::with_capacity(read_fields.len());
            for (field_name, schema) in read_fields.iter() {
                out.push(StructField {
                    name: field_name.clone(),
                    value: schema.read(reader)?,
                });
            }
            Ok(Value::Struct(out))
        },
        move |value: &Value, writer| {
            for (field_name, schema) in write_fields.iter() {
                let field = struct_input(&write_name, value, field_name)?;
                schema.write(field, writer)?;
            }
            Ok(())
        },
    )
    .with_validate(move |value: &Value| {
        for (field_name, schema) in validate_fields.iter() {
            let field = struct_input(&validate_name, value, field_name)?;
            schema.validate(field)?;
        }
        Ok(())
    })
}

fn struct_input<'v>(
    name: &str,
    value: &'v Value,
    field_name: &str,
) -> Result<&'v Value> {
    match value {
        Value::Struct(_) => value.field(field_name).ok_or_else(|| {
            error!(Validation, "missing field `{}` in struct {}", field_name, name)
        }),
        other => bail!(
            Validation,
            "struct {} expects a struct value, got {}",
            name,
            other.kind(),
        ),
    }
}

/// Tagged union: ULEB128 discriminant in declaration order, followed by
/// the chosen variant's payload (unit variants carry none).
///
/// Writers accept a `Value::Enum` resolved by variant name (its ord is
/// ignored), or a `Value::Struct` with exactly one key naming a variant.
/// Parsing yields a `Value::Enum` carrying the ord, the name, and the
/// payload.
pub fn enumeration<N: Into<String>>(
    name: impl Into<String>,
    variants: Vec<(N, Option<DynBcsType>)>,
) -> DynBcsType {
    let name = name.into();
    let variants: Arc<Vec<(String, Option<DynBcsType>)>> = Arc::new(
        variants
            .into_iter()
            .map(|(variant_name, schema)| (variant_name.into(), schema))
            .collect(),
    );
    let read_variants = Arc::clone(&variants);
    let write_variants = Arc::clone(&variants);
    let validate_variants = Arc::clone(&variants);
    let read_name = name.clone();
    let write_name = name.clone();
    let validate_name = name.clone();
    BcsType::new(
        name,
        move |reader| {
            let tag = reader.read_uleb128()? as usize;
            let (variant_name, schema) = read_variants.get(tag).ok_or_else(|| {
                error!(
                    Malformed,
                    "unknown discriminant {} for enum {}",
                    tag,
                    read_name,
                )
            })?;
            let payload = match schema {
                Some(schema) => schema.read(reader)?,
                None => Value::Unit,
            };
            Ok(Value::Enum(EnumValue {
                variant_ord: tag,
                variant_name: variant_name.clone(),
                value: Box::new(payload),
            }))
        },
        move |value: &Value, writer| {
            let (ord, schema, payload) =
                resolve_variant(&write_name, &write_variants, value)?;
            writer.write_uleb128(ord as u32)?;
            match schema {
                Some(schema) => schema.write(payload, writer),
                None => Ok(()),
            }
        },
    )
    .with_validate(move |value: &Value| {
        let (_, schema, payload) =
            resolve_variant(&validate_name, &validate_variants, value)?;
        match schema {
            Some(schema) => schema.validate(payload),
            None => Ok(()),
        }
    })
}

/// Pick the variant a caller-supplied value refers to, by name.
fn resolve_variant<'v>(
    enum_name: &str,
    variants: &'v [(String, Option<DynBcsType>)],
    value: &'v Value,
) -> Result<(usize, &'v Option<DynBcsType>, &'v Value)> {
    let (ord, payload) = match value {
        Value::Enum(ev) => {
            let ord = variants
                .iter()
                .position(|(name, _)| *name == ev.variant_name)
                .ok_or_else(|| {
                    error!(
                        Validation,
                        "unknown variant `{}` for enum {}",
                        ev.variant_name,
                        enum_name,
                    )
                })?;
            (ord, &*ev.value)
        }
        Value::Struct(fields) => {
            let mut found = None;
            for field in fields {
                if let Some(ord) =
                    variants.iter().position(|(name, _)| *name == field.name)
                {
                    ensure!(
                        found.is_none(),
                        Validation,
                        "more than one variant key for enum {}",
                        enum_name,
                    );
                    found = Some((ord, &field.value));
                }
            }
            found.ok_or_else(|| {
                error!(Validation, "no variant key for enum {}", enum_name)
            })?
        }
        other => bail!(
            Validation,
            "enum {} expects an enum value or a single-key struct, got {}",
            enum_name,
            other.kind(),
        ),
    };
    let (_, schema) = &variants[ord];
    if schema.is_none() {
        ensure!(
            matches!(payload, Value::Unit),
            Validation,
            "variant `{}` of enum {} carries no payload",
            variants[ord].0,
            enum_name,
        );
    }
    Ok((ord, schema, payload))
}

/// Mapping serialized as `vector<(K, V)>`: ULEB128 pair count, then the
/// key and value encodings of each pair. The codec imposes no ordering;
/// caller order is preserved.
pub fn map<K, V, IK, IV>(
    key: BcsType<K, IK>,
    value: BcsType<V, IV>,
) -> BcsType<Vec<(K, V)>, Vec<(IK, IV)>>
where
    K: 'static,
    V: 'static,
    IK: 'static,
    IV: 'static,
{
    let name = format!("map<{}, {}>", key.name(), value.name());
    let read_key = key.clone();
    let read_value = value.clone();
    let write_key = key.clone();
    let write_value = value.clone();
    let size_key = key;
    let size_value = value;
    BcsType::new(
        name,
        move |reader| {
            reader.read_vec(|reader, _, _| {
                Ok((read_key.read(reader)?, read_value.read(reader)?))
            })
        },
        move |pairs: &Vec<(IK, IV)>, writer| {
            writer.write_vec(pairs, |writer, (k, v), _, _| {
                write_key.write(k, writer)?;
                write_value.write(v, writer)
            })?;
            Ok(())
        },
    )
    .with_serialized_size(move |pairs: &Vec<(IK, IV)>| {
        let len = u32::try_from(pairs.len()).ok()?;
        let mut total = uleb128::encoded_len(len);
        for (k, v) in pairs {
            total += size_key.serialized_size(k)?;
            total += size_value.serialized_size(v)?;
        }
        Some(total)
    })
}
