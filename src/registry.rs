//! Legacy name-registry facade over the combinator core.
//!
//! Schemas are addressed by string type expressions like
//! `"vector<option<u8>>"` or `"Option<Coin<SUI>>"`: a registry maps base
//! names to concrete schemas or generic factories, aliases resolve
//! transitively with cycle detection, and a small recursive-descent
//! parser turns the expression into a tree of lookups. New code should
//! compose combinators directly; this layer exists for API parity with
//! the older registry-based interface.

use crate::{
    compound::{
        enumeration,
        map,
        option,
        structure,
        vector,
    },
    envelope::Serialized,
    error::{
        Result,
        ensure,
        bail,
    },
    primitives,
    schema::DynBcsType,
    value::Value,
};
use std::{
    collections::HashMap,
    sync::Arc,
};
use tracing::{debug, trace};


type Factory = Arc<dyn Fn(&[DynBcsType]) -> Result<DynBcsType> + Send + Sync>;

enum Entry {
    Concrete(DynBcsType),
    Generic { arity: usize, factory: Factory },
    Alias(String),
}

/// Per-instance registry of named schemas. Nothing is process-global;
/// two registries never see each other's registrations.
pub struct BcsRegistry {
    entries: HashMap<String, Entry>,
}

impl Default for BcsRegistry {
    fn default() -> Self {
        BcsRegistry::new()
    }
}

impl BcsRegistry {
    /// A registry with the BCS primitives pre-registered under their
    /// conventional names, plus generic `vector<T>`, `option<T>`, and
    /// `map<K, V>`.
    pub fn new() -> Self {
        let mut registry = BcsRegistry { entries: HashMap::new() };
        registry.register("u8", primitives::u8().dynamic());
        registry.register("u16", primitives::u16().dynamic());
        registry.register("u32", primitives::u32().dynamic());
        registry.register("u64", primitives::u64().dynamic());
        registry.register("u128", primitives::u128().dynamic());
        registry.register("u256", primitives::u256().dynamic());
        registry.register("uleb128", primitives::uleb128().dynamic());
        registry.register("bool", primitives::bool().dynamic());
        registry.register("string", primitives::string().dynamic());
        registry.register_generic("vector", 1, |params| {
            Ok(vector(params[0].clone()).dynamic())
        });
        registry.register_generic("option", 1, |params| {
            Ok(option(params[0].clone()).dynamic())
        });
        registry.register_generic("map", 2, |params| {
            Ok(map(params[0].clone(), params[1].clone()).dynamic())
        });
        registry
    }

    /// Register a concrete schema under `name`, replacing any previous
    /// registration.
    pub fn register(&mut self, name: impl Into<String>, schema: DynBcsType) {
        let name = name.into();
        debug!(%name, "registered type");
        self.entries.insert(name, Entry::Concrete(schema));
    }

    /// Register a parameterized schema: `factory` receives exactly
    /// `arity` resolved parameter schemas.
    pub fn register_generic(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        factory: impl Fn(&[DynBcsType]) -> Result<DynBcsType> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!(%name, arity, "registered generic type");
        self.entries.insert(
            name,
            Entry::Generic { arity, factory: Arc::new(factory) },
        );
    }

    /// Register a struct type whose field types are given as type
    /// expressions resolved against the current registry contents.
    /// Resolution is eager, so dependencies have to be registered first.
    pub fn register_struct(
        &mut self,
        name: impl Into<String>,
        fields: Vec<(&str, &str)>,
    ) -> Result<()> {
        let name = name.into();
        let mut resolved = Vec::with_capacity(fields.len());
        for (field_name, type_expr) in fields {
            resolved.push((field_name.to_string(), self.get(type_expr)?));
        }
        self.register(name.clone(), structure(name, resolved));
        Ok(())
    }

    /// Register an enum type whose variant payload types are given as
    /// type expressions (`None` for unit variants). Resolution is eager,
    /// like [`BcsRegistry::register_struct`].
    pub fn register_enum(
        &mut self,
        name: impl Into<String>,
        variants: Vec<(&str, Option<&str>)>,
    ) -> Result<()> {
        let name = name.into();
        let mut resolved = Vec::with_capacity(variants.len());
        for (variant_name, type_expr) in variants {
            let schema = match type_expr {
                Some(expr) => Some(self.get(expr)?),
                None => None,
            };
            resolved.push((variant_name.to_string(), schema));
        }
        self.register(name.clone(), enumeration(name, resolved));
        Ok(())
    }

    /// Register `alias` as another name for `target`, which may itself
    /// be an alias or a full type expression. Cycles are detected at
    /// resolution time.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        let alias = alias.into();
        let target = target.into();
        debug!(%alias, %target, "registered alias");
        self.entries.insert(alias, Entry::Alias(target));
    }

    /// Resolve a type expression to a schema.
    pub fn get(&self, type_expr: &str) -> Result<DynBcsType> {
        let expr = TypeExpr::parse(type_expr)?;
        self.resolve(&expr, &mut Vec::new())
    }

    /// Shortcut: resolve `type_expr` and serialize `value` with it.
    pub fn serialize(&self, type_expr: &str, value: &Value) -> Result<Serialized<Value>> {
        self.get(type_expr)?.serialize(value)
    }

    /// Shortcut: resolve `type_expr` and parse `bytes` with it.
    pub fn parse(&self, type_expr: &str, bytes: &[u8]) -> Result<Value> {
        self.get(type_expr)?.parse(bytes)
    }

    fn resolve(&self, expr: &TypeExpr, visiting: &mut Vec<String>) -> Result<DynBcsType> {
        let params = expr
            .params
            .iter()
            .map(|param| self.resolve(param, &mut Vec::new()))
            .collect::<Result<Vec<_>>>()?;
        match self.entries.get(&expr.name) {
            None => bail!(Schema, "unknown type `{}`", expr.name),
            Some(Entry::Concrete(schema)) => {
                ensure!(
                    params.is_empty(),
                    Schema,
                    "type `{}` takes no parameters, got {}",
                    expr.name,
                    params.len(),
                );
                Ok(schema.clone())
            }
            Some(Entry::Generic { arity, factory }) => {
                ensure!(
                    params.len() == *arity,
                    Schema,
                    "type `{}` takes {} parameter(s), got {}",
                    expr.name,
                    arity,
                    params.len(),
                );
                factory(&params)
            }
            Some(Entry::Alias(target)) => {
                ensure!(
                    params.is_empty(),
                    Schema,
                    "alias `{}` takes no parameters",
                    expr.name,
                );
                ensure!(
                    !visiting.iter().any(|seen| seen == &expr.name),
                    Schema,
                    "alias cycle through `{}`",
                    expr.name,
                );
                trace!(alias = %expr.name, %target, "resolving alias");
                visiting.push(expr.name.clone());
                let target_expr = TypeExpr::parse(target)?;
                self.resolve(&target_expr, visiting)
            }
        }
    }
}

/// A parsed `Name<A, B, …>` type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeExpr {
    name: String,
    params: Vec<TypeExpr>,
}

impl TypeExpr {
    fn parse(src: &str) -> Result<TypeExpr> {
        let mut parser = Parser { src, pos: 0 };
        parser.skip_whitespace();
        let expr = parser.parse_expr()?;
        parser.skip_whitespace();
        ensure!(
            parser.at_end(),
            Schema,
            "unexpected trailing input at position {} in `{}`",
            parser.pos,
            src,
        );
        Ok(expr)
    }
}

struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_ident(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        ensure!(
            self.pos > start,
            Schema,
            "expected a type name at position {} in `{}`",
            start,
            self.src,
        );
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_expr(&mut self) -> Result<TypeExpr> {
        let name = self.parse_ident()?;
        self.skip_whitespace();
        let mut params = Vec::new();
        if self.eat('<') {
            loop {
                self.skip_whitespace();
                params.push(self.parse_expr()?);
                self.skip_whitespace();
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                bail!(
                    Schema,
                    "expected `,` or `>` at position {} in `{}`",
                    self.pos,
                    self.src,
                );
            }
        }
        Ok(TypeExpr { name, params })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::structure;
    use crate::error::Error;
    use crate::primitives::u64;

    #[test]
    fn expression_parser_handles_nesting_and_whitespace() {
        let expr = TypeExpr::parse(" map < string , vector<u8> > ").unwrap();
        assert_eq!(expr.name, "map");
        assert_eq!(expr.params.len(), 2);
        assert_eq!(expr.params[0].name, "string");
        assert_eq!(expr.params[1].name, "vector");
        assert_eq!(expr.params[1].params[0].name, "u8");
    }

    #[test]
    fn expression_parser_rejects_garbage() {
        assert!(matches!(TypeExpr::parse(""), Err(Error::Schema(_))));
        assert!(matches!(TypeExpr::parse("vector<"), Err(Error::Schema(_))));
        assert!(matches!(TypeExpr::parse("vector<u8"), Err(Error::Schema(_))));
        assert!(matches!(TypeExpr::parse("u8>"), Err(Error::Schema(_))));
        assert!(matches!(TypeExpr::parse("a b"), Err(Error::Schema(_))));
    }

    #[test]
    fn builtins_resolve_and_round_trip() {
        let registry = BcsRegistry::new();
        let schema = registry.get("vector<option<u8>>").unwrap();
        let input = Value::Seq(vec![
            Value::some(Value::U8(1)),
            Value::none(),
        ]);
        let bytes = schema.serialize(&input).unwrap();
        assert_eq!(bytes.to_bytes(), [0x02, 0x01, 0x01, 0x00]);
        assert_eq!(registry.parse("vector<option<u8>>", bytes.to_bytes()).unwrap(), input);
    }

    #[test]
    fn registered_types_participate_in_expressions() {
        let mut registry = BcsRegistry::new();
        registry.register("Coin", structure("Coin", vec![
            ("value", u64().dynamic()),
        ]));
        let schema = registry.get("option<Coin>").unwrap();
        let input = Value::some(Value::struct_of([("value", Value::U64(7))]));
        let bytes = schema.serialize(&input).unwrap();
        assert_eq!(bytes.to_bytes(), [0x01, 7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn string_typed_struct_and_enum_registration() {
        let mut registry = BcsRegistry::new();
        registry
            .register_struct("Coin", vec![
                ("value", "u64"),
                ("owner", "string"),
                ("is_locked", "bool"),
            ])
            .unwrap();
        registry
            .register_enum("CoinEvent", vec![
                ("Created", None),
                ("Transferred", Some("Coin")),
            ])
            .unwrap();

        let input = Value::enum_of(
            "Transferred",
            Value::struct_of([
                ("value", Value::U64(1)),
                ("owner", Value::Str("a".into())),
                ("is_locked", Value::Bool(true)),
            ]),
        );
        let bytes = registry.serialize("CoinEvent", &input).unwrap();
        assert_eq!(
            bytes.to_bytes(),
            [0x01, 1, 0, 0, 0, 0, 0, 0, 0, 0x01, b'a', 0x01],
        );

        // unknown field type fails eagerly
        let err = registry
            .register_struct("Bad", vec![("x", "NotAType")])
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn aliases_resolve_transitively() {
        let mut registry = BcsRegistry::new();
        registry.register_alias("SUI", "Balance");
        registry.register_alias("Balance", "u64");
        let bytes = registry
            .serialize("vector<SUI>", &Value::Seq(vec![Value::U64(1)]))
            .unwrap();
        assert_eq!(bytes.to_bytes(), [0x01, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn alias_cycles_are_detected() {
        let mut registry = BcsRegistry::new();
        registry.register_alias("A", "B");
        registry.register_alias("B", "A");
        assert!(matches!(registry.get("A"), Err(Error::Schema(_))));
    }

    #[test]
    fn arity_mismatches_are_schema_errors() {
        let registry = BcsRegistry::new();
        assert!(matches!(registry.get("u8<u16>"), Err(Error::Schema(_))));
        assert!(matches!(registry.get("vector"), Err(Error::Schema(_))));
        assert!(matches!(registry.get("map<u8>"), Err(Error::Schema(_))));
        assert!(matches!(registry.get("Unknown"), Err(Error::Schema(_))));
    }
}
