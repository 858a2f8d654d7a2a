//! The result of a serialize call: bytes bound to the schema that
//! produced them, so they can be re-encoded or parsed back without the
//! caller holding the schema separately.

use crate::{
    error::{
        Result,
        error,
    },
    schema::BcsType,
};
use base64::{
    engine::general_purpose::STANDARD,
    Engine as _,
};
use std::fmt::{self, Debug, Formatter};


/// Immutable `(schema, bytes)` pair. Only constructed after a write
/// completes cleanly, so partial output is never observable.
pub struct Serialized<T: 'static, I: 'static = T> {
    schema: BcsType<T, I>,
    bytes: Vec<u8>,
}

impl<T: 'static, I: 'static> Serialized<T, I> {
    pub(crate) fn new(schema: BcsType<T, I>, bytes: Vec<u8>) -> Self {
        Serialized { schema, bytes }
    }

    /// Name of the schema that produced these bytes.
    pub fn schema_name(&self) -> &str {
        self.schema.name()
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Parse the bytes back with the embedded schema, guaranteeing a
    /// round trip within the same envelope.
    pub fn parse(&self) -> Result<T> {
        self.schema.parse(&self.bytes)
    }
}

/// String-encoded input shortcuts, mirroring the envelope's `to_*`
/// re-encodings on the parse side.
impl<T: 'static, I: 'static> BcsType<T, I> {
    pub fn parse_hex(&self, s: &str) -> Result<T> {
        let bytes =
            hex::decode(s).map_err(|e| error!(Malformed, "invalid hex: {}", e))?;
        self.parse(&bytes)
    }

    pub fn parse_base58(&self, s: &str) -> Result<T> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| error!(Malformed, "invalid base58: {}", e))?;
        self.parse(&bytes)
    }

    pub fn parse_base64(&self, s: &str) -> Result<T> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| error!(Malformed, "invalid base64: {}", e))?;
        self.parse(&bytes)
    }
}

impl<T: 'static, I: 'static> Debug for Serialized<T, I> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Serialized")
            .field("schema", &self.schema_name())
            .field("bytes", &self.to_hex())
            .finish()
    }
}
