//! # Envelope
//!
//! Insertion-ordered container of named, typed values. Requests arrive as an
//! envelope and every response payload is an envelope.
//!
//! Names are unique: inserting a value under an existing name replaces it in
//! place, keeping its original position.
//!
//! Lookups distinguish a missing field ([`EnvelopeError::NotFound`]) from a
//! field of the wrong type ([`EnvelopeError::TypeMismatch`]). Handlers treat
//! `NotFound` on an optional field as "use the default" via
//! [`LookupExt::optional`], and every other error as a malformed request.

use crate::errors::{Classified, ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// VALUES
// =============================================================================

/// A typed envelope value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Uint32(u32),
    String(String),
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
    Envelope(Envelope),
    EnvelopeArray(Vec<Envelope>),
}

impl Value {
    /// Wire name of this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Int32(_) => "int32",
            Value::Uint32(_) => "uint32",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Envelope(_) => "envelope",
            Value::EnvelopeArray(_) => "envelope_array",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint32(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Envelope> for Value {
    fn from(v: Envelope) -> Self {
        Value::Envelope(v)
    }
}

impl From<Vec<Envelope>> for Value {
    fn from(v: Vec<Envelope>) -> Self {
        Value::EnvelopeArray(v)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Field lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The field is absent.
    #[error("field '{name}' not found")]
    NotFound { name: String },

    /// The field is present but holds another type.
    #[error("field '{name}' is {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl EnvelopeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EnvelopeError::NotFound { .. })
    }
}

impl Classified for EnvelopeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ParameterError
    }
}

/// Turns a `NotFound` lookup into `Ok(None)`.
pub trait LookupExt<T> {
    fn optional(self) -> Result<Option<T>, EnvelopeError>;
}

impl<T> LookupExt<T> for Result<T, EnvelopeError> {
    fn optional(self) -> Result<Option<T>, EnvelopeError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// A named value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// Insertion-ordered set of uniquely named values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope {
    fields: Vec<Field>,
}

macro_rules! typed_lookup {
    ($lookup:ident, $optional:ident, $variant:ident, $ty:ty, $expected:literal, |$v:ident| $conv:expr) => {
        pub fn $lookup(&self, name: &str) -> Result<$ty, EnvelopeError> {
            match self.require(name)? {
                Value::$variant($v) => Ok($conv),
                other => Err(mismatch(name, $expected, other)),
            }
        }

        pub fn $optional(&self, name: &str) -> Result<Option<$ty>, EnvelopeError> {
            self.$lookup(name).optional()
        }
    };
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace `name`. A replaced value keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(idx).value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.value))
    }

    fn require(&self, name: &str) -> Result<&Value, EnvelopeError> {
        self.get(name).ok_or_else(|| EnvelopeError::NotFound {
            name: name.to_owned(),
        })
    }

    typed_lookup!(lookup_bool, optional_bool, Boolean, bool, "boolean", |v| *v);
    typed_lookup!(lookup_i32, optional_i32, Int32, i32, "int32", |v| *v);
    typed_lookup!(lookup_u32, optional_u32, Uint32, u32, "uint32", |v| *v);
    typed_lookup!(lookup_str, optional_str, String, &str, "string", |v| v.as_str());
    typed_lookup!(lookup_bytes, optional_bytes, Bytes, &[u8], "bytes", |v| v.as_slice());
    typed_lookup!(lookup_envelope, optional_envelope, Envelope, &Envelope, "envelope", |v| v);
    typed_lookup!(
        lookup_envelope_array,
        optional_envelope_array,
        EnvelopeArray,
        &[Envelope],
        "envelope_array",
        |v| v.as_slice()
    );

    /// Remove and return a string field. A type mismatch leaves the field in
    /// place.
    pub fn take_string(&mut self, name: &str) -> Result<String, EnvelopeError> {
        self.take_with(name, "string", |v| match v {
            Value::String(s) => Ok(s),
            other => Err(other),
        })
    }

    /// Remove and return a bytes field. A type mismatch leaves the field in
    /// place.
    pub fn take_bytes(&mut self, name: &str) -> Result<Vec<u8>, EnvelopeError> {
        self.take_with(name, "bytes", |v| match v {
            Value::Bytes(b) => Ok(b),
            other => Err(other),
        })
    }

    fn take_with<T>(
        &mut self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(Value) -> Result<T, Value>,
    ) -> Result<T, EnvelopeError> {
        let idx = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| EnvelopeError::NotFound {
                name: name.to_owned(),
            })?;
        let field = self.fields.remove(idx);
        match extract(field.value) {
            Ok(v) => Ok(v),
            Err(value) => {
                let err = mismatch(name, expected, &value);
                self.fields.insert(
                    idx,
                    Field {
                        name: field.name,
                        value,
                    },
                );
                Err(err)
            }
        }
    }
}

fn mismatch(name: &str, expected: &'static str, actual: &Value) -> EnvelopeError {
    EnvelopeError::TypeMismatch {
        name: name.to_owned(),
        expected,
        actual: actual.type_name(),
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
