//! Codec error taxonomy.
//!
//! Argument-validation failures (blank registration names, duplicate
//! bindings) surface at the call site; structural and content failures
//! propagate to the façade caller. The one soft path, dictionary-miss
//! fallback, is not an error at all.

use thiserror::Error;

use crate::cbor::CborError;
use crate::registry::TypeKey;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("missing required value: {0}")]
    MissingRequiredValue(&'static str),

    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("name not resolvable in {scope} scope")]
    UnresolvableName { scope: &'static str },

    #[error("no deserializer bound for target type `{0}`")]
    UnsupportedType(TypeKey),

    #[error("target type `{0}` already has a bound deserializer")]
    AlreadyBound(TypeKey),

    #[error("unknown envelope type `{0}`")]
    UnknownEnvelopeType(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    #[error("failed to deserialize `{name}`")]
    DeserializationFailed {
        name: String,
        #[source]
        source: Box<CodecError>,
    },

    #[error("failed to serialize `{name}`")]
    SerializationFailed {
        name: String,
        #[source]
        source: Box<CodecError>,
    },

    #[error(transparent)]
    Wire(#[from] CborError),
}

impl CodecError {
    pub(crate) fn mismatch(expected: &'static str, actual: &crate::item::CborItem) -> Self {
        CodecError::TypeMismatch {
            expected,
            actual: actual.type_name(),
        }
    }
}
