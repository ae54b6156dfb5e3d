//! Dictionary-compressed CBOR wire codec for the IF-MAP protocol.
//!
//! IF-MAP (TCG's Interface for Metadata Access Points) is normally carried
//! as XML. This crate translates its request/response/identifier/metadata
//! object model to and from CBOR (RFC 8949): every element serializes as a
//! 4-slot `[namespace, name, attributes, children]` array, every name runs
//! through an optional compression dictionary, and absent dictionary
//! entries degrade to literal text while staying exactly reversible.
//!
//! ```
//! use ifmap_cbor::model::{Capability, Metadata, OperationalAttributes};
//! use ifmap_cbor::CodecContext;
//!
//! let ctx = CodecContext::new();
//! let capability = Metadata::Capability(Capability {
//!     operational: OperationalAttributes::default(),
//!     name: "capability:name".to_owned(),
//!     administrative_domain: None,
//! });
//! let bytes = ctx.encode_metadata(&capability).expect("encode");
//! assert_eq!(ctx.decode_metadata(&bytes).expect("decode"), capability);
//! ```

pub mod cbor;
mod codec;
pub mod dictionary;
pub mod element;
mod error;
mod item;
pub mod model;
pub mod names;
pub mod primitives;
pub mod registry;

pub use cbor::CborError;
pub use codec::CodecContext;
pub use error::CodecError;
pub use item::CborItem;
pub use registry::{Deserializer, DeserializeInput, DeserializerRegistry, TypeKey};
