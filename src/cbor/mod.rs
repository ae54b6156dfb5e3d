//! Raw CBOR (RFC 8949) encoding and decoding of [`CborItem`] trees.
//!
//! [`CborItem`]: crate::item::CborItem

mod constants;
mod decoder;
mod encoder;
mod error;

pub use constants::{TAG_TIME_EPOCH, TAG_TIME_TEXT};
pub use decoder::{decode_exact, ItemDecoder};
pub use encoder::{encode_item, write_item};
pub use error::CborError;
