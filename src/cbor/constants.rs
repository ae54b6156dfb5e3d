//! CBOR constants.

// MAJOR type values (bits 7-5 of the initial byte)
pub const MAJOR_UIN: u8 = 0b000;
pub const MAJOR_NIN: u8 = 0b001;
pub const MAJOR_BIN: u8 = 0b010;
pub const MAJOR_STR: u8 = 0b011;
pub const MAJOR_ARR: u8 = 0b100;
pub const MAJOR_MAP: u8 = 0b101;
pub const MAJOR_TAG: u8 = 0b110;
pub const MAJOR_TKN: u8 = 0b111;

pub const MINOR_MASK: u8 = 0b11111;

/// Tag 0: standard date/time text string.
pub const TAG_TIME_TEXT: u64 = 0;
/// Tag 1: epoch-based date/time number.
pub const TAG_TIME_EPOCH: u64 = 1;

/// Returns `true` if `f` can be losslessly represented as an `f32`.
#[inline]
pub fn is_f32_roundtrip(f: f64) -> bool {
    (f as f32) as f64 == f
}
