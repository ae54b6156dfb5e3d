//! CBOR item encoder.
//!
//! Emits definite-length items with minimal-width headers, so the same item
//! tree always produces the same bytes. Dictionary reverse lookups rely on
//! this (codes are keyed by their canonical encoding).

use crate::item::CborItem;

use super::constants::*;

/// Write a header byte plus the shortest argument encoding for `n`.
pub fn write_header(out: &mut Vec<u8>, major: u8, n: u64) {
    let overlay = major << 5;
    if n <= 23 {
        out.push(overlay | n as u8);
    } else if n <= 0xff {
        out.push(overlay | 24);
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(overlay | 25);
        out.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        out.push(overlay | 26);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        out.push(overlay | 27);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

pub fn write_uint(out: &mut Vec<u8>, n: u64) {
    write_header(out, MAJOR_UIN, n);
}

/// Write a negative integer from its raw wire argument (denotes `-1 - raw`).
pub fn write_nint_raw(out: &mut Vec<u8>, raw: u64) {
    write_header(out, MAJOR_NIN, raw);
}

pub fn write_int(out: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        write_uint(out, n as u64);
    } else {
        write_nint_raw(out, (-1i64).wrapping_sub(n) as u64);
    }
}

pub fn write_text(out: &mut Vec<u8>, s: &str) {
    write_header(out, MAJOR_STR, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}

pub fn write_bytes(out: &mut Vec<u8>, b: &[u8]) {
    write_header(out, MAJOR_BIN, b.len() as u64);
    out.extend_from_slice(b);
}

pub fn write_null(out: &mut Vec<u8>) {
    out.push(0xf6);
}

pub fn write_bool(out: &mut Vec<u8>, b: bool) {
    out.push(if b { 0xf5 } else { 0xf4 });
}

/// Write a float in the narrowest width that round-trips (f32 or f64).
pub fn write_float(out: &mut Vec<u8>, f: f64) {
    if is_f32_roundtrip(f) {
        out.push(0xfa);
        out.extend_from_slice(&(f as f32).to_bits().to_be_bytes());
    } else {
        out.push(0xfb);
        out.extend_from_slice(&f.to_bits().to_be_bytes());
    }
}

/// Recursively write one item tree.
pub fn write_item(out: &mut Vec<u8>, item: &CborItem) {
    match item {
        CborItem::Null => write_null(out),
        CborItem::Bool(b) => write_bool(out, *b),
        CborItem::Uint(u) => write_uint(out, *u),
        CborItem::Nint(raw) => write_nint_raw(out, *raw),
        CborItem::Float(f) => write_float(out, *f),
        CborItem::Bytes(b) => write_bytes(out, b),
        CborItem::Text(s) => write_text(out, s),
        CborItem::Array(items) => {
            write_header(out, MAJOR_ARR, items.len() as u64);
            for it in items {
                write_item(out, it);
            }
        }
        CborItem::Map(pairs) => {
            write_header(out, MAJOR_MAP, pairs.len() as u64);
            for (k, v) in pairs {
                write_item(out, k);
                write_item(out, v);
            }
        }
        CborItem::Tag(tag, inner) => {
            write_header(out, MAJOR_TAG, *tag);
            write_item(out, inner);
        }
    }
}

/// Encode one item tree into a fresh byte vector.
pub fn encode_item(item: &CborItem) -> Vec<u8> {
    let mut out = Vec::new();
    write_item(&mut out, item);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_widths_are_minimal() {
        let mut out = Vec::new();
        write_uint(&mut out, 23);
        assert_eq!(out, [0x17]);
        out.clear();
        write_uint(&mut out, 24);
        assert_eq!(out, [0x18, 24]);
        out.clear();
        write_uint(&mut out, 0x100);
        assert_eq!(out, [0x19, 0x01, 0x00]);
        out.clear();
        write_uint(&mut out, 0x1_0000);
        assert_eq!(out, [0x1a, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn negative_integers_use_major_one() {
        assert_eq!(encode_item(&CborItem::int(-1)), [0x20]);
        assert_eq!(encode_item(&CborItem::int(-25)), [0x38, 24]);
    }

    #[test]
    fn text_and_bytes() {
        assert_eq!(encode_item(&CborItem::text("abc")), [0x63, b'a', b'b', b'c']);
        assert_eq!(encode_item(&CborItem::Bytes(vec![1, 2])), [0x42, 1, 2]);
    }

    #[test]
    fn float_narrows_when_lossless() {
        assert_eq!(encode_item(&CborItem::Float(1.5))[0], 0xfa);
        assert_eq!(encode_item(&CborItem::Float(0.1))[0], 0xfb);
    }

    #[test]
    fn tagged_array() {
        let item = CborItem::tag(1, CborItem::Array(vec![CborItem::Null, CborItem::Bool(true)]));
        assert_eq!(encode_item(&item), [0xc1, 0x82, 0xf6, 0xf5]);
    }
}
