//! CBOR item decoder.
//!
//! Cursor-based decoder producing an owned [`CborItem`] tree. All three
//! float widths collapse into `Float(f64)`. Indefinite-length items are
//! rejected; the IF-MAP binding only ever emits definite lengths.

use crate::item::CborItem;

use super::constants::*;
use super::error::CborError;

const MAX_DEPTH: usize = 64;

/// Cursor-based CBOR decoder over a borrowed byte slice.
pub struct ItemDecoder<'a> {
    data: &'a [u8],
    x: usize,
}

impl<'a> ItemDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, x: 0 }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.x
    }

    /// Decode the next data item.
    pub fn decode_item(&mut self) -> Result<CborItem, CborError> {
        self.read_item(0)
    }

    fn u8(&mut self) -> Result<u8, CborError> {
        let b = *self.data.get(self.x).ok_or(CborError::UnexpectedEof)?;
        self.x += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CborError> {
        if self.x + n > self.data.len() {
            return Err(CborError::UnexpectedEof);
        }
        let slice = &self.data[self.x..self.x + n];
        self.x += n;
        Ok(slice)
    }

    fn read_argument(&mut self, minor: u8) -> Result<u64, CborError> {
        match minor {
            0..=23 => Ok(minor as u64),
            24 => Ok(self.u8()? as u64),
            25 => {
                let b = self.take(2)?;
                Ok(u16::from_be_bytes([b[0], b[1]]) as u64)
            }
            26 => {
                let b = self.take(4)?;
                Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            }
            27 => {
                let b = self.take(8)?;
                Ok(u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            }
            31 => Err(CborError::IndefiniteLength),
            _ => Err(CborError::UnexpectedMinor),
        }
    }

    fn read_item(&mut self, depth: usize) -> Result<CborItem, CborError> {
        if depth > MAX_DEPTH {
            return Err(CborError::DepthLimit);
        }
        let initial = self.u8()?;
        let major = initial >> 5;
        let minor = initial & MINOR_MASK;
        match major {
            MAJOR_UIN => Ok(CborItem::Uint(self.read_argument(minor)?)),
            MAJOR_NIN => Ok(CborItem::Nint(self.read_argument(minor)?)),
            MAJOR_BIN => {
                let len = self.read_argument(minor)? as usize;
                Ok(CborItem::Bytes(self.take(len)?.to_vec()))
            }
            MAJOR_STR => {
                let len = self.read_argument(minor)? as usize;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)?;
                Ok(CborItem::Text(s.to_owned()))
            }
            MAJOR_ARR => {
                let len = self.read_argument(minor)? as usize;
                let mut items = Vec::with_capacity(len.min(64));
                for _ in 0..len {
                    items.push(self.read_item(depth + 1)?);
                }
                Ok(CborItem::Array(items))
            }
            MAJOR_MAP => {
                let len = self.read_argument(minor)? as usize;
                let mut pairs = Vec::with_capacity(len.min(64));
                for _ in 0..len {
                    let k = self.read_item(depth + 1)?;
                    let v = self.read_item(depth + 1)?;
                    pairs.push((k, v));
                }
                Ok(CborItem::Map(pairs))
            }
            MAJOR_TAG => {
                let tag = self.read_argument(minor)?;
                Ok(CborItem::Tag(tag, Box::new(self.read_item(depth + 1)?)))
            }
            MAJOR_TKN => match minor {
                20 => Ok(CborItem::Bool(false)),
                21 => Ok(CborItem::Bool(true)),
                22 => Ok(CborItem::Null),
                25 => {
                    let b = self.take(2)?;
                    Ok(CborItem::Float(decode_f16(u16::from_be_bytes([b[0], b[1]]))))
                }
                26 => {
                    let b = self.take(4)?;
                    Ok(CborItem::Float(
                        f32::from_bits(u32::from_be_bytes([b[0], b[1], b[2], b[3]])) as f64,
                    ))
                }
                27 => {
                    let b = self.take(8)?;
                    Ok(CborItem::Float(f64::from_bits(u64::from_be_bytes([
                        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                    ]))))
                }
                31 => Err(CborError::IndefiniteLength),
                _ => Err(CborError::UnexpectedMinor),
            },
            _ => Err(CborError::UnexpectedMajor),
        }
    }
}

/// Decode exactly one top-level item, rejecting trailing bytes.
pub fn decode_exact(data: &[u8]) -> Result<CborItem, CborError> {
    let mut decoder = ItemDecoder::new(data);
    let item = decoder.decode_item()?;
    if decoder.remaining() != 0 {
        return Err(CborError::TrailingBytes);
    }
    Ok(item)
}

/// Decodes a half-precision (16-bit) floating point value.
fn decode_f16(binary: u16) -> f64 {
    let exponent = ((binary & 0x7c00) >> 10) as i32;
    let fraction = (binary & 0x03ff) as f64;
    let sign = if (binary >> 15) & 1 == 1 { -1.0 } else { 1.0 };

    if exponent == 0 {
        sign * 6.103515625e-5 * (fraction / 1024.0)
    } else if exponent == 0x1f {
        if fraction != 0.0 {
            f64::NAN
        } else {
            sign * f64::INFINITY
        }
    } else {
        sign * 2f64.powi(exponent - 15) * (1.0 + fraction / 1024.0)
    }
}
