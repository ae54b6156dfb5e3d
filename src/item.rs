//! [`CborItem`], the owned CBOR data item tree.
//!
//! Every value that crosses the wire is modeled as one of these variants.
//! Negative integers keep their raw wire magnitude so that dictionary codes
//! survive a decode/encode cycle byte for byte.

/// A single CBOR data item (RFC 8949).
#[derive(Debug, Clone, PartialEq)]
pub enum CborItem {
    /// The null simple value (0xf6).
    Null,
    Bool(bool),
    /// Major type 0, unsigned integer.
    Uint(u64),
    /// Major type 1, negative integer. The stored value is the raw wire
    /// argument; the denoted integer is `-1 - raw`.
    Nint(u64),
    /// Any of the three float widths, normalized to an `f64`.
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<CborItem>),
    Map(Vec<(CborItem, CborItem)>),
    Tag(u64, Box<CborItem>),
}

impl CborItem {
    pub fn text(value: impl Into<String>) -> Self {
        CborItem::Text(value.into())
    }

    pub fn int(value: i64) -> Self {
        if value >= 0 {
            CborItem::Uint(value as u64)
        } else {
            CborItem::Nint((-1i64).wrapping_sub(value) as u64)
        }
    }

    pub fn tag(tag: u64, item: CborItem) -> Self {
        CborItem::Tag(tag, Box::new(item))
    }

    /// Denoted integer value, widened so the full `Nint` range fits.
    pub fn as_int(&self) -> Option<i128> {
        match self {
            CborItem::Uint(u) => Some(*u as i128),
            CborItem::Nint(raw) => Some(-1i128 - *raw as i128),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CborItem::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CborItem]> {
        match self {
            CborItem::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CborItem::Null)
    }

    /// Human-readable item kind, used in `TypeMismatch` messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CborItem::Null => "null",
            CborItem::Bool(_) => "boolean",
            CborItem::Uint(_) => "unsigned integer",
            CborItem::Nint(_) => "negative integer",
            CborItem::Float(_) => "float",
            CborItem::Bytes(_) => "byte string",
            CborItem::Text(_) => "text string",
            CborItem::Array(_) => "array",
            CborItem::Map(_) => "map",
            CborItem::Tag(_, _) => "tagged item",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_constructor_splits_majors() {
        assert_eq!(CborItem::int(0), CborItem::Uint(0));
        assert_eq!(CborItem::int(23), CborItem::Uint(23));
        assert_eq!(CborItem::int(-1), CborItem::Nint(0));
        assert_eq!(CborItem::int(-500), CborItem::Nint(499));
    }

    #[test]
    fn as_int_widens_nint() {
        assert_eq!(CborItem::Nint(u64::MAX).as_int(), Some(-1i128 - u64::MAX as i128));
        assert_eq!(CborItem::Uint(u64::MAX).as_int(), Some(u64::MAX as i128));
        assert_eq!(CborItem::Text("1".into()).as_int(), None);
    }
}
