//! Type-checked extraction of scalar CBOR items.
//!
//! Every extractor comes in a required/optional pair over an optional item:
//! an absent required item is `MissingRequiredValue`, an absent optional one
//! is simply `None`, and a present item of the wrong shape is `TypeMismatch`
//! either way. Timestamp tags are advisory: a missing or mismatched tag is
//! logged and tolerated, never an error.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, TimeZone, Utc};
use log::debug;

use crate::cbor::{TAG_TIME_EPOCH, TAG_TIME_TEXT};
use crate::error::CodecError;
use crate::item::CborItem;

pub fn require_int(item: Option<&CborItem>, what: &'static str) -> Result<i128, CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue(what)),
        Some(it) => it.as_int().ok_or_else(|| CodecError::mismatch("integer", it)),
    }
}

pub fn opt_int(item: Option<&CborItem>) -> Result<Option<i128>, CodecError> {
    match item {
        None => Ok(None),
        Some(it) => it
            .as_int()
            .map(Some)
            .ok_or_else(|| CodecError::mismatch("integer", it)),
    }
}

pub fn require_float(item: Option<&CborItem>, what: &'static str) -> Result<f64, CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue(what)),
        Some(CborItem::Float(f)) => Ok(*f),
        Some(other) => Err(CodecError::mismatch("float", other)),
    }
}

pub fn opt_float(item: Option<&CborItem>) -> Result<Option<f64>, CodecError> {
    match item {
        None => Ok(None),
        Some(CborItem::Float(f)) => Ok(Some(*f)),
        Some(other) => Err(CodecError::mismatch("float", other)),
    }
}

pub fn require_text<'a>(item: Option<&'a CborItem>, what: &'static str) -> Result<&'a str, CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue(what)),
        Some(it) => it
            .as_text()
            .ok_or_else(|| CodecError::mismatch("text string", it)),
    }
}

pub fn opt_text<'a>(item: Option<&'a CborItem>) -> Result<Option<&'a str>, CodecError> {
    match item {
        None => Ok(None),
        Some(it) => it
            .as_text()
            .map(Some)
            .ok_or_else(|| CodecError::mismatch("text string", it)),
    }
}

pub fn require_bytes<'a>(item: Option<&'a CborItem>, what: &'static str) -> Result<&'a [u8], CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue(what)),
        Some(CborItem::Bytes(b)) => Ok(b),
        Some(other) => Err(CodecError::mismatch("byte string", other)),
    }
}

pub fn opt_bytes<'a>(item: Option<&'a CborItem>) -> Result<Option<&'a [u8]>, CodecError> {
    match item {
        None => Ok(None),
        Some(CborItem::Bytes(b)) => Ok(Some(b)),
        Some(other) => Err(CodecError::mismatch("byte string", other)),
    }
}

/// True if the present item is the CBOR null value. Calling this on an
/// absent item is a caller bug, not a soft condition.
pub fn is_null(item: Option<&CborItem>) -> Result<bool, CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue("item for null test")),
        Some(it) => Ok(it.is_null()),
    }
}

fn timestamp_from(item: &CborItem) -> Result<DateTime<Utc>, CodecError> {
    let (tag, payload) = match item {
        CborItem::Tag(tag, inner) => (Some(*tag), inner.as_ref()),
        other => (None, other),
    };
    match payload {
        CborItem::Text(text) => {
            if tag != Some(TAG_TIME_TEXT) {
                debug!("date-time text carries tag {tag:?} instead of tag 0, tolerating");
            }
            let parsed = DateTime::parse_from_rfc3339(text)
                .map_err(|_| CodecError::mismatch("RFC 3339 date-time text", payload))?;
            Ok(parsed.with_timezone(&Utc))
        }
        CborItem::Uint(_) | CborItem::Nint(_) => {
            if tag != Some(TAG_TIME_EPOCH) {
                debug!("epoch date-time carries tag {tag:?} instead of tag 1, tolerating");
            }
            let wide = payload
                .as_int()
                .ok_or_else(|| CodecError::mismatch("epoch seconds", payload))?;
            let secs = i64::try_from(wide)
                .map_err(|_| CodecError::mismatch("epoch seconds in i64 range", payload))?;
            Utc.timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| CodecError::mismatch("epoch seconds in range", payload))
        }
        other => Err(CodecError::mismatch("date-time text or epoch integer", other)),
    }
}

pub fn require_timestamp(item: Option<&CborItem>, what: &'static str) -> Result<DateTime<Utc>, CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue(what)),
        Some(it) => timestamp_from(it),
    }
}

pub fn opt_timestamp(item: Option<&CborItem>) -> Result<Option<DateTime<Utc>>, CodecError> {
    item.map(timestamp_from).transpose()
}

fn address_from(item: &CborItem) -> Result<IpAddr, CodecError> {
    match item {
        CborItem::Bytes(b) if b.len() == 4 => {
            let octets: [u8; 4] = [b[0], b[1], b[2], b[3]];
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        CborItem::Bytes(b) if b.len() == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(b);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        CborItem::Bytes(_) => Err(CodecError::TypeMismatch {
            expected: "4- or 16-byte address",
            actual: "byte string of another length",
        }),
        other => Err(CodecError::mismatch("4- or 16-byte address", other)),
    }
}

pub fn require_address(item: Option<&CborItem>, what: &'static str) -> Result<IpAddr, CodecError> {
    match item {
        None => Err(CodecError::MissingRequiredValue(what)),
        Some(it) => address_from(it),
    }
}

pub fn opt_address(item: Option<&CborItem>) -> Result<Option<IpAddr>, CodecError> {
    item.map(address_from).transpose()
}

/// Encode a timestamp as the conventional tag-0 date-time text item,
/// preserving sub-second precision.
pub fn timestamp_item(value: &DateTime<Utc>) -> CborItem {
    CborItem::tag(
        TAG_TIME_TEXT,
        CborItem::text(value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)),
    )
}

/// Encode an IP address as its 4- or 16-byte string.
pub fn address_item(addr: &IpAddr) -> CborItem {
    match addr {
        IpAddr::V4(v4) => CborItem::Bytes(v4.octets().to_vec()),
        IpAddr::V6(v6) => CborItem::Bytes(v6.octets().to_vec()),
    }
}
