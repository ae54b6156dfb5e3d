//! Name mapper: dictionary-mediated name compression with literal fallback.
//!
//! Encoding a name never fails: a dictionary hit emits the table's canonical
//! item, a miss emits the literal XML name as a text item and logs one
//! diagnostic. Decoding tries the reverse table first; on a miss the
//! received item must itself be literal text, otherwise the name is
//! unresolvable.

use log::debug;

use crate::dictionary::{AttributeEntry, Dictionary, ElementEntry, NamespaceEntry};
use crate::error::CodecError;
use crate::item::CborItem;

fn fallback(scope: &'static str, name: &str) -> CborItem {
    debug!("dictionary miss for {scope} `{name}`, emitting literal text");
    CborItem::text(name)
}

pub fn encode_namespace<'d>(
    dict: Option<&'d Dictionary>,
    uri: &str,
) -> (CborItem, Option<&'d NamespaceEntry>) {
    match dict.and_then(|d| d.namespace(uri)) {
        Some(entry) => (entry.code().clone(), Some(entry)),
        None => (fallback("namespace", uri), None),
    }
}

pub fn encode_element<'d>(
    ns: Option<&'d NamespaceEntry>,
    name: &str,
) -> (CborItem, Option<&'d ElementEntry>) {
    match ns.and_then(|n| n.element(name)) {
        Some(entry) => (entry.code().clone(), Some(entry)),
        None => (fallback("element", name), None),
    }
}

pub fn encode_attribute<'d>(
    elem: Option<&'d ElementEntry>,
    name: &str,
) -> (CborItem, Option<&'d AttributeEntry>) {
    match elem.and_then(|e| e.attribute(name)) {
        Some(entry) => (entry.code().clone(), Some(entry)),
        None => (fallback("attribute", name), None),
    }
}

pub fn encode_nested<'d>(
    elem: Option<&'d ElementEntry>,
    name: &str,
) -> (CborItem, Option<&'d ElementEntry>) {
    match elem.and_then(|e| e.nested(name)) {
        Some(entry) => (entry.code().clone(), Some(entry)),
        None => (fallback("nested element", name), None),
    }
}

pub fn encode_element_enum(elem: Option<&ElementEntry>, value: &str) -> CborItem {
    match elem.and_then(|e| e.enum_value(value)) {
        Some(code) => code.clone(),
        None => fallback("element enum value", value),
    }
}

pub fn encode_attribute_enum(attr: Option<&AttributeEntry>, value: &str) -> CborItem {
    match attr.and_then(|a| a.enum_value(value)) {
        Some(code) => code.clone(),
        None => fallback("attribute enum value", value),
    }
}

fn literal<'a>(item: &'a CborItem, scope: &'static str) -> Result<&'a str, CodecError> {
    item.as_text().ok_or(CodecError::UnresolvableName { scope })
}

pub fn decode_namespace<'d>(
    dict: Option<&'d Dictionary>,
    item: &CborItem,
) -> Result<(String, Option<&'d NamespaceEntry>), CodecError> {
    if let Some(entry) = dict.and_then(|d| d.namespace_by_item(item)) {
        return Ok((entry.uri().to_owned(), Some(entry)));
    }
    let uri = literal(item, "namespace")?;
    Ok((uri.to_owned(), dict.and_then(|d| d.namespace(uri))))
}

pub fn decode_element<'d>(
    ns: Option<&'d NamespaceEntry>,
    item: &CborItem,
) -> Result<(String, Option<&'d ElementEntry>), CodecError> {
    if let Some(entry) = ns.and_then(|n| n.element_by_item(item)) {
        return Ok((entry.name().to_owned(), Some(entry)));
    }
    let name = literal(item, "element")?;
    Ok((name.to_owned(), ns.and_then(|n| n.element(name))))
}

pub fn decode_attribute<'d>(
    elem: Option<&'d ElementEntry>,
    item: &CborItem,
) -> Result<(String, Option<&'d AttributeEntry>), CodecError> {
    if let Some(entry) = elem.and_then(|e| e.attribute_by_item(item)) {
        return Ok((entry.name().to_owned(), Some(entry)));
    }
    let name = literal(item, "attribute")?;
    Ok((name.to_owned(), elem.and_then(|e| e.attribute(name))))
}

pub fn decode_nested<'d>(
    elem: Option<&'d ElementEntry>,
    item: &CborItem,
) -> Result<(String, Option<&'d ElementEntry>), CodecError> {
    if let Some(entry) = elem.and_then(|e| e.nested_by_item(item)) {
        return Ok((entry.name().to_owned(), Some(entry)));
    }
    let name = literal(item, "nested element")?;
    Ok((name.to_owned(), elem.and_then(|e| e.nested(name))))
}

pub fn decode_element_enum(
    elem: Option<&ElementEntry>,
    item: &CborItem,
) -> Result<String, CodecError> {
    if let Some(name) = elem.and_then(|e| e.enum_name(item)) {
        return Ok(name.to_owned());
    }
    Ok(literal(item, "element enum value")?.to_owned())
}

pub fn decode_attribute_enum(
    attr: Option<&AttributeEntry>,
    item: &CborItem,
) -> Result<String, CodecError> {
    if let Some(name) = attr.and_then(|a| a.enum_name(item)) {
        return Ok(name.to_owned());
    }
    Ok(literal(item, "attribute enum value")?.to_owned())
}

/// Lenient element-entry resolution for registry dispatch: reverse lookup
/// first, then forward by literal name; an unresolvable pair is `None`, not
/// an error.
pub fn resolve_element_entry<'d>(
    dict: Option<&'d Dictionary>,
    ns_item: &CborItem,
    name_item: &CborItem,
) -> Option<&'d ElementEntry> {
    let d = dict?;
    let ns = d
        .namespace_by_item(ns_item)
        .or_else(|| ns_item.as_text().and_then(|uri| d.namespace(uri)))?;
    ns.element_by_item(name_item)
        .or_else(|| name_item.as_text().and_then(|name| ns.element(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        let mut dict = Dictionary::new();
        let ns = dict.add_namespace("urn:example", CborItem::Uint(0));
        let elem = ns.add_element("event", CborItem::Uint(4));
        let attr = elem.add_attribute("significance", CborItem::Uint(1));
        attr.add_enum_value("critical", CborItem::Uint(0));
        dict
    }

    #[test]
    fn hit_emits_canonical_code() {
        let dict = dict();
        let (item, entry) = encode_namespace(Some(&dict), "urn:example");
        assert_eq!(item, CborItem::Uint(0));
        assert!(entry.is_some());
    }

    #[test]
    fn miss_falls_back_to_literal_text() {
        let dict = dict();
        let (item, entry) = encode_namespace(Some(&dict), "urn:unknown");
        assert_eq!(item, CborItem::text("urn:unknown"));
        assert!(entry.is_none());

        let (name, _) = decode_namespace(Some(&dict), &item).expect("literal decode");
        assert_eq!(name, "urn:unknown");
    }

    #[test]
    fn reverse_miss_requires_literal_text() {
        let dict = dict();
        let err = decode_namespace(Some(&dict), &CborItem::Uint(99)).unwrap_err();
        assert!(matches!(err, CodecError::UnresolvableName { scope: "namespace" }));
    }

    #[test]
    fn literal_name_still_recovers_dictionary_entry() {
        let dict = dict();
        // Wire carried the literal URI even though the table knows it.
        let (_, entry) = decode_namespace(Some(&dict), &CborItem::text("urn:example")).expect("decode");
        assert!(entry.is_some());
    }

    #[test]
    fn attribute_enum_values_roundtrip_through_codes() {
        let dict = dict();
        let elem = dict.namespace("urn:example").and_then(|n| n.element("event"));
        let (_, attr) = encode_attribute(elem, "significance");
        let code = encode_attribute_enum(attr, "critical");
        assert_eq!(code, CborItem::Uint(0));
        assert_eq!(decode_attribute_enum(attr, &code).expect("decode"), "critical");
    }

    #[test]
    fn lenient_resolution_returns_none_for_unknown() {
        let dict = dict();
        let entry = resolve_element_entry(Some(&dict), &CborItem::text("urn:nope"), &CborItem::text("event"));
        assert!(entry.is_none());
        let entry = resolve_element_entry(Some(&dict), &CborItem::Uint(0), &CborItem::Uint(4));
        assert!(entry.is_some());
    }
}
