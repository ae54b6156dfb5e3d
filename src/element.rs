//! Element serialization framework.
//!
//! Every protocol object serializes as the 4-slot shape
//! `[namespace, name, attributes, children]`. Namespace-inheriting nested
//! fields reuse the shape with a null namespace sentinel, or collapse to the
//! 3-slot leaf shape `[null, name, [values…]]` when they carry nothing but
//! values. The wire distinguishes the two by array length; in memory the
//! distinction is the explicit [`NestedValue`] tag.
//!
//! Types opt into the framework by implementing [`ProtocolElement`] (root
//! and full child elements) or [`NestedElement`] (namespace-inheriting
//! fields); both have default no-op hooks for attribute-free and childless
//! records.

use chrono::{DateTime, Utc};

use crate::dictionary::{AttributeEntry, Dictionary, ElementEntry};
use crate::error::CodecError;
use crate::item::CborItem;
use crate::names;
use crate::primitives;

/// A namespace-qualified protocol element.
pub trait ProtocolElement {
    fn namespace(&self) -> &str;
    fn local_name(&self) -> &str;

    /// When set, this element's child tuples are flattened into the
    /// children container without the per-child nesting level. Only
    /// sensible when every child is a fixed-arity record.
    fn splice_children(&self) -> bool {
        false
    }

    fn write_attributes(&self, _attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_children(&self, _children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        Ok(())
    }
}

/// A nested field that inherits the namespace of its enclosing element.
pub trait NestedElement {
    fn local_name(&self) -> &str;

    fn splice_children(&self) -> bool {
        false
    }

    fn write_attributes(&self, _attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_children(&self, _children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Collects the interleaved attribute-name/value items of one element.
pub struct AttributeWriter<'d> {
    scope: Option<&'d ElementEntry>,
    items: Vec<CborItem>,
}

impl<'d> AttributeWriter<'d> {
    fn new(scope: Option<&'d ElementEntry>) -> Self {
        Self { scope, items: Vec::new() }
    }

    pub fn item(&mut self, name: &str, value: CborItem) {
        let (name_item, _) = names::encode_attribute(self.scope, name);
        self.items.push(name_item);
        self.items.push(value);
    }

    pub fn text(&mut self, name: &str, value: &str) {
        self.item(name, CborItem::text(value));
    }

    pub fn int(&mut self, name: &str, value: i64) {
        self.item(name, CborItem::int(value));
    }

    pub fn uint(&mut self, name: &str, value: u64) {
        self.item(name, CborItem::Uint(value));
    }

    /// Attribute whose value lives in the attribute's enum-value table.
    pub fn enum_value(&mut self, name: &str, value: &str) {
        let (name_item, attr_entry) = names::encode_attribute(self.scope, name);
        let value_item = names::encode_attribute_enum(attr_entry, value);
        self.items.push(name_item);
        self.items.push(value_item);
    }

    pub fn timestamp(&mut self, name: &str, value: &DateTime<Utc>) {
        self.item(name, primitives::timestamp_item(value));
    }

    pub fn address(&mut self, name: &str, value: &std::net::IpAddr) {
        self.item(name, primitives::address_item(value));
    }
}

/// Collects the child tuples of one element.
pub struct ChildWriter<'d> {
    dict: Option<&'d Dictionary>,
    scope: Option<&'d ElementEntry>,
    tuples: Vec<CborItem>,
}

impl<'d> ChildWriter<'d> {
    fn new(dict: Option<&'d Dictionary>, scope: Option<&'d ElementEntry>) -> Self {
        Self { dict, scope, tuples: Vec::new() }
    }

    /// Append a full child element, resolved against its own namespace.
    pub fn element(&mut self, element: &dyn ProtocolElement) -> Result<(), CodecError> {
        let tuple = serialize_element(element, self.dict)?;
        self.tuples.push(tuple);
        Ok(())
    }

    /// Append a structural nested field: `[null, name, attrs, children]`.
    pub fn structural(&mut self, field: &dyn NestedElement) -> Result<(), CodecError> {
        let (name_item, entry) = names::encode_nested(self.scope, field.local_name());
        let mut attrs = AttributeWriter::new(entry);
        field.write_attributes(&mut attrs)?;
        let mut children = ChildWriter::new(self.dict, entry);
        field.write_children(&mut children)?;
        let kids = collapse(children.tuples, field.splice_children());
        self.tuples.push(CborItem::Array(vec![
            CborItem::Null,
            name_item,
            CborItem::Array(attrs.items),
            CborItem::Array(kids),
        ]));
        Ok(())
    }

    /// Append a leaf nested field: `[null, name, [values…]]`.
    pub fn leaf(&mut self, name: &str, values: Vec<CborItem>) {
        let (name_item, _) = names::encode_nested(self.scope, name);
        self.tuples
            .push(CborItem::Array(vec![CborItem::Null, name_item, CborItem::Array(values)]));
    }

    pub fn leaf_text(&mut self, name: &str, value: &str) {
        self.leaf(name, vec![CborItem::text(value)]);
    }

    /// Leaf whose single value lives in the nested element's enum table.
    pub fn leaf_enum(&mut self, name: &str, value: &str) {
        let (name_item, entry) = names::encode_nested(self.scope, name);
        let value_item = names::encode_element_enum(entry, value);
        self.tuples
            .push(CborItem::Array(vec![CborItem::Null, name_item, CborItem::Array(vec![value_item])]));
    }
}

fn collapse(tuples: Vec<CborItem>, splice: bool) -> Vec<CborItem> {
    if !splice {
        return tuples;
    }
    let mut flat = Vec::new();
    for tuple in tuples {
        match tuple {
            CborItem::Array(parts) => flat.extend(parts),
            other => flat.push(other),
        }
    }
    flat
}

/// Serialize one element into its 4-slot item tree.
pub fn serialize_element(
    element: &dyn ProtocolElement,
    dict: Option<&Dictionary>,
) -> Result<CborItem, CodecError> {
    if element.local_name().trim().is_empty() {
        return Err(CodecError::MissingRequiredValue("element local name"));
    }
    let (ns_item, ns_entry) = names::encode_namespace(dict, element.namespace());
    let (name_item, entry) = names::encode_element(ns_entry, element.local_name());
    let mut attrs = AttributeWriter::new(entry);
    element.write_attributes(&mut attrs)?;
    let mut children = ChildWriter::new(dict, entry);
    element.write_children(&mut children)?;
    let kids = collapse(children.tuples, element.splice_children());
    Ok(CborItem::Array(vec![
        ns_item,
        name_item,
        CborItem::Array(attrs.items),
        CborItem::Array(kids),
    ]))
}

/// Borrowed view of one 4-slot element.
pub struct RawElement<'a> {
    pub ns: &'a CborItem,
    pub name: &'a CborItem,
    pub attrs: &'a [CborItem],
    pub children: &'a [CborItem],
}

/// Validate the 4-slot shape and split it. Arity and slot-type failures
/// surface before any nested processing happens.
pub fn split_element(item: &CborItem) -> Result<RawElement<'_>, CodecError> {
    let slots = item
        .as_array()
        .ok_or(CodecError::MalformedEnvelope("top-level item is not an array"))?;
    if slots.len() != 4 {
        return Err(CodecError::MalformedEnvelope("element array must have exactly 4 slots"));
    }
    let attrs = slots[2]
        .as_array()
        .ok_or(CodecError::MalformedEnvelope("attribute slot is not an array"))?;
    let children = slots[3]
        .as_array()
        .ok_or(CodecError::MalformedEnvelope("children slot is not an array"))?;
    if attrs.len() % 2 != 0 {
        return Err(CodecError::MalformedEnvelope("attribute array has odd length"));
    }
    Ok(RawElement {
        ns: &slots[0],
        name: &slots[1],
        attrs,
        children,
    })
}

/// Resolved attribute pairs of one element.
pub struct AttributeReader<'a, 'd> {
    pairs: Vec<(String, Option<&'d AttributeEntry>, &'a CborItem)>,
}

impl<'a, 'd> AttributeReader<'a, 'd> {
    pub fn parse(
        items: &'a [CborItem],
        scope: Option<&'d ElementEntry>,
    ) -> Result<Self, CodecError> {
        if items.len() % 2 != 0 {
            return Err(CodecError::MalformedEnvelope("attribute array has odd length"));
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        for chunk in items.chunks_exact(2) {
            let (name, entry) = names::decode_attribute(scope, &chunk[0])?;
            pairs.push((name, entry, &chunk[1]));
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn find(&self, name: &str) -> Option<&(String, Option<&'d AttributeEntry>, &'a CborItem)> {
        self.pairs.iter().find(|(n, _, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&'a CborItem> {
        self.find(name).map(|(_, _, value)| *value)
    }

    /// Resolved name / raw value pairs, in wire order.
    pub fn iter<'s>(&'s self) -> impl Iterator<Item = (&'s str, &'a CborItem)> + 's {
        self.pairs.iter().map(|(name, _, value)| (name.as_str(), *value))
    }

    pub fn text(&self, name: &str) -> Result<Option<String>, CodecError> {
        Ok(primitives::opt_text(self.get(name))?.map(str::to_owned))
    }

    pub fn require_text(&self, name: &'static str) -> Result<String, CodecError> {
        Ok(primitives::require_text(self.get(name), name)?.to_owned())
    }

    pub fn int(&self, name: &str) -> Result<Option<i128>, CodecError> {
        primitives::opt_int(self.get(name))
    }

    pub fn u32(&self, name: &str) -> Result<Option<u32>, CodecError> {
        match primitives::opt_int(self.get(name))? {
            None => Ok(None),
            Some(wide) => u32::try_from(wide).map(Some).map_err(|_| CodecError::TypeMismatch {
                expected: "unsigned 32-bit integer",
                actual: "integer out of range",
            }),
        }
    }

    pub fn u64(&self, name: &str) -> Result<Option<u64>, CodecError> {
        match primitives::opt_int(self.get(name))? {
            None => Ok(None),
            Some(wide) => u64::try_from(wide).map(Some).map_err(|_| CodecError::TypeMismatch {
                expected: "unsigned 64-bit integer",
                actual: "integer out of range",
            }),
        }
    }

    pub fn timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, CodecError> {
        primitives::opt_timestamp(self.get(name))
    }

    pub fn require_timestamp(&self, name: &'static str) -> Result<DateTime<Utc>, CodecError> {
        primitives::require_timestamp(self.get(name), name)
    }

    pub fn address(&self, name: &str) -> Result<Option<std::net::IpAddr>, CodecError> {
        primitives::opt_address(self.get(name))
    }

    pub fn require_address(&self, name: &'static str) -> Result<std::net::IpAddr, CodecError> {
        primitives::require_address(self.get(name), name)
    }

    /// Resolve an enum-valued attribute through its enum table, falling
    /// back to literal text.
    pub fn enum_value(&self, name: &str) -> Result<Option<String>, CodecError> {
        match self.find(name) {
            None => Ok(None),
            Some((_, entry, value)) => names::decode_attribute_enum(*entry, value).map(Some),
        }
    }

    pub fn require_enum(&self, name: &'static str) -> Result<String, CodecError> {
        self.enum_value(name)?
            .ok_or(CodecError::MissingRequiredValue(name))
    }
}

/// One parsed child tuple.
pub enum ChildNode<'a, 'd> {
    /// Full element with its own namespace slot.
    Element(RawElement<'a>),
    /// Namespace-inheriting nested field.
    Nested(NestedNode<'a, 'd>),
}

pub struct NestedNode<'a, 'd> {
    pub name: String,
    pub entry: Option<&'d ElementEntry>,
    pub value: NestedValue<'a, 'd>,
}

/// The two nested-field shapes, tagged explicitly once the wire arity has
/// been inspected.
pub enum NestedValue<'a, 'd> {
    Leaf(&'a [CborItem]),
    Structural {
        attributes: AttributeReader<'a, 'd>,
        children: &'a [CborItem],
    },
}

impl<'a, 'd> NestedNode<'a, 'd> {
    /// Single text value of a leaf field.
    pub fn leaf_text(&self) -> Result<&'a str, CodecError> {
        match &self.value {
            NestedValue::Leaf(values) => primitives::require_text(values.first(), "leaf value"),
            NestedValue::Structural { .. } => Err(CodecError::TypeMismatch {
                expected: "leaf field",
                actual: "structural field",
            }),
        }
    }

    /// Single enum value of a leaf field, resolved through the nested
    /// element's enum table.
    pub fn leaf_enum(&self) -> Result<String, CodecError> {
        match &self.value {
            NestedValue::Leaf(values) => {
                let first = values
                    .first()
                    .ok_or(CodecError::MissingRequiredValue("leaf value"))?;
                names::decode_element_enum(self.entry, first)
            }
            NestedValue::Structural { .. } => Err(CodecError::TypeMismatch {
                expected: "leaf field",
                actual: "structural field",
            }),
        }
    }
}

/// Parse one child tuple against the enclosing element's nested scope.
///
/// A 3-item tuple is a leaf field; a 4-item tuple is either a structural
/// nested field (null namespace sentinel) or a full element.
pub fn parse_child<'a, 'd>(
    tuple: &'a CborItem,
    scope: Option<&'d ElementEntry>,
) -> Result<ChildNode<'a, 'd>, CodecError> {
    let slots = tuple
        .as_array()
        .ok_or(CodecError::MalformedEnvelope("child tuple is not an array"))?;
    match slots.len() {
        3 => {
            if !slots[0].is_null() {
                return Err(CodecError::MalformedEnvelope(
                    "leaf field must carry the null namespace sentinel",
                ));
            }
            let (name, entry) = names::decode_nested(scope, &slots[1])?;
            let values = slots[2]
                .as_array()
                .ok_or(CodecError::MalformedEnvelope("leaf value slot is not an array"))?;
            Ok(ChildNode::Nested(NestedNode {
                name,
                entry,
                value: NestedValue::Leaf(values),
            }))
        }
        4 => {
            if slots[0].is_null() {
                let (name, entry) = names::decode_nested(scope, &slots[1])?;
                let raw = split_element(tuple)?;
                Ok(ChildNode::Nested(NestedNode {
                    name,
                    entry,
                    value: NestedValue::Structural {
                        attributes: AttributeReader::parse(raw.attrs, entry)?,
                        children: raw.children,
                    },
                }))
            } else {
                Ok(ChildNode::Element(split_element(tuple)?))
            }
        }
        _ => Err(CodecError::MalformedEnvelope("child tuple must have 3 or 4 slots")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leafy;

    impl ProtocolElement for Leafy {
        fn namespace(&self) -> &str {
            "urn:test"
        }

        fn local_name(&self) -> &str {
            "leafy"
        }

        fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
            attrs.text("kind", "demo");
            Ok(())
        }

        fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
            children.leaf_text("name", "value-1");
            Ok(())
        }
    }

    struct Hollow;

    impl ProtocolElement for Hollow {
        fn namespace(&self) -> &str {
            "urn:test"
        }

        fn local_name(&self) -> &str {
            "hollow"
        }
    }

    #[test]
    fn four_slot_shape_with_literal_names() {
        let item = serialize_element(&Leafy, None).expect("serialize");
        let raw = split_element(&item).expect("split");
        assert_eq!(raw.ns, &CborItem::text("urn:test"));
        assert_eq!(raw.name, &CborItem::text("leafy"));
        assert_eq!(raw.attrs.len(), 2);
        assert_eq!(raw.children.len(), 1);
        match parse_child(&raw.children[0], None).expect("child") {
            ChildNode::Nested(node) => {
                assert_eq!(node.name, "name");
                assert_eq!(node.leaf_text().expect("text"), "value-1");
            }
            ChildNode::Element(_) => panic!("expected nested leaf"),
        }
    }

    #[test]
    fn default_hooks_emit_empty_containers() {
        let item = serialize_element(&Hollow, None).expect("serialize");
        let raw = split_element(&item).expect("split");
        assert!(raw.attrs.is_empty());
        assert!(raw.children.is_empty());
    }

    #[test]
    fn blank_local_name_is_rejected() {
        struct Nameless;
        impl ProtocolElement for Nameless {
            fn namespace(&self) -> &str {
                "urn:test"
            }
            fn local_name(&self) -> &str {
                "  "
            }
        }
        assert!(matches!(
            serialize_element(&Nameless, None),
            Err(CodecError::MissingRequiredValue(_)),
        ));
    }

    #[test]
    fn envelope_arity_is_checked_first() {
        let short = CborItem::Array(vec![CborItem::Null, CborItem::text("x")]);
        assert!(matches!(split_element(&short), Err(CodecError::MalformedEnvelope(_))));
        let bad_attrs = CborItem::Array(vec![
            CborItem::text("urn:test"),
            CborItem::text("x"),
            CborItem::Uint(0),
            CborItem::Array(vec![]),
        ]);
        assert!(matches!(split_element(&bad_attrs), Err(CodecError::MalformedEnvelope(_))));
    }

    #[test]
    fn odd_attribute_array_is_rejected() {
        let item = CborItem::Array(vec![
            CborItem::text("urn:test"),
            CborItem::text("x"),
            CborItem::Array(vec![CborItem::text("lonely")]),
            CborItem::Array(vec![]),
        ]);
        assert!(matches!(split_element(&item), Err(CodecError::MalformedEnvelope(_))));
    }

    #[test]
    fn child_arity_distinguishes_leaf_from_structural() {
        struct Mixed;
        impl ProtocolElement for Mixed {
            fn namespace(&self) -> &str {
                "urn:test"
            }
            fn local_name(&self) -> &str {
                "mixed"
            }
            fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
                children.leaf_text("plain", "v");
                struct Info;
                impl NestedElement for Info {
                    fn local_name(&self) -> &str {
                        "info"
                    }
                    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
                        attrs.text("type", "t");
                        Ok(())
                    }
                }
                children.structural(&Info)
            }
        }
        let item = serialize_element(&Mixed, None).expect("serialize");
        let raw = split_element(&item).expect("split");
        assert_eq!(raw.children.len(), 2);
        let leaf = parse_child(&raw.children[0], None).expect("leaf");
        assert!(matches!(leaf, ChildNode::Nested(NestedNode { value: NestedValue::Leaf(_), .. })));
        let structural = parse_child(&raw.children[1], None).expect("structural");
        match structural {
            ChildNode::Nested(NestedNode { value: NestedValue::Structural { attributes, .. }, .. }) => {
                assert_eq!(attributes.text("type").expect("attr"), Some("t".to_owned()));
            }
            _ => panic!("expected structural nested field"),
        }
    }

    #[test]
    fn enum_valued_leaf_resolves_through_the_nested_table() {
        use crate::dictionary::Dictionary;

        let mut dict = Dictionary::new();
        let ns = dict.add_namespace("urn:test", CborItem::Uint(0));
        let elem = ns.add_element("alarm", CborItem::Uint(0));
        let level = elem.add_nested("level", CborItem::Uint(0));
        level.add_enum_value("high", CborItem::Uint(2));

        struct Alarm;
        impl ProtocolElement for Alarm {
            fn namespace(&self) -> &str {
                "urn:test"
            }
            fn local_name(&self) -> &str {
                "alarm"
            }
            fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
                children.leaf_enum("level", "high");
                Ok(())
            }
        }

        let item = serialize_element(&Alarm, Some(&dict)).expect("serialize");
        let raw = split_element(&item).expect("split");
        let entry = dict.namespace("urn:test").and_then(|n| n.element("alarm"));
        match parse_child(&raw.children[0], entry).expect("child") {
            ChildNode::Nested(node) => {
                // The value travels as the table's code, not as text.
                assert!(matches!(&node.value, NestedValue::Leaf(values) if values[0] == CborItem::Uint(2)));
                assert_eq!(node.leaf_enum().expect("enum"), "high");
            }
            ChildNode::Element(_) => panic!("expected leaf"),
        }
    }

    #[test]
    fn splice_flattens_child_tuples() {
        struct Spliced;
        impl ProtocolElement for Spliced {
            fn namespace(&self) -> &str {
                "urn:test"
            }
            fn local_name(&self) -> &str {
                "spliced"
            }
            fn splice_children(&self) -> bool {
                true
            }
            fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
                children.element(&Hollow)?;
                children.element(&Hollow)
            }
        }
        let item = serialize_element(&Spliced, None).expect("serialize");
        let raw = split_element(&item).expect("split");
        // Two 4-slot children flattened into eight consecutive items.
        assert_eq!(raw.children.len(), 8);
        assert_eq!(raw.children[0], CborItem::text("urn:test"));
    }
}
