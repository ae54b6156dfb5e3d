//! In-memory compression dictionary.
//!
//! The dictionary maps XML names to canonical CBOR items at six independent
//! scopes: namespace, element, attribute, nested element (recursively
//! chainable), and the element/attribute enum-value tables. Every mapping is
//! reversible; reverse lookups key on the item's canonical encoding so that
//! any item shape a table assigns (small integers, tagged items, …) works.
//!
//! Loading a dictionary from its file format is out of scope here; this
//! store exposes a programmatic builder used by integrators and tests.

use std::collections::HashMap;

use crate::cbor::encode_item;
use crate::item::CborItem;

fn item_key(item: &CborItem) -> Vec<u8> {
    encode_item(item)
}

/// Root of the dictionary tree: namespace URI ↔ code.
#[derive(Debug, Default)]
pub struct Dictionary {
    namespaces: HashMap<String, NamespaceEntry>,
    reverse: HashMap<Vec<u8>, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a namespace mapping and return its entry for
    /// further population.
    pub fn add_namespace(&mut self, uri: &str, code: CborItem) -> &mut NamespaceEntry {
        self.reverse.insert(item_key(&code), uri.to_owned());
        self.namespaces
            .entry(uri.to_owned())
            .or_insert_with(|| NamespaceEntry::new(uri, code.clone()))
    }

    pub fn namespace(&self, uri: &str) -> Option<&NamespaceEntry> {
        self.namespaces.get(uri)
    }

    pub fn namespace_by_item(&self, item: &CborItem) -> Option<&NamespaceEntry> {
        let uri = self.reverse.get(&item_key(item))?;
        self.namespaces.get(uri)
    }
}

/// One namespace: element name ↔ code.
#[derive(Debug)]
pub struct NamespaceEntry {
    uri: String,
    code: CborItem,
    elements: HashMap<String, ElementEntry>,
    reverse: HashMap<Vec<u8>, String>,
}

impl NamespaceEntry {
    fn new(uri: &str, code: CborItem) -> Self {
        Self {
            uri: uri.to_owned(),
            code,
            elements: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn code(&self) -> &CborItem {
        &self.code
    }

    pub fn add_element(&mut self, name: &str, code: CborItem) -> &mut ElementEntry {
        self.reverse.insert(item_key(&code), name.to_owned());
        self.elements
            .entry(name.to_owned())
            .or_insert_with(|| ElementEntry::new(name, code.clone()))
    }

    pub fn element(&self, name: &str) -> Option<&ElementEntry> {
        self.elements.get(name)
    }

    pub fn element_by_item(&self, item: &CborItem) -> Option<&ElementEntry> {
        let name = self.reverse.get(&item_key(item))?;
        self.elements.get(name)
    }
}

/// One element, or nested element (the scope is recursive): attribute,
/// nested-element, and enum-value tables.
#[derive(Debug)]
pub struct ElementEntry {
    name: String,
    code: CborItem,
    attributes: HashMap<String, AttributeEntry>,
    attributes_rev: HashMap<Vec<u8>, String>,
    nested: HashMap<String, ElementEntry>,
    nested_rev: HashMap<Vec<u8>, String>,
    enum_values: HashMap<String, CborItem>,
    enum_rev: HashMap<Vec<u8>, String>,
}

impl ElementEntry {
    fn new(name: &str, code: CborItem) -> Self {
        Self {
            name: name.to_owned(),
            code,
            attributes: HashMap::new(),
            attributes_rev: HashMap::new(),
            nested: HashMap::new(),
            nested_rev: HashMap::new(),
            enum_values: HashMap::new(),
            enum_rev: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &CborItem {
        &self.code
    }

    pub fn add_attribute(&mut self, name: &str, code: CborItem) -> &mut AttributeEntry {
        self.attributes_rev.insert(item_key(&code), name.to_owned());
        self.attributes
            .entry(name.to_owned())
            .or_insert_with(|| AttributeEntry::new(name, code.clone()))
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeEntry> {
        self.attributes.get(name)
    }

    pub fn attribute_by_item(&self, item: &CborItem) -> Option<&AttributeEntry> {
        let name = self.attributes_rev.get(&item_key(item))?;
        self.attributes.get(name)
    }

    pub fn add_nested(&mut self, name: &str, code: CborItem) -> &mut ElementEntry {
        self.nested_rev.insert(item_key(&code), name.to_owned());
        self.nested
            .entry(name.to_owned())
            .or_insert_with(|| ElementEntry::new(name, code.clone()))
    }

    pub fn nested(&self, name: &str) -> Option<&ElementEntry> {
        self.nested.get(name)
    }

    pub fn nested_by_item(&self, item: &CborItem) -> Option<&ElementEntry> {
        let name = self.nested_rev.get(&item_key(item))?;
        self.nested.get(name)
    }

    pub fn add_enum_value(&mut self, name: &str, code: CborItem) {
        self.enum_rev.insert(item_key(&code), name.to_owned());
        self.enum_values.insert(name.to_owned(), code);
    }

    pub fn enum_value(&self, name: &str) -> Option<&CborItem> {
        self.enum_values.get(name)
    }

    pub fn enum_name(&self, item: &CborItem) -> Option<&str> {
        self.enum_rev.get(&item_key(item)).map(String::as_str)
    }
}

/// One attribute: its code plus an enum-value table.
#[derive(Debug)]
pub struct AttributeEntry {
    name: String,
    code: CborItem,
    enum_values: HashMap<String, CborItem>,
    enum_rev: HashMap<Vec<u8>, String>,
}

impl AttributeEntry {
    fn new(name: &str, code: CborItem) -> Self {
        Self {
            name: name.to_owned(),
            code,
            enum_values: HashMap::new(),
            enum_rev: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &CborItem {
        &self.code
    }

    pub fn add_enum_value(&mut self, name: &str, code: CborItem) {
        self.enum_rev.insert(item_key(&code), name.to_owned());
        self.enum_values.insert(name.to_owned(), code);
    }

    pub fn enum_value(&self, name: &str) -> Option<&CborItem> {
        self.enum_values.get(name)
    }

    pub fn enum_name(&self, item: &CborItem) -> Option<&str> {
        self.enum_rev.get(&item_key(item)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        let mut dict = Dictionary::new();
        let ns = dict.add_namespace("urn:example", CborItem::Uint(0));
        let elem = ns.add_element("capability", CborItem::Uint(1));
        elem.add_attribute("name", CborItem::Uint(0));
        let nested = elem.add_nested("detail", CborItem::Uint(2));
        nested.add_nested("inner", CborItem::Uint(3));
        elem.add_enum_value("high", CborItem::Uint(7));
        dict
    }

    #[test]
    fn forward_and_reverse_agree() {
        let dict = sample();
        let ns = dict.namespace("urn:example").expect("ns");
        assert_eq!(ns.code(), &CborItem::Uint(0));
        assert_eq!(dict.namespace_by_item(&CborItem::Uint(0)).map(|n| n.uri()), Some("urn:example"));

        let elem = ns.element("capability").expect("elem");
        assert_eq!(ns.element_by_item(&CborItem::Uint(1)).map(|e| e.name()), Some("capability"));
        assert_eq!(elem.attribute_by_item(&CborItem::Uint(0)).map(|a| a.name()), Some("name"));
        assert_eq!(elem.enum_name(&CborItem::Uint(7)), Some("high"));
    }

    #[test]
    fn nested_scope_chains_recursively() {
        let dict = sample();
        let elem = dict.namespace("urn:example").and_then(|ns| ns.element("capability")).expect("elem");
        let detail = elem.nested("detail").expect("detail");
        assert!(detail.nested("inner").is_some());
        assert_eq!(detail.nested_by_item(&CborItem::Uint(3)).map(|n| n.name()), Some("inner"));
    }

    #[test]
    fn absent_names_return_none() {
        let dict = sample();
        assert!(dict.namespace("urn:other").is_none());
        assert!(dict.namespace_by_item(&CborItem::Uint(42)).is_none());
    }
}
