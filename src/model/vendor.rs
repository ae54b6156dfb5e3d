//! Generic element tree for vendor extensions.
//!
//! Vendor-registered bindings decode into this shape when no dedicated
//! struct exists on the Rust side. It carries attributes and leaf children
//! verbatim, so it round-trips with or without a dictionary.

use crate::element::{AttributeWriter, ChildNode, ChildWriter, NestedValue, ProtocolElement};
use crate::error::CodecError;
use crate::item::CborItem;
use crate::registry::DeserializeInput;

#[derive(Debug, Clone, PartialEq)]
pub struct VendorElement {
    pub namespace: String,
    pub local_name: String,
    /// Attribute name/value pairs, in wire order.
    pub attributes: Vec<(String, CborItem)>,
    /// Leaf children: name plus raw value items.
    pub leaves: Vec<(String, Vec<CborItem>)>,
}

impl VendorElement {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
            attributes: Vec::new(),
            leaves: Vec::new(),
        }
    }

    /// Rebuild from the wire slots of one element. The registered names are
    /// supplied by the binding closure, which knows what it was bound to.
    pub fn deserialize(
        input: &DeserializeInput<'_, '_>,
        namespace: &str,
        local_name: &str,
    ) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        let attributes = attrs
            .iter()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();
        let mut leaves = Vec::new();
        for node in input.child_nodes() {
            match node? {
                ChildNode::Nested(nested) => match nested.value {
                    NestedValue::Leaf(values) => {
                        leaves.push((nested.name, values.to_vec()));
                    }
                    NestedValue::Structural { .. } => {
                        return Err(CodecError::TypeMismatch {
                            expected: "leaf field",
                            actual: "structural field",
                        })
                    }
                },
                ChildNode::Element(_) => {
                    return Err(CodecError::TypeMismatch {
                        expected: "nested field",
                        actual: "full element",
                    })
                }
            }
        }
        Ok(Self {
            namespace: namespace.to_owned(),
            local_name: local_name.to_owned(),
            attributes,
            leaves,
        })
    }
}

impl ProtocolElement for VendorElement {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn local_name(&self) -> &str {
        &self.local_name
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        for (name, value) in &self.attributes {
            attrs.item(name, value.clone());
        }
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        for (name, values) in &self.leaves {
            children.leaf(name, values.clone());
        }
        Ok(())
    }
}
