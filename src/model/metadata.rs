//! The standard IFMAP-METADATA/2 vocabulary.
//!
//! Every metadata type carries the operational attributes
//! (`ifmap-publisher-id`, `ifmap-timestamp`) plus its fixed
//! `ifmap-cardinality`, then its own fields. Scalar fields travel as
//! attribute pairs; `location` shows the structural nested-field shape and
//! the metadata container inside publish operations and result items shows
//! the spliced children shape.

use chrono::{DateTime, Utc};

use crate::codec::CodecContext;
use crate::element::{
    AttributeReader, AttributeWriter, ChildNode, ChildWriter, NestedElement, NestedNode,
    NestedValue, ProtocolElement,
};
use crate::error::CodecError;
use crate::item::CborItem;
use crate::model::vendor::VendorElement;
use crate::model::IFMAP_METADATA_NS;
use crate::names;
use crate::registry::{DeserializeInput, RegistryState, TypeKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    SingleValue,
    MultiValue,
}

impl Cardinality {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Cardinality::SingleValue => "singleValue",
            Cardinality::MultiValue => "multiValue",
        }
    }
}

/// Operational attributes stamped onto published metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationalAttributes {
    pub publisher_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl OperationalAttributes {
    fn write(&self, attrs: &mut AttributeWriter<'_>, cardinality: Cardinality) {
        if let Some(publisher) = &self.publisher_id {
            attrs.text("ifmap-publisher-id", publisher);
        }
        if let Some(timestamp) = &self.timestamp {
            attrs.timestamp("ifmap-timestamp", timestamp);
        }
        attrs.enum_value("ifmap-cardinality", cardinality.wire_name());
    }

    fn read(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            publisher_id: attrs.text("ifmap-publisher-id")?,
            timestamp: attrs.timestamp("ifmap-timestamp")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    Capability(Capability),
    Role(Role),
    DeviceAttribute(DeviceAttribute),
    DeviceCharacteristic(DeviceCharacteristic),
    DeviceIp(DeviceIp),
    Event(Event),
    IpMac(IpMac),
    Layer2Information(Layer2Information),
    Location(Location),
    RequestForInvestigation(RequestForInvestigation),
    Extension(VendorElement),
}

impl Metadata {
    pub fn as_element(&self) -> &dyn ProtocolElement {
        match self {
            Metadata::Capability(m) => m,
            Metadata::Role(m) => m,
            Metadata::DeviceAttribute(m) => m,
            Metadata::DeviceCharacteristic(m) => m,
            Metadata::DeviceIp(m) => m,
            Metadata::Event(m) => m,
            Metadata::IpMac(m) => m,
            Metadata::Layer2Information(m) => m,
            Metadata::Location(m) => m,
            Metadata::RequestForInvestigation(m) => m,
            Metadata::Extension(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    pub operational: OperationalAttributes,
    pub name: String,
    pub administrative_domain: Option<String>,
}

impl Capability {
    pub const TYPE_KEY: TypeKey = TypeKey("capability");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            name: attrs.require_text("name")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for Capability {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "capability"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("name", &self.name);
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub operational: OperationalAttributes,
    pub name: String,
    pub administrative_domain: Option<String>,
}

impl Role {
    pub const TYPE_KEY: TypeKey = TypeKey("role");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            name: attrs.require_text("name")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for Role {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "role"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("name", &self.name);
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceAttribute {
    pub operational: OperationalAttributes,
    pub name: String,
}

impl DeviceAttribute {
    pub const TYPE_KEY: TypeKey = TypeKey("device-attribute");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            name: attrs.require_text("name")?,
        })
    }
}

impl ProtocolElement for DeviceAttribute {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "device-attribute"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("name", &self.name);
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCharacteristic {
    pub operational: OperationalAttributes,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub device_type: Option<String>,
    pub discovered_time: DateTime<Utc>,
    pub discoverer_id: String,
    pub discovery_method: String,
}

impl DeviceCharacteristic {
    pub const TYPE_KEY: TypeKey = TypeKey("device-characteristic");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            manufacturer: attrs.text("manufacturer")?,
            model: attrs.text("model")?,
            os: attrs.text("os")?,
            os_version: attrs.text("os-version")?,
            device_type: attrs.text("device-type")?,
            discovered_time: attrs.require_timestamp("discovered-time")?,
            discoverer_id: attrs.require_text("discoverer-id")?,
            discovery_method: attrs.require_text("discovery-method")?,
        })
    }
}

impl ProtocolElement for DeviceCharacteristic {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "device-characteristic"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        if let Some(manufacturer) = &self.manufacturer {
            attrs.text("manufacturer", manufacturer);
        }
        if let Some(model) = &self.model {
            attrs.text("model", model);
        }
        if let Some(os) = &self.os {
            attrs.text("os", os);
        }
        if let Some(os_version) = &self.os_version {
            attrs.text("os-version", os_version);
        }
        if let Some(device_type) = &self.device_type {
            attrs.text("device-type", device_type);
        }
        attrs.timestamp("discovered-time", &self.discovered_time);
        attrs.text("discoverer-id", &self.discoverer_id);
        attrs.text("discovery-method", &self.discovery_method);
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

/// Link metadata with no fields of its own; exercises the default hooks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceIp {
    pub operational: OperationalAttributes,
}

impl DeviceIp {
    pub const TYPE_KEY: TypeKey = TypeKey("device-ip");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
        })
    }
}

impl ProtocolElement for DeviceIp {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "device-ip"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        self.operational.write(attrs, Cardinality::SingleValue);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    Critical,
    Important,
    Informational,
}

impl Significance {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Significance::Critical => "critical",
            Significance::Important => "important",
            Significance::Informational => "informational",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "critical" => Significance::Critical,
            "important" => Significance::Important,
            "informational" => Significance::Informational,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    P2p,
    Cve,
    BotnetInfected,
    WormInfected,
    ExcessiveFlows,
    BehavioralChange,
    PolicyViolation,
    Other,
}

impl EventType {
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventType::P2p => "p2p",
            EventType::Cve => "cve",
            EventType::BotnetInfected => "botnet infected",
            EventType::WormInfected => "worm infected",
            EventType::ExcessiveFlows => "excessive flows",
            EventType::BehavioralChange => "behavioral change",
            EventType::PolicyViolation => "policy violation",
            EventType::Other => "other",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "p2p" => EventType::P2p,
            "cve" => EventType::Cve,
            "botnet infected" => EventType::BotnetInfected,
            "worm infected" => EventType::WormInfected,
            "excessive flows" => EventType::ExcessiveFlows,
            "behavioral change" => EventType::BehavioralChange,
            "policy violation" => EventType::PolicyViolation,
            "other" => EventType::Other,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub operational: OperationalAttributes,
    pub name: String,
    pub discovered_time: DateTime<Utc>,
    pub discoverer_id: String,
    /// 0–100.
    pub magnitude: u32,
    /// 0–100.
    pub confidence: u32,
    pub significance: Significance,
    pub event_type: Option<EventType>,
    pub other_type_definition: Option<String>,
    pub information: Option<String>,
    pub vulnerability_uri: Option<String>,
}

impl Event {
    pub const TYPE_KEY: TypeKey = TypeKey("event");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        let significance_name = attrs.require_enum("significance")?;
        let significance = Significance::from_wire(&significance_name)
            .ok_or(CodecError::UnresolvableName { scope: "event significance" })?;
        let event_type = match attrs.enum_value("type")? {
            None => None,
            Some(name) => Some(
                EventType::from_wire(&name)
                    .ok_or(CodecError::UnresolvableName { scope: "event type" })?,
            ),
        };
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            name: attrs.require_text("name")?,
            discovered_time: attrs.require_timestamp("discovered-time")?,
            discoverer_id: attrs.require_text("discoverer-id")?,
            magnitude: attrs
                .u32("magnitude")?
                .ok_or(CodecError::MissingRequiredValue("magnitude"))?,
            confidence: attrs
                .u32("confidence")?
                .ok_or(CodecError::MissingRequiredValue("confidence"))?,
            significance,
            event_type,
            other_type_definition: attrs.text("other-type-definition")?,
            information: attrs.text("information")?,
            vulnerability_uri: attrs.text("vulnerability-uri")?,
        })
    }
}

impl ProtocolElement for Event {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "event"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("name", &self.name);
        attrs.timestamp("discovered-time", &self.discovered_time);
        attrs.text("discoverer-id", &self.discoverer_id);
        attrs.uint("magnitude", self.magnitude as u64);
        attrs.uint("confidence", self.confidence as u64);
        attrs.enum_value("significance", self.significance.wire_name());
        if let Some(event_type) = &self.event_type {
            attrs.enum_value("type", event_type.wire_name());
        }
        if let Some(def) = &self.other_type_definition {
            attrs.text("other-type-definition", def);
        }
        if let Some(information) = &self.information {
            attrs.text("information", information);
        }
        if let Some(uri) = &self.vulnerability_uri {
            attrs.text("vulnerability-uri", uri);
        }
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IpMac {
    pub operational: OperationalAttributes,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub dhcp_server: Option<String>,
}

impl IpMac {
    pub const TYPE_KEY: TypeKey = TypeKey("ip-mac");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            start_time: attrs.timestamp("start-time")?,
            end_time: attrs.timestamp("end-time")?,
            dhcp_server: attrs.text("dhcp-server")?,
        })
    }
}

impl ProtocolElement for IpMac {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "ip-mac"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        if let Some(start) = &self.start_time {
            attrs.timestamp("start-time", start);
        }
        if let Some(end) = &self.end_time {
            attrs.timestamp("end-time", end);
        }
        if let Some(server) = &self.dhcp_server {
            attrs.text("dhcp-server", server);
        }
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer2Information {
    pub operational: OperationalAttributes,
    pub vlan: Option<u32>,
    pub vlan_name: Option<String>,
    pub port: Option<u32>,
    pub administrative_domain: Option<String>,
}

impl Layer2Information {
    pub const TYPE_KEY: TypeKey = TypeKey("layer2-information");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            vlan: attrs.u32("vlan")?,
            vlan_name: attrs.text("vlan-name")?,
            port: attrs.u32("port")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for Layer2Information {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "layer2-information"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        if let Some(vlan) = self.vlan {
            attrs.uint("vlan", vlan as u64);
        }
        if let Some(vlan_name) = &self.vlan_name {
            attrs.text("vlan-name", vlan_name);
        }
        if let Some(port) = self.port {
            attrs.uint("port", port as u64);
        }
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationInformation {
    pub location_type: String,
    pub value: String,
}

impl NestedElement for LocationInformation {
    fn local_name(&self) -> &str {
        "location-information"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("type", &self.location_type);
        attrs.text("value", &self.value);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub operational: OperationalAttributes,
    pub discovered_time: DateTime<Utc>,
    pub discoverer_id: String,
    pub location_information: Vec<LocationInformation>,
}

impl Location {
    pub const TYPE_KEY: TypeKey = TypeKey("location");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        let mut location_information = Vec::new();
        for node in input.child_nodes() {
            if let ChildNode::Nested(nested) = node? {
                if nested.name != "location-information" {
                    continue;
                }
                match nested.value {
                    NestedValue::Structural { attributes, .. } => {
                        location_information.push(LocationInformation {
                            location_type: attributes.require_text("type")?,
                            value: attributes.require_text("value")?,
                        });
                    }
                    NestedValue::Leaf(_) => {
                        return Err(CodecError::TypeMismatch {
                            expected: "structural field",
                            actual: "leaf field",
                        })
                    }
                }
            }
        }
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            discovered_time: attrs.require_timestamp("discovered-time")?,
            discoverer_id: attrs.require_text("discoverer-id")?,
            location_information,
        })
    }
}

impl ProtocolElement for Location {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "location"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.timestamp("discovered-time", &self.discovered_time);
        attrs.text("discoverer-id", &self.discoverer_id);
        self.operational.write(attrs, Cardinality::MultiValue);
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        for info in &self.location_information {
            children.structural(info)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestForInvestigation {
    pub operational: OperationalAttributes,
    pub qualifier: Option<String>,
}

impl RequestForInvestigation {
    pub const TYPE_KEY: TypeKey = TypeKey("request-for-investigation");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            operational: OperationalAttributes::read(&attrs)?,
            qualifier: attrs.text("qualifier")?,
        })
    }
}

impl ProtocolElement for RequestForInvestigation {
    fn namespace(&self) -> &str {
        IFMAP_METADATA_NS
    }

    fn local_name(&self) -> &str {
        "request-for-investigation"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        if let Some(qualifier) = &self.qualifier {
            attrs.text("qualifier", qualifier);
        }
        self.operational.write(attrs, Cardinality::SingleValue);
        Ok(())
    }
}

pub(crate) fn seed_metadata(state: &mut RegistryState<Metadata>) {
    state.bind(
        Capability::TYPE_KEY,
        IFMAP_METADATA_NS,
        "capability",
        Box::new(|input| Capability::deserialize(input).map(Metadata::Capability)),
    );
    state.bind(
        Role::TYPE_KEY,
        IFMAP_METADATA_NS,
        "role",
        Box::new(|input| Role::deserialize(input).map(Metadata::Role)),
    );
    state.bind(
        DeviceAttribute::TYPE_KEY,
        IFMAP_METADATA_NS,
        "device-attribute",
        Box::new(|input| DeviceAttribute::deserialize(input).map(Metadata::DeviceAttribute)),
    );
    state.bind(
        DeviceCharacteristic::TYPE_KEY,
        IFMAP_METADATA_NS,
        "device-characteristic",
        Box::new(|input| {
            DeviceCharacteristic::deserialize(input).map(Metadata::DeviceCharacteristic)
        }),
    );
    state.bind(
        DeviceIp::TYPE_KEY,
        IFMAP_METADATA_NS,
        "device-ip",
        Box::new(|input| DeviceIp::deserialize(input).map(Metadata::DeviceIp)),
    );
    state.bind(
        Event::TYPE_KEY,
        IFMAP_METADATA_NS,
        "event",
        Box::new(|input| Event::deserialize(input).map(Metadata::Event)),
    );
    state.bind(
        IpMac::TYPE_KEY,
        IFMAP_METADATA_NS,
        "ip-mac",
        Box::new(|input| IpMac::deserialize(input).map(Metadata::IpMac)),
    );
    state.bind(
        Layer2Information::TYPE_KEY,
        IFMAP_METADATA_NS,
        "layer2-information",
        Box::new(|input| Layer2Information::deserialize(input).map(Metadata::Layer2Information)),
    );
    state.bind(
        Location::TYPE_KEY,
        IFMAP_METADATA_NS,
        "location",
        Box::new(|input| Location::deserialize(input).map(Metadata::Location)),
    );
    state.bind(
        RequestForInvestigation::TYPE_KEY,
        IFMAP_METADATA_NS,
        "request-for-investigation",
        Box::new(|input| {
            RequestForInvestigation::deserialize(input).map(Metadata::RequestForInvestigation)
        }),
    );
}

/// Decode one full metadata element through the metadata registry.
pub(crate) fn decode_metadata_parts(
    ctx: &CodecContext,
    ns_item: &CborItem,
    name_item: &CborItem,
    attrs: &[CborItem],
    children: &[CborItem],
) -> Result<Metadata, CodecError> {
    let dict = ctx.dictionary();
    let (ns, ns_entry) = names::decode_namespace(dict, ns_item)?;
    let (name, _) = names::decode_element(ns_entry, name_item)?;
    let target = ctx
        .metadata
        .resolve_target_class(&ns, &name)
        .ok_or(CodecError::UnresolvableName { scope: "metadata" })?;
    ctx.metadata
        .deserialize(dict, ns_item, name_item, attrs, children, target)
}

/// The `metadata` container inside publish operations and result items.
/// Its children are sibling metadata records, so the container splices
/// their tuples into one flat run of 4-slot groups.
pub(crate) struct MetadataList<'a>(pub &'a [Metadata]);

impl NestedElement for MetadataList<'_> {
    fn local_name(&self) -> &str {
        "metadata"
    }

    fn splice_children(&self) -> bool {
        true
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        for metadata in self.0 {
            children.element(metadata.as_element())?;
        }
        Ok(())
    }
}

/// Decode a spliced `metadata` container node back into its records.
pub(crate) fn decode_metadata_list(
    ctx: &CodecContext,
    node: &NestedNode<'_, '_>,
) -> Result<Vec<Metadata>, CodecError> {
    let children = match &node.value {
        NestedValue::Structural { children, .. } => *children,
        NestedValue::Leaf(_) => {
            return Err(CodecError::TypeMismatch {
                expected: "structural field",
                actual: "leaf field",
            })
        }
    };
    if children.len() % 4 != 0 {
        return Err(CodecError::MalformedEnvelope(
            "spliced metadata container must hold 4-slot groups",
        ));
    }
    let mut records = Vec::with_capacity(children.len() / 4);
    for group in children.chunks_exact(4) {
        let attrs = group[2]
            .as_array()
            .ok_or(CodecError::MalformedEnvelope("attribute slot is not an array"))?;
        let kids = group[3]
            .as_array()
            .ok_or(CodecError::MalformedEnvelope("children slot is not an array"))?;
        records.push(decode_metadata_parts(ctx, &group[0], &group[1], attrs, kids)?);
    }
    Ok(records)
}
