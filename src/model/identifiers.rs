//! The five standard IF-MAP identifiers, plus the extended-identifier
//! extension point.
//!
//! Identifiers are plain data holders; everything wire-related happens
//! through the element framework hooks. The `device` identifier is the one
//! standard identifier whose name travels as a leaf child rather than an
//! attribute.

use std::net::IpAddr;

use crate::codec::CodecContext;
use crate::element::{
    AttributeWriter, ChildNode, ChildWriter, ProtocolElement, RawElement,
};
use crate::error::CodecError;
use crate::model::IFMAP_NS;
use crate::model::vendor::VendorElement;
use crate::names;
use crate::registry::{DeserializeInput, RegistryState, TypeKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    AccessRequest(AccessRequest),
    Device(Device),
    Identity(Identity),
    IpAddress(IpAddress),
    MacAddress(MacAddress),
    Extension(VendorElement),
}

impl Identifier {
    pub fn as_element(&self) -> &dyn ProtocolElement {
        match self {
            Identifier::AccessRequest(id) => id,
            Identifier::Device(id) => id,
            Identifier::Identity(id) => id,
            Identifier::IpAddress(id) => id,
            Identifier::MacAddress(id) => id,
            Identifier::Extension(id) => id,
        }
    }
}

/// Extended identifiers (IF-MAP 2.2) have no built-in vocabulary; the
/// registry seeds empty and vendors bind their own shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtendedIdentifier {
    Extension(VendorElement),
}

impl ExtendedIdentifier {
    pub fn as_element(&self) -> &dyn ProtocolElement {
        match self {
            ExtendedIdentifier::Extension(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessRequest {
    pub name: String,
    pub administrative_domain: Option<String>,
}

impl AccessRequest {
    pub const TYPE_KEY: TypeKey = TypeKey("access-request");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            name: attrs.require_text("name")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for AccessRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "access-request"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("name", &self.name);
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub name: String,
}

impl Device {
    pub const TYPE_KEY: TypeKey = TypeKey("device");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        for node in input.child_nodes() {
            if let ChildNode::Nested(nested) = node? {
                if nested.name == "name" {
                    return Ok(Self {
                        name: nested.leaf_text()?.to_owned(),
                    });
                }
            }
        }
        Err(CodecError::MissingRequiredValue("device name"))
    }
}

impl ProtocolElement for Device {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "device"
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        children.leaf_text("name", &self.name);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityType {
    AikName,
    DistinguishedName,
    DnsName,
    EmailAddress,
    HipHit,
    KerberosPrincipal,
    Username,
    SipUri,
    TelUri,
    Other,
}

impl IdentityType {
    pub fn wire_name(&self) -> &'static str {
        match self {
            IdentityType::AikName => "aik-name",
            IdentityType::DistinguishedName => "distinguished-name",
            IdentityType::DnsName => "dns-name",
            IdentityType::EmailAddress => "email-address",
            IdentityType::HipHit => "hip-hit",
            IdentityType::KerberosPrincipal => "kerberos-principal",
            IdentityType::Username => "username",
            IdentityType::SipUri => "sip-uri",
            IdentityType::TelUri => "tel-uri",
            IdentityType::Other => "other",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "aik-name" => IdentityType::AikName,
            "distinguished-name" => IdentityType::DistinguishedName,
            "dns-name" => IdentityType::DnsName,
            "email-address" => IdentityType::EmailAddress,
            "hip-hit" => IdentityType::HipHit,
            "kerberos-principal" => IdentityType::KerberosPrincipal,
            "username" => IdentityType::Username,
            "sip-uri" => IdentityType::SipUri,
            "tel-uri" => IdentityType::TelUri,
            "other" => IdentityType::Other,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub name: String,
    pub identity_type: IdentityType,
    /// Required by the schema when `identity_type` is `Other`.
    pub other_type_definition: Option<String>,
    pub administrative_domain: Option<String>,
}

impl Identity {
    pub const TYPE_KEY: TypeKey = TypeKey("identity");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        let type_name = attrs.require_enum("type")?;
        let identity_type = IdentityType::from_wire(&type_name)
            .ok_or(CodecError::UnresolvableName { scope: "identity type" })?;
        Ok(Self {
            name: attrs.require_text("name")?,
            identity_type,
            other_type_definition: attrs.text("other-type-definition")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for Identity {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "identity"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("name", &self.name);
        attrs.enum_value("type", self.identity_type.wire_name());
        if let Some(def) = &self.other_type_definition {
            attrs.text("other-type-definition", def);
        }
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        Ok(())
    }
}

/// The `value` attribute travels as the raw 4- or 16-byte address; the
/// enum-valued `type` attribute is derived from the address family.
#[derive(Debug, Clone, PartialEq)]
pub struct IpAddress {
    pub value: IpAddr,
    pub administrative_domain: Option<String>,
}

impl IpAddress {
    pub const TYPE_KEY: TypeKey = TypeKey("ip-address");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            value: attrs.require_address("value")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for IpAddress {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "ip-address"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.address("value", &self.value);
        let family = match self.value {
            IpAddr::V4(_) => "IPv4",
            IpAddr::V6(_) => "IPv6",
        };
        attrs.enum_value("type", family);
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacAddress {
    /// Colon-separated lowercase hex, e.g. `aa:bb:cc:dd:ee:ff`.
    pub value: String,
    pub administrative_domain: Option<String>,
}

impl MacAddress {
    pub const TYPE_KEY: TypeKey = TypeKey("mac-address");

    fn deserialize(input: &DeserializeInput<'_, '_>) -> Result<Self, CodecError> {
        let attrs = input.attributes()?;
        Ok(Self {
            value: attrs.require_text("value")?,
            administrative_domain: attrs.text("administrative-domain")?,
        })
    }
}

impl ProtocolElement for MacAddress {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "mac-address"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("value", &self.value);
        if let Some(domain) = &self.administrative_domain {
            attrs.text("administrative-domain", domain);
        }
        Ok(())
    }
}

pub(crate) fn seed_identifiers(state: &mut RegistryState<Identifier>) {
    state.bind(
        AccessRequest::TYPE_KEY,
        IFMAP_NS,
        "access-request",
        Box::new(|input| AccessRequest::deserialize(input).map(Identifier::AccessRequest)),
    );
    state.bind(
        Device::TYPE_KEY,
        IFMAP_NS,
        "device",
        Box::new(|input| Device::deserialize(input).map(Identifier::Device)),
    );
    state.bind(
        Identity::TYPE_KEY,
        IFMAP_NS,
        "identity",
        Box::new(|input| Identity::deserialize(input).map(Identifier::Identity)),
    );
    state.bind(
        IpAddress::TYPE_KEY,
        IFMAP_NS,
        "ip-address",
        Box::new(|input| IpAddress::deserialize(input).map(Identifier::IpAddress)),
    );
    state.bind(
        MacAddress::TYPE_KEY,
        IFMAP_NS,
        "mac-address",
        Box::new(|input| MacAddress::deserialize(input).map(Identifier::MacAddress)),
    );
}

pub(crate) fn seed_extended_identifiers(_state: &mut RegistryState<ExtendedIdentifier>) {
    // No built-in extended identifiers; the registry exists for vendors.
}

/// Decode one full identifier element through the identifier registry.
pub(crate) fn decode_identifier_element(
    ctx: &CodecContext,
    raw: &RawElement<'_>,
) -> Result<Identifier, CodecError> {
    let dict = ctx.dictionary();
    let (ns, ns_entry) = names::decode_namespace(dict, raw.ns)?;
    let (name, _) = names::decode_element(ns_entry, raw.name)?;
    let target = ctx
        .identifiers
        .resolve_target_class(&ns, &name)
        .ok_or(CodecError::UnresolvableName { scope: "identifier" })?;
    ctx.identifiers
        .deserialize(dict, raw.ns, raw.name, raw.attrs, raw.children, target)
}
