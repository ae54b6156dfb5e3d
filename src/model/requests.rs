//! The eight IF-MAP request kinds.
//!
//! Requests are root elements in the base namespace. Publish and subscribe
//! carry their operations as structural nested fields; link identifiers are
//! full child elements and attached metadata rides in the spliced
//! `metadata` container.

use crate::codec::CodecContext;
use crate::element::{
    parse_child, AttributeReader, AttributeWriter, ChildNode, ChildWriter, NestedElement,
    NestedNode, NestedValue, ProtocolElement,
};
use crate::error::CodecError;
use crate::model::identifiers::{decode_identifier_element, Identifier};
use crate::model::metadata::{decode_metadata_list, Metadata, MetadataList};
use crate::model::IFMAP_NS;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    NewSession(NewSessionRequest),
    EndSession(EndSessionRequest),
    RenewSession(RenewSessionRequest),
    PurgePublisher(PurgePublisherRequest),
    Publish(PublishRequest),
    Search(SearchRequest),
    Subscribe(SubscribeRequest),
    Poll(PollRequest),
}

impl Request {
    pub fn as_element(&self) -> &dyn ProtocolElement {
        match self {
            Request::NewSession(r) => r,
            Request::EndSession(r) => r,
            Request::RenewSession(r) => r,
            Request::PurgePublisher(r) => r,
            Request::Publish(r) => r,
            Request::Search(r) => r,
            Request::Subscribe(r) => r,
            Request::Poll(r) => r,
        }
    }

    pub fn local_name(&self) -> &str {
        self.as_element().local_name()
    }
}

/// One end of a published link: one identifier, or two for link metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub first: Identifier,
    pub second: Option<Identifier>,
}

impl Link {
    pub fn single(first: Identifier) -> Self {
        Self { first, second: None }
    }

    pub fn pair(first: Identifier, second: Identifier) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    pub(crate) fn from_identifiers(mut identifiers: Vec<Identifier>) -> Result<Self, CodecError> {
        match identifiers.len() {
            1 => Ok(Self::single(identifiers.remove(0))),
            2 => {
                let second = identifiers.remove(1);
                Ok(Self::pair(identifiers.remove(0), second))
            }
            0 => Err(CodecError::MissingRequiredValue("link identifier")),
            _ => Err(CodecError::MalformedEnvelope("a link carries at most two identifiers")),
        }
    }
}

fn write_link(children: &mut ChildWriter<'_>, link: &Link) -> Result<(), CodecError> {
    children.element(link.first.as_element())?;
    if let Some(second) = &link.second {
        children.element(second.as_element())?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    #[default]
    Session,
    Forever,
}

impl Lifetime {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Lifetime::Session => "session",
            Lifetime::Forever => "forever",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "session" => Lifetime::Session,
            "forever" => Lifetime::Forever,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishOperation {
    Update {
        lifetime: Lifetime,
        link: Link,
        metadata: Vec<Metadata>,
    },
    Delete {
        filter: Option<String>,
        link: Link,
    },
    Notify {
        link: Link,
        metadata: Vec<Metadata>,
    },
}

impl NestedElement for PublishOperation {
    fn local_name(&self) -> &str {
        match self {
            PublishOperation::Update { .. } => "update",
            PublishOperation::Delete { .. } => "delete",
            PublishOperation::Notify { .. } => "notify",
        }
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        match self {
            PublishOperation::Update { lifetime, .. } => {
                attrs.enum_value("lifetime", lifetime.wire_name());
            }
            PublishOperation::Delete { filter, .. } => {
                if let Some(filter) = filter {
                    attrs.text("filter", filter);
                }
            }
            PublishOperation::Notify { .. } => {}
        }
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        match self {
            PublishOperation::Update { link, metadata, .. }
            | PublishOperation::Notify { link, metadata } => {
                write_link(children, link)?;
                children.structural(&MetadataList(metadata))?;
            }
            PublishOperation::Delete { link, .. } => {
                write_link(children, link)?;
            }
        }
        Ok(())
    }
}

fn decode_operation(
    ctx: &CodecContext,
    node: NestedNode<'_, '_>,
) -> Result<PublishOperation, CodecError> {
    let NestedNode { name, entry, value } = node;
    let (attributes, children) = match value {
        NestedValue::Structural { attributes, children } => (attributes, children),
        NestedValue::Leaf(_) => {
            return Err(CodecError::TypeMismatch {
                expected: "structural field",
                actual: "leaf field",
            })
        }
    };
    let mut identifiers = Vec::new();
    let mut metadata = Vec::new();
    for tuple in children {
        match parse_child(tuple, entry)? {
            ChildNode::Element(raw) => identifiers.push(decode_identifier_element(ctx, &raw)?),
            ChildNode::Nested(nested) if nested.name == "metadata" => {
                metadata.extend(decode_metadata_list(ctx, &nested)?);
            }
            ChildNode::Nested(_) => {}
        }
    }
    let link = Link::from_identifiers(identifiers)?;
    match name.as_str() {
        "update" => {
            let lifetime = match attributes.enum_value("lifetime")? {
                None => Lifetime::default(),
                Some(value) => Lifetime::from_wire(&value)
                    .ok_or(CodecError::UnresolvableName { scope: "lifetime" })?,
            };
            Ok(PublishOperation::Update { lifetime, link, metadata })
        }
        "delete" => Ok(PublishOperation::Delete {
            filter: attributes.text("filter")?,
            link,
        }),
        "notify" => Ok(PublishOperation::Notify { link, metadata }),
        _ => Err(CodecError::UnresolvableName { scope: "publish operation" }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub session_id: String,
    pub operations: Vec<PublishOperation>,
}

impl PublishRequest {
    pub(crate) fn decode(
        ctx: &CodecContext,
        attrs: &AttributeReader<'_, '_>,
        children: &[crate::item::CborItem],
        entry: Option<&crate::dictionary::ElementEntry>,
    ) -> Result<Self, CodecError> {
        let mut operations = Vec::new();
        for tuple in children {
            match parse_child(tuple, entry)? {
                ChildNode::Nested(node) => operations.push(decode_operation(ctx, node)?),
                ChildNode::Element(_) => {
                    return Err(CodecError::MalformedEnvelope(
                        "publish children must be operation fields",
                    ))
                }
            }
        }
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
            operations,
        })
    }
}

impl ProtocolElement for PublishRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "publish"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        for operation in &self.operations {
            children.structural(operation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchParameters {
    pub match_links: Option<String>,
    pub max_depth: Option<u32>,
    pub max_size: Option<u32>,
    pub result_filter: Option<String>,
    pub terminal_identifier_type: Option<String>,
}

impl SearchParameters {
    fn write(&self, attrs: &mut AttributeWriter<'_>) {
        if let Some(match_links) = &self.match_links {
            attrs.text("match-links", match_links);
        }
        if let Some(max_depth) = self.max_depth {
            attrs.uint("max-depth", max_depth as u64);
        }
        if let Some(max_size) = self.max_size {
            attrs.uint("max-size", max_size as u64);
        }
        if let Some(result_filter) = &self.result_filter {
            attrs.text("result-filter", result_filter);
        }
        if let Some(terminal) = &self.terminal_identifier_type {
            attrs.text("terminal-identifier-type", terminal);
        }
    }

    fn read(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            match_links: attrs.text("match-links")?,
            max_depth: attrs.u32("max-depth")?,
            max_size: attrs.u32("max-size")?,
            result_filter: attrs.text("result-filter")?,
            terminal_identifier_type: attrs.text("terminal-identifier-type")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub session_id: String,
    pub identifier: Identifier,
    pub parameters: SearchParameters,
}

impl SearchRequest {
    pub(crate) fn decode(
        ctx: &CodecContext,
        attrs: &AttributeReader<'_, '_>,
        children: &[crate::item::CborItem],
        entry: Option<&crate::dictionary::ElementEntry>,
    ) -> Result<Self, CodecError> {
        let identifier = decode_single_identifier(ctx, children, entry)?;
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
            identifier,
            parameters: SearchParameters::read(attrs)?,
        })
    }
}

impl ProtocolElement for SearchRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "search"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        self.parameters.write(attrs);
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        children.element(self.identifier.as_element())
    }
}

fn decode_single_identifier(
    ctx: &CodecContext,
    children: &[crate::item::CborItem],
    entry: Option<&crate::dictionary::ElementEntry>,
) -> Result<Identifier, CodecError> {
    for tuple in children {
        if let ChildNode::Element(raw) = parse_child(tuple, entry)? {
            return decode_identifier_element(ctx, &raw);
        }
    }
    Err(CodecError::MissingRequiredValue("identifier"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeOperation {
    Update {
        name: String,
        identifier: Identifier,
        parameters: SearchParameters,
    },
    Delete {
        name: String,
    },
}

impl NestedElement for SubscribeOperation {
    fn local_name(&self) -> &str {
        match self {
            SubscribeOperation::Update { .. } => "update",
            SubscribeOperation::Delete { .. } => "delete",
        }
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        match self {
            SubscribeOperation::Update { name, parameters, .. } => {
                attrs.text("name", name);
                parameters.write(attrs);
            }
            SubscribeOperation::Delete { name } => {
                attrs.text("name", name);
            }
        }
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        if let SubscribeOperation::Update { identifier, .. } = self {
            children.element(identifier.as_element())?;
        }
        Ok(())
    }
}

fn decode_subscribe_operation(
    ctx: &CodecContext,
    node: NestedNode<'_, '_>,
) -> Result<SubscribeOperation, CodecError> {
    let NestedNode { name, entry, value } = node;
    let (attributes, children) = match value {
        NestedValue::Structural { attributes, children } => (attributes, children),
        NestedValue::Leaf(_) => {
            return Err(CodecError::TypeMismatch {
                expected: "structural field",
                actual: "leaf field",
            })
        }
    };
    match name.as_str() {
        "update" => Ok(SubscribeOperation::Update {
            name: attributes.require_text("name")?,
            identifier: decode_single_identifier(ctx, children, entry)?,
            parameters: SearchParameters::read(&attributes)?,
        }),
        "delete" => Ok(SubscribeOperation::Delete {
            name: attributes.require_text("name")?,
        }),
        _ => Err(CodecError::UnresolvableName { scope: "subscribe operation" }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeRequest {
    pub session_id: String,
    pub operations: Vec<SubscribeOperation>,
}

impl SubscribeRequest {
    pub(crate) fn decode(
        ctx: &CodecContext,
        attrs: &AttributeReader<'_, '_>,
        children: &[crate::item::CborItem],
        entry: Option<&crate::dictionary::ElementEntry>,
    ) -> Result<Self, CodecError> {
        let mut operations = Vec::new();
        for tuple in children {
            match parse_child(tuple, entry)? {
                ChildNode::Nested(node) => {
                    operations.push(decode_subscribe_operation(ctx, node)?);
                }
                ChildNode::Element(_) => {
                    return Err(CodecError::MalformedEnvelope(
                        "subscribe children must be operation fields",
                    ))
                }
            }
        }
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
            operations,
        })
    }
}

impl ProtocolElement for SubscribeRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "subscribe"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        for operation in &self.operations {
            children.structural(operation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSessionRequest {
    pub max_poll_result_size: Option<u64>,
}

impl NewSessionRequest {
    pub(crate) fn decode(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            max_poll_result_size: attrs.u64("max-poll-result-size")?,
        })
    }
}

impl ProtocolElement for NewSessionRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "newSession"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        if let Some(size) = self.max_poll_result_size {
            attrs.uint("max-poll-result-size", size);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndSessionRequest {
    pub session_id: String,
}

impl EndSessionRequest {
    pub(crate) fn decode(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
        })
    }
}

impl ProtocolElement for EndSessionRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "endSession"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenewSessionRequest {
    pub session_id: String,
}

impl RenewSessionRequest {
    pub(crate) fn decode(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
        })
    }
}

impl ProtocolElement for RenewSessionRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "renewSession"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurgePublisherRequest {
    pub session_id: String,
    pub publisher_id: String,
}

impl PurgePublisherRequest {
    pub(crate) fn decode(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
            publisher_id: attrs.require_text("ifmap-publisher-id")?,
        })
    }
}

impl ProtocolElement for PurgePublisherRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "purgePublisher"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        attrs.text("ifmap-publisher-id", &self.publisher_id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollRequest {
    pub session_id: String,
}

impl PollRequest {
    pub(crate) fn decode(attrs: &AttributeReader<'_, '_>) -> Result<Self, CodecError> {
        Ok(Self {
            session_id: attrs.require_text("session-id")?,
        })
    }
}

impl ProtocolElement for PollRequest {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        "poll"
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        attrs.text("session-id", &self.session_id);
        Ok(())
    }
}
