//! The nine IF-MAP response-result kinds.
//!
//! A response envelope's root name is the result name itself; the
//! validation-mode attribute rides on the root and is read before the
//! nested result is touched. Poll results nest the other result kinds as
//! structural fields.

use crate::codec::CodecContext;
use crate::dictionary::ElementEntry;
use crate::element::{
    parse_child, AttributeReader, AttributeWriter, ChildNode, ChildWriter, NestedElement,
    NestedNode, NestedValue, ProtocolElement,
};
use crate::error::CodecError;
use crate::item::CborItem;
use crate::model::identifiers::decode_identifier_element;
use crate::model::metadata::{decode_metadata_list, Metadata, MetadataList};
use crate::model::requests::Link;
use crate::model::IFMAP_NS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    None,
    BaseOnly,
    MetadataOnly,
    All,
}

impl ValidationMode {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ValidationMode::None => "none",
            ValidationMode::BaseOnly => "baseOnly",
            ValidationMode::MetadataOnly => "metadataOnly",
            ValidationMode::All => "all",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "none" => ValidationMode::None,
            "baseOnly" => ValidationMode::BaseOnly,
            "metadataOnly" => ValidationMode::MetadataOnly,
            "all" => ValidationMode::All,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AccessDenied,
    Failure,
    InvalidIdentifier,
    InvalidIdentifierType,
    IdentifierTooLong,
    InvalidMetadata,
    InvalidSchemaVersion,
    InvalidSessionId,
    MetadataTooLong,
    SearchResultsTooBig,
    PollResultsTooBig,
    SystemError,
}

impl ErrorCode {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ErrorCode::AccessDenied => "AccessDenied",
            ErrorCode::Failure => "Failure",
            ErrorCode::InvalidIdentifier => "InvalidIdentifier",
            ErrorCode::InvalidIdentifierType => "InvalidIdentifierType",
            ErrorCode::IdentifierTooLong => "IdentifierTooLong",
            ErrorCode::InvalidMetadata => "InvalidMetadata",
            ErrorCode::InvalidSchemaVersion => "InvalidSchemaVersion",
            ErrorCode::InvalidSessionId => "InvalidSessionID",
            ErrorCode::MetadataTooLong => "MetadataTooLong",
            ErrorCode::SearchResultsTooBig => "SearchResultsTooBig",
            ErrorCode::PollResultsTooBig => "PollResultsTooBig",
            ErrorCode::SystemError => "SystemError",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "AccessDenied" => ErrorCode::AccessDenied,
            "Failure" => ErrorCode::Failure,
            "InvalidIdentifier" => ErrorCode::InvalidIdentifier,
            "InvalidIdentifierType" => ErrorCode::InvalidIdentifierType,
            "IdentifierTooLong" => ErrorCode::IdentifierTooLong,
            "InvalidMetadata" => ErrorCode::InvalidMetadata,
            "InvalidSchemaVersion" => ErrorCode::InvalidSchemaVersion,
            "InvalidSessionID" => ErrorCode::InvalidSessionId,
            "MetadataTooLong" => ErrorCode::MetadataTooLong,
            "SearchResultsTooBig" => ErrorCode::SearchResultsTooBig,
            "PollResultsTooBig" => ErrorCode::PollResultsTooBig,
            "SystemError" => ErrorCode::SystemError,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    pub code: ErrorCode,
    /// The `errorString` leaf child.
    pub message: Option<String>,
    /// Subscription name, set inside poll results.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub link: Link,
    pub metadata: Vec<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResultPayload {
    /// Subscription name, set inside poll results.
    pub name: Option<String>,
    pub items: Vec<ResultItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollResultItem {
    Search(SearchResultPayload),
    Update(SearchResultPayload),
    Delete(SearchResultPayload),
    Notify(SearchResultPayload),
    Error(ErrorResult),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollResultPayload {
    pub results: Vec<PollResultItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionResult {
    pub session_id: String,
    pub publisher_id: String,
    pub max_poll_result_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseResult {
    Error(ErrorResult),
    PublishReceived,
    SearchResult(SearchResultPayload),
    SubscribeReceived,
    PollResult(PollResultPayload),
    PurgePublisherReceived,
    NewSessionResult(NewSessionResult),
    EndSessionResult,
    RenewSessionResult,
}

impl ResponseResult {
    pub fn local_name(&self) -> &'static str {
        match self {
            ResponseResult::Error(_) => "errorResult",
            ResponseResult::PublishReceived => "publishReceived",
            ResponseResult::SearchResult(_) => "searchResult",
            ResponseResult::SubscribeReceived => "subscribeReceived",
            ResponseResult::PollResult(_) => "pollResult",
            ResponseResult::PurgePublisherReceived => "purgePublisherReceived",
            ResponseResult::NewSessionResult(_) => "newSessionResult",
            ResponseResult::EndSessionResult => "endSessionResult",
            ResponseResult::RenewSessionResult => "renewSessionResult",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub validation: Option<ValidationMode>,
    pub result: ResponseResult,
}

impl Response {
    pub fn new(result: ResponseResult) -> Self {
        Self {
            validation: None,
            result,
        }
    }
}

/// Root-element adapter for encoding a [`Response`].
pub(crate) struct ResponseRoot<'r>(pub &'r Response);

impl ProtocolElement for ResponseRoot<'_> {
    fn namespace(&self) -> &str {
        IFMAP_NS
    }

    fn local_name(&self) -> &str {
        self.0.result.local_name()
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        if let Some(validation) = &self.0.validation {
            attrs.enum_value("validation", validation.wire_name());
        }
        match &self.0.result {
            ResponseResult::Error(error) => write_error_attributes(error, attrs),
            ResponseResult::SearchResult(payload) => {
                if let Some(name) = &payload.name {
                    attrs.text("name", name);
                }
            }
            ResponseResult::NewSessionResult(result) => {
                attrs.text("session-id", &result.session_id);
                attrs.text("ifmap-publisher-id", &result.publisher_id);
                if let Some(size) = result.max_poll_result_size {
                    attrs.uint("max-poll-result-size", size);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        match &self.0.result {
            ResponseResult::Error(error) => write_error_children(error, children),
            ResponseResult::SearchResult(payload) => write_result_items(payload, children),
            ResponseResult::PollResult(payload) => {
                for result in &payload.results {
                    children.structural(result)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn write_error_attributes(error: &ErrorResult, attrs: &mut AttributeWriter<'_>) {
    attrs.enum_value("errorCode", error.code.wire_name());
    if let Some(name) = &error.name {
        attrs.text("name", name);
    }
}

fn write_error_children(error: &ErrorResult, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
    if let Some(message) = &error.message {
        children.leaf_text("errorString", message);
    }
    Ok(())
}

fn write_result_items(
    payload: &SearchResultPayload,
    children: &mut ChildWriter<'_>,
) -> Result<(), CodecError> {
    for item in &payload.items {
        children.structural(item)?;
    }
    Ok(())
}

impl NestedElement for ResultItem {
    fn local_name(&self) -> &str {
        "resultItem"
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        children.element(self.link.first.as_element())?;
        if let Some(second) = &self.link.second {
            children.element(second.as_element())?;
        }
        children.structural(&MetadataList(&self.metadata))
    }
}

impl NestedElement for PollResultItem {
    fn local_name(&self) -> &str {
        match self {
            PollResultItem::Search(_) => "searchResult",
            PollResultItem::Update(_) => "updateResult",
            PollResultItem::Delete(_) => "deleteResult",
            PollResultItem::Notify(_) => "notifyResult",
            PollResultItem::Error(_) => "errorResult",
        }
    }

    fn write_attributes(&self, attrs: &mut AttributeWriter<'_>) -> Result<(), CodecError> {
        match self {
            PollResultItem::Search(payload)
            | PollResultItem::Update(payload)
            | PollResultItem::Delete(payload)
            | PollResultItem::Notify(payload) => {
                if let Some(name) = &payload.name {
                    attrs.text("name", name);
                }
            }
            PollResultItem::Error(error) => write_error_attributes(error, attrs),
        }
        Ok(())
    }

    fn write_children(&self, children: &mut ChildWriter<'_>) -> Result<(), CodecError> {
        match self {
            PollResultItem::Search(payload)
            | PollResultItem::Update(payload)
            | PollResultItem::Delete(payload)
            | PollResultItem::Notify(payload) => write_result_items(payload, children),
            PollResultItem::Error(error) => write_error_children(error, children),
        }
    }
}

pub(crate) fn decode_error_result(
    attrs: &AttributeReader<'_, '_>,
    children: &[CborItem],
    entry: Option<&ElementEntry>,
) -> Result<ErrorResult, CodecError> {
    let code_name = attrs.require_enum("errorCode")?;
    let code = ErrorCode::from_wire(&code_name)
        .ok_or(CodecError::UnresolvableName { scope: "error code" })?;
    let mut message = None;
    for tuple in children {
        if let ChildNode::Nested(nested) = parse_child(tuple, entry)? {
            if nested.name == "errorString" {
                message = Some(nested.leaf_text()?.to_owned());
            }
        }
    }
    Ok(ErrorResult {
        code,
        message,
        name: attrs.text("name")?,
    })
}

fn decode_result_item(ctx: &CodecContext, node: NestedNode<'_, '_>) -> Result<ResultItem, CodecError> {
    let NestedNode { entry, value, .. } = node;
    let children = match value {
        NestedValue::Structural { children, .. } => children,
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
    Ok(ResultItem {
        link: Link::from_identifiers(identifiers)?,
        metadata,
    })
}

pub(crate) fn decode_search_result_payload(
    ctx: &CodecContext,
    attrs: &AttributeReader<'_, '_>,
    children: &[CborItem],
    entry: Option<&ElementEntry>,
) -> Result<SearchResultPayload, CodecError> {
    let mut items = Vec::new();
    for tuple in children {
        match parse_child(tuple, entry)? {
            ChildNode::Nested(node) if node.name == "resultItem" => {
                items.push(decode_result_item(ctx, node)?);
            }
            _ => {}
        }
    }
    Ok(SearchResultPayload {
        name: attrs.text("name")?,
        items,
    })
}

pub(crate) fn decode_poll_result(
    ctx: &CodecContext,
    children: &[CborItem],
    entry: Option<&ElementEntry>,
) -> Result<PollResultPayload, CodecError> {
    let mut results = Vec::new();
    for tuple in children {
        let node = match parse_child(tuple, entry)? {
            ChildNode::Nested(node) => node,
            ChildNode::Element(_) => {
                return Err(CodecError::MalformedEnvelope(
                    "poll result children must be result fields",
                ))
            }
        };
        let kind = node.name.clone();
        match kind.as_str() {
            "searchResult" | "updateResult" | "deleteResult" | "notifyResult" => {
                let NestedNode { entry, value, .. } = node;
                let (attributes, kids) = match value {
                    NestedValue::Structural { attributes, children } => (attributes, children),
                    NestedValue::Leaf(_) => {
                        return Err(CodecError::TypeMismatch {
                            expected: "structural field",
                            actual: "leaf field",
                        })
                    }
                };
                let payload = decode_search_result_payload(ctx, &attributes, kids, entry)?;
                results.push(match kind.as_str() {
                    "searchResult" => PollResultItem::Search(payload),
                    "updateResult" => PollResultItem::Update(payload),
                    "deleteResult" => PollResultItem::Delete(payload),
                    _ => PollResultItem::Notify(payload),
                });
            }
            "errorResult" => {
                let NestedNode { entry, value, .. } = node;
                let (attributes, kids) = match value {
                    NestedValue::Structural { attributes, children } => (attributes, children),
                    NestedValue::Leaf(_) => {
                        return Err(CodecError::TypeMismatch {
                            expected: "structural field",
                            actual: "leaf field",
                        })
                    }
                };
                results.push(PollResultItem::Error(decode_error_result(&attributes, kids, entry)?));
            }
            _ => {
                return Err(CodecError::UnresolvableName { scope: "poll result" });
            }
        }
    }
    Ok(PollResultPayload { results })
}

pub(crate) fn decode_new_session_result(
    attrs: &AttributeReader<'_, '_>,
) -> Result<NewSessionResult, CodecError> {
    Ok(NewSessionResult {
        session_id: attrs.require_text("session-id")?,
        publisher_id: attrs.require_text("ifmap-publisher-id")?,
        max_poll_result_size: attrs.u64("max-poll-result-size")?,
    })
}
