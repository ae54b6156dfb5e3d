//! Codec façade and envelope dispatch.
//!
//! [`CodecContext`] owns the optional dictionary and the three deserializer
//! registries; codec entry points take it by reference, so there is no
//! hidden global state. The top-level envelope vocabulary is closed: eight
//! request kinds and nine response-result kinds, fixed by the protocol.
//! Metadata and identifier payloads are the extension point, not the
//! envelope.

use crate::cbor::{decode_exact, encode_item};
use crate::dictionary::Dictionary;
use crate::element::{serialize_element, split_element, AttributeReader};
use crate::error::CodecError;
use crate::model::identifiers::{
    decode_identifier_element, seed_extended_identifiers, seed_identifiers, ExtendedIdentifier,
    Identifier,
};
use crate::model::metadata::{decode_metadata_parts, seed_metadata, Metadata};
use crate::model::requests::{
    EndSessionRequest, NewSessionRequest, PollRequest, PublishRequest, PurgePublisherRequest,
    RenewSessionRequest, Request, SearchRequest, SubscribeRequest,
};
use crate::model::responses::{
    decode_error_result, decode_new_session_result, decode_poll_result,
    decode_search_result_payload, Response, ResponseResult, ResponseRoot, ValidationMode,
};
use crate::names;
use crate::registry::DeserializerRegistry;

/// Explicit codec state: one optional dictionary plus the identifier,
/// extended-identifier and metadata registries.
pub struct CodecContext {
    dictionary: Option<Dictionary>,
    pub identifiers: DeserializerRegistry<Identifier>,
    pub extended_identifiers: DeserializerRegistry<ExtendedIdentifier>,
    pub metadata: DeserializerRegistry<Metadata>,
}

impl Default for CodecContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecContext {
    /// Context without a dictionary: every name travels as literal text.
    pub fn new() -> Self {
        Self {
            dictionary: None,
            identifiers: DeserializerRegistry::with_seed(seed_identifiers),
            extended_identifiers: DeserializerRegistry::with_seed(seed_extended_identifiers),
            metadata: DeserializerRegistry::with_seed(seed_metadata),
        }
    }

    pub fn with_dictionary(dictionary: Dictionary) -> Self {
        let mut ctx = Self::new();
        ctx.dictionary = Some(dictionary);
        ctx
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    pub fn encode_request(&self, request: &Request) -> Result<Vec<u8>, CodecError> {
        let element = request.as_element();
        let item = serialize_element(element, self.dictionary()).map_err(|cause| {
            CodecError::SerializationFailed {
                name: element.local_name().to_owned(),
                source: Box::new(cause),
            }
        })?;
        Ok(encode_item(&item))
    }

    pub fn decode_request(&self, bytes: &[u8]) -> Result<Request, CodecError> {
        let item = decode_exact(bytes)?;
        let raw = split_element(&item)?;
        let (_, ns_entry) = names::decode_namespace(self.dictionary(), raw.ns)?;
        let (name, entry) = names::decode_element(ns_entry, raw.name)?;
        let attrs = AttributeReader::parse(raw.attrs, entry)?;
        match name.as_str() {
            "publish" => Ok(Request::Publish(PublishRequest::decode(
                self,
                &attrs,
                raw.children,
                entry,
            )?)),
            "search" => Ok(Request::Search(SearchRequest::decode(
                self,
                &attrs,
                raw.children,
                entry,
            )?)),
            "subscribe" => Ok(Request::Subscribe(SubscribeRequest::decode(
                self,
                &attrs,
                raw.children,
                entry,
            )?)),
            "poll" => Ok(Request::Poll(PollRequest::decode(&attrs)?)),
            "purgePublisher" => Ok(Request::PurgePublisher(PurgePublisherRequest::decode(&attrs)?)),
            "newSession" => Ok(Request::NewSession(NewSessionRequest::decode(&attrs)?)),
            "endSession" => Ok(Request::EndSession(EndSessionRequest::decode(&attrs)?)),
            "renewSession" => Ok(Request::RenewSession(RenewSessionRequest::decode(&attrs)?)),
            _ => Err(CodecError::UnknownEnvelopeType(name)),
        }
    }

    pub fn encode_response(&self, response: &Response) -> Result<Vec<u8>, CodecError> {
        let root = ResponseRoot(response);
        let item = serialize_element(&root, self.dictionary()).map_err(|cause| {
            CodecError::SerializationFailed {
                name: response.result.local_name().to_owned(),
                source: Box::new(cause),
            }
        })?;
        Ok(encode_item(&item))
    }

    /// Decode a response envelope. The validation-mode attribute is read
    /// before the nested result is processed.
    pub fn decode_response(&self, bytes: &[u8]) -> Result<Response, CodecError> {
        let item = decode_exact(bytes)?;
        let raw = split_element(&item)?;
        let (_, ns_entry) = names::decode_namespace(self.dictionary(), raw.ns)?;
        let (name, entry) = names::decode_element(ns_entry, raw.name)?;
        let attrs = AttributeReader::parse(raw.attrs, entry)?;
        let validation = match attrs.enum_value("validation")? {
            None => None,
            Some(value) => Some(
                ValidationMode::from_wire(&value)
                    .ok_or(CodecError::UnresolvableName { scope: "validation mode" })?,
            ),
        };
        let result = match name.as_str() {
            "errorResult" => {
                ResponseResult::Error(decode_error_result(&attrs, raw.children, entry)?)
            }
            "publishReceived" => ResponseResult::PublishReceived,
            "searchResult" => ResponseResult::SearchResult(decode_search_result_payload(
                self,
                &attrs,
                raw.children,
                entry,
            )?),
            "subscribeReceived" => ResponseResult::SubscribeReceived,
            "pollResult" => {
                ResponseResult::PollResult(decode_poll_result(self, raw.children, entry)?)
            }
            "purgePublisherReceived" => ResponseResult::PurgePublisherReceived,
            "newSessionResult" => {
                ResponseResult::NewSessionResult(decode_new_session_result(&attrs)?)
            }
            "endSessionResult" => ResponseResult::EndSessionResult,
            "renewSessionResult" => ResponseResult::RenewSessionResult,
            _ => return Err(CodecError::UnknownEnvelopeType(name)),
        };
        Ok(Response { validation, result })
    }

    /// Encode one metadata item as a standalone element.
    pub fn encode_metadata(&self, metadata: &Metadata) -> Result<Vec<u8>, CodecError> {
        let element = metadata.as_element();
        let item = serialize_element(element, self.dictionary()).map_err(|cause| {
            CodecError::SerializationFailed {
                name: element.local_name().to_owned(),
                source: Box::new(cause),
            }
        })?;
        Ok(encode_item(&item))
    }

    pub fn decode_metadata(&self, bytes: &[u8]) -> Result<Metadata, CodecError> {
        let item = decode_exact(bytes)?;
        let raw = split_element(&item)?;
        decode_metadata_parts(self, raw.ns, raw.name, raw.attrs, raw.children)
    }

    /// Encode one identifier as a standalone element.
    pub fn encode_identifier(&self, identifier: &Identifier) -> Result<Vec<u8>, CodecError> {
        let element = identifier.as_element();
        let item = serialize_element(element, self.dictionary()).map_err(|cause| {
            CodecError::SerializationFailed {
                name: element.local_name().to_owned(),
                source: Box::new(cause),
            }
        })?;
        Ok(encode_item(&item))
    }

    pub fn decode_identifier(&self, bytes: &[u8]) -> Result<Identifier, CodecError> {
        let item = decode_exact(bytes)?;
        let raw = split_element(&item)?;
        decode_identifier_element(self, &raw)
    }

    /// Encode one extended identifier as a standalone element.
    pub fn encode_extended_identifier(
        &self,
        identifier: &ExtendedIdentifier,
    ) -> Result<Vec<u8>, CodecError> {
        let element = identifier.as_element();
        let item = serialize_element(element, self.dictionary()).map_err(|cause| {
            CodecError::SerializationFailed {
                name: element.local_name().to_owned(),
                source: Box::new(cause),
            }
        })?;
        Ok(encode_item(&item))
    }

    pub fn decode_extended_identifier(
        &self,
        bytes: &[u8],
    ) -> Result<ExtendedIdentifier, CodecError> {
        let item = decode_exact(bytes)?;
        let raw = split_element(&item)?;
        let (ns, ns_entry) = names::decode_namespace(self.dictionary(), raw.ns)?;
        let (name, _) = names::decode_element(ns_entry, raw.name)?;
        let target = self
            .extended_identifiers
            .resolve_target_class(&ns, &name)
            .ok_or(CodecError::UnresolvableName { scope: "extended identifier" })?;
        self.extended_identifiers.deserialize(
            self.dictionary(),
            raw.ns,
            raw.name,
            raw.attrs,
            raw.children,
            target,
        )
    }
}
