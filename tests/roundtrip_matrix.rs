//! Round-trip matrix: every shipped protocol object, all optional fields
//! populated, with and without a dictionary.

use chrono::{DateTime, Utc};
use ifmap_cbor::dictionary::Dictionary;
use ifmap_cbor::model::*;
use ifmap_cbor::{CborItem, CodecContext};

fn ts(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text).expect("timestamp").with_timezone(&Utc)
}

fn operational() -> OperationalAttributes {
    OperationalAttributes {
        publisher_id: Some("my-publisher-id".to_owned()),
        timestamp: Some(ts("2011-12-03T10:15:30.123456+01:00")),
    }
}

fn sample_identifiers() -> Vec<Identifier> {
    vec![
        Identifier::AccessRequest(AccessRequest {
            name: "ar:0123".to_owned(),
            administrative_domain: Some("domain-a".to_owned()),
        }),
        Identifier::Device(Device {
            name: "device01".to_owned(),
        }),
        Identifier::Identity(Identity {
            name: "alice".to_owned(),
            identity_type: IdentityType::Username,
            other_type_definition: None,
            administrative_domain: Some("domain-a".to_owned()),
        }),
        Identifier::Identity(Identity {
            name: "custom".to_owned(),
            identity_type: IdentityType::Other,
            other_type_definition: Some("vendor:custom".to_owned()),
            administrative_domain: None,
        }),
        Identifier::IpAddress(IpAddress {
            value: "192.0.2.7".parse().expect("v4"),
            administrative_domain: Some("domain-a".to_owned()),
        }),
        Identifier::IpAddress(IpAddress {
            value: "2001:db8::1".parse().expect("v6"),
            administrative_domain: None,
        }),
        Identifier::MacAddress(MacAddress {
            value: "aa:bb:cc:dd:ee:ff".to_owned(),
            administrative_domain: Some("domain-a".to_owned()),
        }),
    ]
}

fn sample_metadata() -> Vec<Metadata> {
    vec![
        Metadata::Capability(Capability {
            operational: operational(),
            name: "capability:name".to_owned(),
            administrative_domain: Some("capability:administrative-domain".to_owned()),
        }),
        Metadata::Role(Role {
            operational: operational(),
            name: "finance".to_owned(),
            administrative_domain: Some("domain-a".to_owned()),
        }),
        Metadata::DeviceAttribute(DeviceAttribute {
            operational: operational(),
            name: "av-signature-out-of-date".to_owned(),
        }),
        Metadata::DeviceCharacteristic(DeviceCharacteristic {
            operational: operational(),
            manufacturer: Some("Acme".to_owned()),
            model: Some("PX-2".to_owned()),
            os: Some("Linux".to_owned()),
            os_version: Some("6.1".to_owned()),
            device_type: Some("router".to_owned()),
            discovered_time: ts("2011-12-03T10:15:30Z"),
            discoverer_id: "sensor-3".to_owned(),
            discovery_method: "snmp".to_owned(),
        }),
        Metadata::DeviceIp(DeviceIp {
            operational: operational(),
        }),
        Metadata::Event(Event {
            operational: operational(),
            name: "suspicious-flow".to_owned(),
            discovered_time: ts("2011-12-03T10:15:31Z"),
            discoverer_id: "ids-1".to_owned(),
            magnitude: 70,
            confidence: 90,
            significance: Significance::Critical,
            event_type: Some(EventType::BehavioralChange),
            other_type_definition: Some("vendor:event".to_owned()),
            information: Some("unusual outbound traffic".to_owned()),
            vulnerability_uri: Some("https://cve.example/CVE-2011-0001".to_owned()),
        }),
        Metadata::IpMac(IpMac {
            operational: operational(),
            start_time: Some(ts("2011-12-03T10:00:00Z")),
            end_time: Some(ts("2011-12-03T18:00:00Z")),
            dhcp_server: Some("dhcp-1".to_owned()),
        }),
        Metadata::Layer2Information(Layer2Information {
            operational: operational(),
            vlan: Some(42),
            vlan_name: Some("guests".to_owned()),
            port: Some(7),
            administrative_domain: Some("domain-a".to_owned()),
        }),
        Metadata::Location(Location {
            operational: operational(),
            discovered_time: ts("2011-12-03T10:15:32Z"),
            discoverer_id: "badge-reader-2".to_owned(),
            location_information: vec![
                LocationInformation {
                    location_type: "room".to_owned(),
                    value: "b401".to_owned(),
                },
                LocationInformation {
                    location_type: "building".to_owned(),
                    value: "hq".to_owned(),
                },
            ],
        }),
        Metadata::RequestForInvestigation(RequestForInvestigation {
            operational: operational(),
            qualifier: Some("suspected-breach".to_owned()),
        }),
    ]
}

/// Partial dictionary: full tables for capability and the identifiers,
/// nothing for the rest. Misses must fall back to literals and still
/// round-trip.
fn sample_dictionary() -> Dictionary {
    let mut dict = Dictionary::new();
    let meta_ns = dict.add_namespace(IFMAP_METADATA_NS, CborItem::Uint(1));
    let capability = meta_ns.add_element("capability", CborItem::Uint(0));
    capability.add_attribute("name", CborItem::Uint(0));
    capability.add_attribute("administrative-domain", CborItem::Uint(1));
    capability.add_attribute("ifmap-publisher-id", CborItem::Uint(2));
    capability.add_attribute("ifmap-timestamp", CborItem::Uint(3));
    let cardinality = capability.add_attribute("ifmap-cardinality", CborItem::Uint(4));
    cardinality.add_enum_value("singleValue", CborItem::Uint(0));
    cardinality.add_enum_value("multiValue", CborItem::Uint(1));

    let base_ns = dict.add_namespace(IFMAP_NS, CborItem::Uint(0));
    let device = base_ns.add_element("device", CborItem::Uint(0));
    device.add_nested("name", CborItem::Uint(0));
    let identity = base_ns.add_element("identity", CborItem::Uint(1));
    identity.add_attribute("name", CborItem::Uint(0));
    let identity_type = identity.add_attribute("type", CborItem::Uint(1));
    identity_type.add_enum_value("username", CborItem::Uint(5));
    identity_type.add_enum_value("other", CborItem::Uint(9));
    let ip = base_ns.add_element("ip-address", CborItem::Uint(2));
    ip.add_attribute("value", CborItem::Uint(0));
    ip.add_attribute("type", CborItem::Uint(1));
    dict
}

#[test]
fn identifiers_roundtrip_without_dictionary() {
    let ctx = CodecContext::new();
    for identifier in sample_identifiers() {
        let bytes = ctx.encode_identifier(&identifier).expect("encode");
        let back = ctx.decode_identifier(&bytes).expect("decode");
        assert_eq!(back, identifier);
    }
}

#[test]
fn metadata_roundtrip_without_dictionary() {
    let ctx = CodecContext::new();
    for metadata in sample_metadata() {
        let bytes = ctx.encode_metadata(&metadata).expect("encode");
        let back = ctx.decode_metadata(&bytes).expect("decode");
        assert_eq!(back, metadata);
    }
}

#[test]
fn roundtrip_is_dictionary_independent() {
    let bare = CodecContext::new();
    let keyed = CodecContext::with_dictionary(sample_dictionary());
    for metadata in sample_metadata() {
        let without = bare.decode_metadata(&bare.encode_metadata(&metadata).expect("encode")).expect("decode");
        let with = keyed.decode_metadata(&keyed.encode_metadata(&metadata).expect("encode")).expect("decode");
        assert_eq!(without, metadata);
        assert_eq!(with, metadata);
    }
    for identifier in sample_identifiers() {
        let without = bare
            .decode_identifier(&bare.encode_identifier(&identifier).expect("encode"))
            .expect("decode");
        let with = keyed
            .decode_identifier(&keyed.encode_identifier(&identifier).expect("encode"))
            .expect("decode");
        assert_eq!(without, identifier);
        assert_eq!(with, identifier);
    }
}

fn sample_requests() -> Vec<Request> {
    let capability = Metadata::Capability(Capability {
        operational: operational(),
        name: "capability:name".to_owned(),
        administrative_domain: None,
    });
    let device_ip = Metadata::DeviceIp(DeviceIp {
        operational: operational(),
    });
    let ar = Identifier::AccessRequest(AccessRequest {
        name: "ar:1".to_owned(),
        administrative_domain: None,
    });
    let ip = Identifier::IpAddress(IpAddress {
        value: "192.0.2.7".parse().expect("v4"),
        administrative_domain: None,
    });
    let device = Identifier::Device(Device {
        name: "device01".to_owned(),
    });
    vec![
        Request::NewSession(NewSessionRequest {
            max_poll_result_size: Some(1_000_000),
        }),
        Request::EndSession(EndSessionRequest {
            session_id: "session-1".to_owned(),
        }),
        Request::RenewSession(RenewSessionRequest {
            session_id: "session-1".to_owned(),
        }),
        Request::PurgePublisher(PurgePublisherRequest {
            session_id: "session-1".to_owned(),
            publisher_id: "my-publisher-id".to_owned(),
        }),
        Request::Publish(PublishRequest {
            session_id: "session-1".to_owned(),
            operations: vec![
                PublishOperation::Update {
                    lifetime: Lifetime::Forever,
                    link: Link::pair(ar.clone(), ip.clone()),
                    metadata: vec![capability.clone(), device_ip.clone()],
                },
                PublishOperation::Delete {
                    filter: Some("meta:capability[@name='capability:name']".to_owned()),
                    link: Link::single(device.clone()),
                },
                PublishOperation::Notify {
                    link: Link::single(ar.clone()),
                    metadata: vec![capability.clone()],
                },
            ],
        }),
        Request::Search(SearchRequest {
            session_id: "session-1".to_owned(),
            identifier: device.clone(),
            parameters: SearchParameters {
                match_links: Some("meta:device-ip".to_owned()),
                max_depth: Some(3),
                max_size: Some(100_000),
                result_filter: Some("meta:capability".to_owned()),
                terminal_identifier_type: Some("device".to_owned()),
            },
        }),
        Request::Subscribe(SubscribeRequest {
            session_id: "session-1".to_owned(),
            operations: vec![
                SubscribeOperation::Update {
                    name: "sub-1".to_owned(),
                    identifier: ip,
                    parameters: SearchParameters {
                        max_depth: Some(2),
                        ..SearchParameters::default()
                    },
                },
                SubscribeOperation::Delete {
                    name: "sub-0".to_owned(),
                },
            ],
        }),
        Request::Poll(PollRequest {
            session_id: "session-1".to_owned(),
        }),
    ]
}

#[test]
fn requests_roundtrip() {
    let ctx = CodecContext::new();
    for request in sample_requests() {
        let bytes = ctx.encode_request(&request).expect("encode");
        let back = ctx.decode_request(&bytes).expect("decode");
        assert_eq!(back, request, "request {}", request.local_name());
    }
}

fn sample_result_item() -> ResultItem {
    ResultItem {
        link: Link::pair(
            Identifier::AccessRequest(AccessRequest {
                name: "ar:1".to_owned(),
                administrative_domain: None,
            }),
            Identifier::MacAddress(MacAddress {
                value: "aa:bb:cc:dd:ee:ff".to_owned(),
                administrative_domain: None,
            }),
        ),
        metadata: vec![Metadata::Capability(Capability {
            operational: operational(),
            name: "capability:name".to_owned(),
            administrative_domain: None,
        })],
    }
}

fn sample_responses() -> Vec<Response> {
    let search_payload = SearchResultPayload {
        name: Some("sub-1".to_owned()),
        items: vec![sample_result_item()],
    };
    let error = ErrorResult {
        code: ErrorCode::InvalidSessionId,
        message: Some("session expired".to_owned()),
        name: Some("sub-1".to_owned()),
    };
    vec![
        Response {
            validation: Some(ValidationMode::All),
            result: ResponseResult::Error(error.clone()),
        },
        Response::new(ResponseResult::PublishReceived),
        Response {
            validation: Some(ValidationMode::MetadataOnly),
            result: ResponseResult::SearchResult(search_payload.clone()),
        },
        Response::new(ResponseResult::SubscribeReceived),
        Response::new(ResponseResult::PollResult(PollResultPayload {
            results: vec![
                PollResultItem::Search(search_payload.clone()),
                PollResultItem::Update(search_payload.clone()),
                PollResultItem::Delete(SearchResultPayload {
                    name: Some("sub-2".to_owned()),
                    items: vec![],
                }),
                PollResultItem::Notify(search_payload),
                PollResultItem::Error(error),
            ],
        })),
        Response::new(ResponseResult::PurgePublisherReceived),
        Response::new(ResponseResult::NewSessionResult(NewSessionResult {
            session_id: "session-1".to_owned(),
            publisher_id: "my-publisher-id".to_owned(),
            max_poll_result_size: Some(5_000_000),
        })),
        Response::new(ResponseResult::EndSessionResult),
        Response::new(ResponseResult::RenewSessionResult),
    ]
}

#[test]
fn responses_roundtrip() {
    let ctx = CodecContext::new();
    for response in sample_responses() {
        let bytes = ctx.encode_response(&response).expect("encode");
        let back = ctx.decode_response(&bytes).expect("decode");
        assert_eq!(back, response, "response {}", response.result.local_name());
    }
}

#[test]
fn requests_roundtrip_with_dictionary() {
    let ctx = CodecContext::with_dictionary(sample_dictionary());
    for request in sample_requests() {
        let bytes = ctx.encode_request(&request).expect("encode");
        let back = ctx.decode_request(&bytes).expect("decode");
        assert_eq!(back, request, "request {}", request.local_name());
    }
}

#[test]
fn responses_roundtrip_with_dictionary() {
    let ctx = CodecContext::with_dictionary(sample_dictionary());
    for response in sample_responses() {
        let bytes = ctx.encode_response(&response).expect("encode");
        let back = ctx.decode_response(&bytes).expect("decode");
        assert_eq!(back, response, "response {}", response.result.local_name());
    }
}
