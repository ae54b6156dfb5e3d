//! IF-MAP protocol object model.
//!
//! Plain data holders that plug into the element framework: identifiers,
//! metadata, requests and response results, plus the generic vendor
//! element for caller-registered extensions.

pub mod identifiers;
pub mod metadata;
pub mod requests;
pub mod responses;
pub mod vendor;

/// Base IF-MAP 2.0 namespace (identifiers, requests, responses).
pub const IFMAP_NS: &str = "http://www.trustedcomputinggroup.org/2010/IFMAP/2";

/// Standard metadata namespace.
pub const IFMAP_METADATA_NS: &str =
    "http://www.trustedcomputinggroup.org/2010/IFMAP-METADATA/2";

pub use identifiers::{
    AccessRequest, Device, ExtendedIdentifier, Identifier, Identity, IdentityType, IpAddress,
    MacAddress,
};
pub use metadata::{
    Capability, Cardinality, DeviceAttribute, DeviceCharacteristic, DeviceIp, Event, EventType,
    IpMac, Layer2Information, Location, LocationInformation, Metadata, OperationalAttributes,
    RequestForInvestigation, Role, Significance,
};
pub use requests::{
    EndSessionRequest, Lifetime, Link, NewSessionRequest, PollRequest, PublishOperation,
    PublishRequest, PurgePublisherRequest, RenewSessionRequest, Request, SearchParameters,
    SearchRequest, SubscribeOperation, SubscribeRequest,
};
pub use responses::{
    ErrorCode, ErrorResult, NewSessionResult, PollResultItem, PollResultPayload, Response,
    ResponseResult, ResultItem, SearchResultPayload, ValidationMode,
};
pub use vendor::VendorElement;
