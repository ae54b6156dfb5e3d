//! Registry behavior through the public API: vendor bindings, duplicate
//! rejection, the unregister asymmetry, and reset idempotence.

use ifmap_cbor::model::{
    Capability, ExtendedIdentifier, Metadata, OperationalAttributes, VendorElement,
};
use ifmap_cbor::registry::DeserializeInput;
use ifmap_cbor::{CborItem, CodecContext, CodecError, TypeKey};

const VENDOR_NS: &str = "urn:vendor:metadata";
const OBSERVATION: TypeKey = TypeKey("vendor:observation");

fn register_observation(ctx: &CodecContext) -> Result<(), CodecError> {
    ctx.metadata.register(
        OBSERVATION,
        VENDOR_NS,
        "observation",
        Box::new(|input: &DeserializeInput<'_, '_>| {
            VendorElement::deserialize(input, VENDOR_NS, "observation").map(Metadata::Extension)
        }),
    )
}

fn observation() -> Metadata {
    Metadata::Extension(VendorElement {
        namespace: VENDOR_NS.to_owned(),
        local_name: "observation".to_owned(),
        attributes: vec![("source".to_owned(), CborItem::text("sensor-7"))],
        leaves: vec![("reading".to_owned(), vec![CborItem::Uint(42)])],
    })
}

fn capability() -> Metadata {
    Metadata::Capability(Capability {
        operational: OperationalAttributes::default(),
        name: "capability:name".to_owned(),
        administrative_domain: None,
    })
}

#[test]
fn vendor_metadata_roundtrips_without_a_dictionary() {
    let ctx = CodecContext::new();
    register_observation(&ctx).expect("register");
    let metadata = observation();
    let bytes = ctx.encode_metadata(&metadata).expect("encode");
    assert_eq!(ctx.decode_metadata(&bytes).expect("decode"), metadata);
}

#[test]
fn duplicate_registration_is_rejected() {
    let ctx = CodecContext::new();
    register_observation(&ctx).expect("first");
    let err = register_observation(&ctx).unwrap_err();
    assert!(matches!(err, CodecError::AlreadyBound(key) if key == OBSERVATION));
    // The first binding is still intact.
    let bytes = ctx.encode_metadata(&observation()).expect("encode");
    assert_eq!(ctx.decode_metadata(&bytes).expect("decode"), observation());
}

#[test]
fn blank_registration_arguments_fail_validation() {
    let ctx = CodecContext::new();
    let err = ctx
        .metadata
        .register(
            OBSERVATION,
            " ",
            "observation",
            Box::new(|input: &DeserializeInput<'_, '_>| {
                VendorElement::deserialize(input, VENDOR_NS, "observation").map(Metadata::Extension)
            }),
        )
        .unwrap_err();
    assert!(matches!(err, CodecError::MissingRequiredValue(_)));
    // Nothing was bound by the failed call.
    assert_eq!(ctx.metadata.resolve_target_class(VENDOR_NS, "observation"), None);
}

#[test]
fn unregister_removes_only_the_deserializer() {
    let ctx = CodecContext::new();
    register_observation(&ctx).expect("register");
    let bytes = ctx.encode_metadata(&observation()).expect("encode");

    assert!(ctx.metadata.unregister(OBSERVATION));
    // Type resolution survives; only the constructor is gone.
    assert_eq!(
        ctx.metadata.resolve_target_class(VENDOR_NS, "observation"),
        Some(OBSERVATION),
    );
    let err = ctx.decode_metadata(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedType(key) if key == OBSERVATION));

    // Re-registration restores decoding.
    register_observation(&ctx).expect("re-register");
    assert_eq!(ctx.decode_metadata(&bytes).expect("decode"), observation());
}

#[test]
fn unregistering_a_built_in_fails_unsupported_type() {
    let ctx = CodecContext::new();
    let bytes = ctx.encode_metadata(&capability()).expect("encode");
    assert!(ctx.metadata.unregister(Capability::TYPE_KEY));
    let err = ctx.decode_metadata(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedType(_)));
}

#[test]
fn clear_all_reseeds_exactly_the_built_ins() {
    let ctx = CodecContext::new();
    register_observation(&ctx).expect("register");
    let vendor_bytes = ctx.encode_metadata(&observation()).expect("encode");
    let builtin_bytes = ctx.encode_metadata(&capability()).expect("encode");

    ctx.metadata.clear_all();

    // Built-ins reinstall lazily on the next deserialize call.
    assert_eq!(ctx.decode_metadata(&builtin_bytes).expect("decode"), capability());
    // Vendor bindings are gone, name resolution included.
    let err = ctx.decode_metadata(&vendor_bytes).unwrap_err();
    assert!(matches!(err, CodecError::UnresolvableName { .. }));
}

#[test]
fn extended_identifier_registry_is_a_pure_vendor_extension_point() {
    let ctx = CodecContext::new();
    const SITE: TypeKey = TypeKey("vendor:site");
    ctx.extended_identifiers
        .register(
            SITE,
            "urn:vendor:identifiers",
            "site",
            Box::new(|input: &DeserializeInput<'_, '_>| {
                VendorElement::deserialize(input, "urn:vendor:identifiers", "site")
                    .map(ExtendedIdentifier::Extension)
            }),
        )
        .expect("register");

    let site = ExtendedIdentifier::Extension(VendorElement {
        namespace: "urn:vendor:identifiers".to_owned(),
        local_name: "site".to_owned(),
        attributes: vec![("campus".to_owned(), CborItem::text("hq"))],
        leaves: vec![],
    });
    let bytes = ctx.encode_extended_identifier(&site).expect("encode");
    assert_eq!(ctx.decode_extended_identifier(&bytes).expect("decode"), site);

    // Without the binding there is nothing to resolve.
    ctx.extended_identifiers.clear_all();
    let err = ctx.decode_extended_identifier(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::UnresolvableName { .. }));
}
