use inventory_core::{ResourceMatch, ResourceRouter, ResourceUri, UriParseError};

#[test]
fn collection_identifier_classifies_as_collection() {
    let router = ResourceRouter::new();

    let built = ResourceUri::collection();
    let parsed = ResourceUri::parse("store://inventory/products").unwrap();
    assert_eq!(built, parsed);
    assert_eq!(router.classify(&built), ResourceMatch::Collection);
}

#[test]
fn item_identifiers_classify_with_the_routed_id() {
    let router = ResourceRouter::new();

    assert_eq!(
        router.classify(&ResourceUri::item(0)),
        ResourceMatch::SingleItem(0)
    );
    let parsed = ResourceUri::parse("store://inventory/products/42").unwrap();
    assert_eq!(router.classify(&parsed), ResourceMatch::SingleItem(42));
}

#[test]
fn unknown_paths_are_unrecognized() {
    let router = ResourceRouter::new();

    for path in ["warehouse", "products/3/extra", "products/abc", "products/"] {
        let uri = ResourceUri::new("inventory", path);
        assert_eq!(
            router.classify(&uri),
            ResourceMatch::Unrecognized,
            "path `{path}` must not classify"
        );
    }
}

#[test]
fn foreign_authority_is_unrecognized() {
    let router = ResourceRouter::new();

    let uri = ResourceUri::new("somebody.else", "products");
    assert_eq!(router.classify(&uri), ResourceMatch::Unrecognized);
}

#[test]
fn ids_too_large_for_a_row_id_are_unrecognized() {
    let router = ResourceRouter::new();

    let uri = ResourceUri::new("inventory", "products/99999999999999999999");
    assert_eq!(router.classify(&uri), ResourceMatch::Unrecognized);
}

#[test]
fn negative_id_segments_never_match_the_item_route() {
    let router = ResourceRouter::new();

    let uri = ResourceUri::new("inventory", "products/-4");
    assert_eq!(router.classify(&uri), ResourceMatch::Unrecognized);
}

#[test]
fn malformed_identifier_strings_fail_to_parse() {
    assert!(matches!(
        ResourceUri::parse("garbage"),
        Err(UriParseError::MissingScheme(_))
    ));
    assert!(matches!(
        ResourceUri::parse("http://inventory/products"),
        Err(UriParseError::UnknownScheme(_))
    ));
    assert!(matches!(
        ResourceUri::parse("store://inventory"),
        Err(UriParseError::MissingPath(_))
    ));
    assert!(matches!(
        ResourceUri::parse("store:///products"),
        Err(UriParseError::MissingAuthority(_))
    ));
}

#[test]
fn display_and_parse_roundtrip() {
    let uri = ResourceUri::item(17);
    assert_eq!(uri.to_string(), "store://inventory/products/17");

    let reparsed: ResourceUri = uri.to_string().parse().unwrap();
    assert_eq!(reparsed, uri);
}

#[test]
fn custom_authority_router_accepts_its_own_identifiers_only() {
    let router = ResourceRouter::with_authority("staging");

    assert_eq!(
        router.classify(&ResourceUri::new("staging", "products")),
        ResourceMatch::Collection
    );
    assert_eq!(
        router.classify(&ResourceUri::collection()),
        ResourceMatch::Unrecognized
    );
}
