use super::*;

#[test]
fn store_origin_adds_https_to_bare_domain() {
    assert_eq!(
        store_origin("westside.com").unwrap(),
        "https://westside.com"
    );
}

#[test]
fn store_origin_strips_path() {
    assert_eq!(
        store_origin("https://westside.com/collections/all").unwrap(),
        "https://westside.com"
    );
}

#[test]
fn store_origin_strips_trailing_slash() {
    assert_eq!(
        store_origin("https://westside.com/").unwrap(),
        "https://westside.com"
    );
}

#[test]
fn store_origin_keeps_www_prefix() {
    assert_eq!(
        store_origin("www.squah.com").unwrap(),
        "https://www.squah.com"
    );
}

#[test]
fn store_origin_rejects_empty_input() {
    let result = store_origin("   ");
    assert!(
        matches!(result, Err(ExtractError::InvalidStoreUrl { .. })),
        "expected InvalidStoreUrl, got: {result:?}"
    );
}

#[test]
fn host_of_strips_scheme_and_path() {
    assert_eq!(host_of("https://westside.com/products/x"), "westside.com");
    assert_eq!(host_of("http://shop.example.com"), "shop.example.com");
    assert_eq!(host_of("westside.com"), "westside.com");
}
