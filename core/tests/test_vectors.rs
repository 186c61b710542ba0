//! Verify URL rendering and parsing against JSON test vectors stored in
//! `test-vectors/urls.json`.
//!
//! Each render case lists `StructuredUrl` fields (defaults filled in by the
//! test) and the exact expected string. Parse cases list the expected fields.

use std::collections::BTreeMap;

use httpkit_core::StructuredUrl;
use serde_json::Value;

fn vectors() -> Value {
    let raw = include_str!("../../test-vectors/urls.json");
    serde_json::from_str(raw).unwrap()
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().map(|s| s.as_str().unwrap().to_string()).collect())
        .unwrap_or_default()
}

fn string_map(value: &Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), v.as_str().unwrap().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn optional(value: &Value) -> Option<String> {
    value.as_str().map(String::from)
}

/// Build a `StructuredUrl` from a vector's field object, applying defaults
/// for anything absent.
fn from_fields(fields: &Value) -> StructuredUrl {
    let mut url = StructuredUrl::new(fields["host"].as_str().unwrap());
    if let Some(scheme) = fields["scheme"].as_str() {
        url = url.with_scheme(scheme);
    }
    if let Some(port) = fields["port"].as_u64() {
        url = url.with_port(port as u16);
    }
    url = url.with_path(string_list(&fields["path"]));
    if let Some(resource) = optional(&fields["resource"]) {
        url = url.with_resource(resource);
    }
    if let Some(suffix) = optional(&fields["suffix"]) {
        url = url.with_suffix(suffix);
    }
    url = url.with_query(string_map(&fields["query"]));
    if let Some(fragment) = optional(&fields["fragment"]) {
        url = url.with_fragment(fragment);
    }
    url
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

#[test]
fn render_test_vectors() {
    let vectors = vectors();
    for case in vectors["render"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let url = from_fields(&case["input"]);
        let rendered = url.render().unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(rendered, case["expected"].as_str().unwrap(), "{name}: rendered");
        assert_eq!(url.to_string(), rendered, "{name}: display");
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

#[test]
fn parse_test_vectors() {
    let vectors = vectors();
    for case in vectors["parse"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let parsed = StructuredUrl::parse(case["input"].as_str().unwrap())
            .unwrap_or_else(|| panic!("{name}: did not parse"));
        let expected = &case["expected"];

        assert_eq!(parsed.scheme, expected["scheme"].as_str().unwrap(), "{name}: scheme");
        assert_eq!(parsed.host, expected["host"].as_str().unwrap(), "{name}: host");
        assert_eq!(u64::from(parsed.port), expected["port"].as_u64().unwrap(), "{name}: port");
        assert_eq!(parsed.path, string_list(&expected["path"]), "{name}: path");
        assert_eq!(parsed.resource, optional(&expected["resource"]), "{name}: resource");
        assert_eq!(parsed.query, string_map(&expected["query"]), "{name}: query");
        assert_eq!(parsed.fragment, optional(&expected["fragment"]), "{name}: fragment");
    }
}

#[test]
fn invalid_inputs_do_not_parse() {
    let vectors = vectors();
    for input in vectors["invalid"].as_array().unwrap() {
        let input = input.as_str().unwrap();
        assert!(StructuredUrl::parse(input).is_none(), "{input:?} should not parse");
    }
}

// ---------------------------------------------------------------------------
// Immutability
// ---------------------------------------------------------------------------

#[test]
fn shared_base_is_safe_across_threads() {
    let base = StructuredUrl::new("api.example.com").with_path(["v1"]);
    std::thread::scope(|scope| {
        let base = &base;
        let handles: Vec<_> = (0..8)
            .map(|i| scope.spawn(move || base.with_path(["items".to_string(), i.to_string()]).render().unwrap()))
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("https://api.example.com/v1/items/{i}"));
        }
    });
    assert_eq!(base.render().unwrap(), "https://api.example.com/v1");
}
