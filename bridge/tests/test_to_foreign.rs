//! Tests for HostToForeign conversion

use ednbridge_core::reader::read;
use ednbridge_core::{Converter, ForeignValue, HostInput, Keyword, TempIdAllocator};
use serde_json::json;

fn to_foreign(value: serde_json::Value) -> ForeignValue {
    Converter::new().to_foreign(&HostInput::from(value)).unwrap()
}

#[test]
fn test_nested_object_renders_host_style() {
    let value = to_foreign(json!({":foo": {":bar": [1, 2, 3]}}));
    assert_eq!(value.to_string(), "{:foo={:bar=[1, 2, 3]}}");
    assert_eq!(value.class_name(), Some("java.util.HashMap"));
}

#[test]
fn test_null_and_numbers_go_through_the_reader() {
    assert_eq!(to_foreign(json!(null)), read("nil").unwrap());
    assert_eq!(to_foreign(json!(61)), ForeignValue::Long(61));
    assert_eq!(to_foreign(json!(0.25)), ForeignValue::Double(0.25));
    assert_eq!(to_foreign(json!(1e300)), ForeignValue::Double(1e300));
}

#[test]
fn test_strings_and_bools_pass_through() {
    assert_eq!(to_foreign(json!(":not-a-keyword")), ForeignValue::String(":not-a-keyword".into()));
    assert_eq!(to_foreign(json!(false)), ForeignValue::Boolean(false));
}

#[test]
fn test_array_becomes_host_built_list() {
    let value = to_foreign(json!([1, "two", null, [3]]));
    assert_eq!(value.class_name(), Some("java.util.ArrayList"));
    assert_eq!(value.to_string(), "[1, two, null, [3]]");
    assert_eq!(value, read(r#"[1 "two" nil [3]]"#).unwrap());
}

#[test]
fn test_object_preserves_insertion_order() {
    let value = to_foreign(json!({"z": 1, "a": 2, "m": 3}));
    let keys: Vec<String> = value
        .entries()
        .unwrap()
        .iter()
        .map(|(k, _)| k.to_string())
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_foreign_values_pass_through() {
    let converter = Converter::new();
    let mut ids = TempIdAllocator::new(Keyword::namespaced("db.part", "user"));
    let id = ForeignValue::TempId(ids.next_id());
    let input = HostInput::object([
        ("db/id", HostInput::Foreign(id.clone())),
        ("status", HostInput::Foreign(read(":status/active").unwrap())),
    ]);
    let value = converter.to_foreign(&input).unwrap();
    assert_eq!(value.get(&"db/id".into()), Some(&id));
    assert_eq!(
        value.get(&"status".into()),
        Some(&ForeignValue::Keyword(Keyword::namespaced("status", "active")))
    );
}

#[test]
fn test_foreign_to_host_to_foreign_keeps_primitives() {
    let converter = Converter::new();
    for text in [r#""ahab""#, "true", "false", "42", "-7", "nil"] {
        let original = read(text).unwrap();
        let host = converter.to_host(&original);
        let back = converter.to_foreign(&HostInput::from(host)).unwrap();
        assert_eq!(back, original, "{}", text);
    }
}

