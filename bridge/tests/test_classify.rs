//! Tests for type classification

use ednbridge_core::reader::read;
use ednbridge_core::{ForeignKind, ForeignValue, TypeClassifier};

fn kind(text: &str) -> ForeignKind {
    TypeClassifier::new().classify(&read(text).unwrap())
}

#[test]
fn test_scalar_kinds() {
    assert_eq!(kind("nil"), ForeignKind::Nil);
    assert_eq!(kind("false"), ForeignKind::Bool);
    assert_eq!(kind("1"), ForeignKind::Long);
    assert_eq!(kind("1N"), ForeignKind::Long);
    assert_eq!(kind("1.5"), ForeignKind::Double);
    assert_eq!(kind(r#""s""#), ForeignKind::String);
    assert_eq!(kind(":k"), ForeignKind::Keyword);
    assert_eq!(kind("sym"), ForeignKind::Symbol);
}

#[test]
fn test_distinct_set_classes_share_a_kind() {
    let classifier = TypeClassifier::new();
    let persistent = read("#{1}").unwrap();
    let host_built = ForeignValue::hash_set(vec![ForeignValue::Long(1)]);
    assert_ne!(persistent.class_name(), host_built.class_name());
    assert_eq!(classifier.classify(&persistent), ForeignKind::Set);
    assert_eq!(classifier.classify(&host_built), ForeignKind::Set);
}

#[test]
fn test_distinct_map_classes_share_a_kind() {
    let classifier = TypeClassifier::new();
    let small = read("{:a 1}").unwrap();
    let large = read("{:a 1 :b 2 :c 3 :d 4 :e 5 :f 6 :g 7 :h 8 :i 9}").unwrap();
    let host_built = ForeignValue::java_map_from_kvs(vec!["a".into(), ForeignValue::Long(1)]);
    for map in [&small, &large, &host_built] {
        assert_eq!(classifier.classify(map), ForeignKind::Map);
    }
    assert_eq!(large.class_name(), Some("clojure.lang.PersistentHashMap"));
}

#[test]
fn test_sequential_classes_are_vectors() {
    assert_eq!(kind("[1]"), ForeignKind::Vector);
    assert_eq!(kind("(1)"), ForeignKind::Vector);
    assert_eq!(
        TypeClassifier::new().classify(&ForeignValue::array_list(vec![])),
        ForeignKind::Vector
    );
}

#[test]
fn test_datom_is_record() {
    assert_eq!(kind("#datom [1 :a 2 3 true]"), ForeignKind::Record);
}

#[test]
fn test_unmodeled_classes_are_unknown() {
    for text in [
        r"\c",
        "1.5M",
        r#"#uuid "f81d4fae-7dec-11d0-a765-00a0c91e6bf6""#,
        r#"#inst "2020-01-01T00:00:00Z""#,
        "#db/id [:db.part/user]",
    ] {
        assert_eq!(kind(text), ForeignKind::Unknown, "{}", text);
    }
}

#[test]
fn test_registered_class_is_recognized() {
    let classifier = TypeClassifier::new().with_class("java.util.Date", ForeignKind::String);
    let inst = read(r#"#inst "2020-01-01T00:00:00Z""#).unwrap();
    assert_eq!(classifier.classify(&inst), ForeignKind::String);
    assert_eq!(classifier.kind_of("java.util.Date"), ForeignKind::String);
}
