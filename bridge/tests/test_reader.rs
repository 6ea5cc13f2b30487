//! Tests for the textual reader

use std::time::{Duration, Instant};

use ednbridge_core::reader::{read, read_all};
use ednbridge_core::{
    BigInt, ForeignValue, Keyword, ReadError, SeqRepr, Symbol, TextualReader, DEFAULT_MAX_DEPTH,
};

fn nested(open: &str, close: &str, depth: usize) -> String {
    format!("{}1{}", open.repeat(depth), close.repeat(depth))
}

#[test]
fn test_read_scalars() {
    assert_eq!(read("nil").unwrap(), ForeignValue::Nil);
    assert_eq!(read("true").unwrap(), ForeignValue::Boolean(true));
    assert_eq!(read("-42").unwrap(), ForeignValue::Long(-42));
    assert_eq!(read("+7").unwrap(), ForeignValue::Long(7));
    assert_eq!(read("2.5e3").unwrap(), ForeignValue::Double(2500.0));
    assert_eq!(read(r#""a\tb""#).unwrap(), ForeignValue::String("a\tb".to_string()));
    assert_eq!(read(r"\newline").unwrap(), ForeignValue::Char('\n'));
    assert_eq!(read(r"\A").unwrap(), ForeignValue::Char('A'));
}

#[test]
fn test_read_identifiers() {
    assert_eq!(
        read(":user/username").unwrap(),
        ForeignValue::Keyword(Keyword::namespaced("user", "username"))
    );
    assert_eq!(read("?e").unwrap(), ForeignValue::Symbol(Symbol::new("?e")));
    assert!(matches!(read(":"), Err(ReadError::InvalidToken { .. })));
}

#[test]
fn test_read_number_suffixes() {
    assert_eq!(
        read("12N").unwrap(),
        ForeignValue::BigInt(BigInt::parse("12").unwrap())
    );
    assert_eq!(read("1.50M").unwrap(), ForeignValue::BigDecimal("1.50".to_string()));
    assert!(matches!(read("1.5N"), Err(ReadError::InvalidNumber { .. })));
    assert!(matches!(read("012"), Err(ReadError::InvalidNumber { .. })));
}

#[test]
fn test_long_overflow_promotes_to_bigint() {
    let value = read("9223372036854775808").unwrap();
    assert_eq!(value.class_name(), Some("clojure.lang.BigInt"));
    assert_eq!(value.integer_text().unwrap(), "9223372036854775808");
    assert_eq!(read("9223372036854775807").unwrap(), ForeignValue::Long(i64::MAX));
}

#[test]
fn test_read_collections() {
    let vector = read("[1 [2] (3)]").unwrap();
    let ForeignValue::Seq(SeqRepr::Vector, items) = &vector else {
        panic!("expected vector, got {:?}", vector);
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[2].class_name(), Some("clojure.lang.PersistentList"));

    let set = read("#{:a :b}").unwrap();
    assert_eq!(set.class_name(), Some("clojure.lang.PersistentHashSet"));
    assert_eq!(set, read("#{:b :a}").unwrap());

    let map = read("{:a 1, :b 2}").unwrap();
    assert_eq!(map.get(&Keyword::new("b").into()), Some(&ForeignValue::Long(2)));
}

#[test]
fn test_comments_and_discards_are_ignored() {
    let value = read("; leading comment\n[1 #_2 3 ; trailing\n]").unwrap();
    assert_eq!(
        value,
        ForeignValue::vector(vec![ForeignValue::Long(1), ForeignValue::Long(3)])
    );
}

#[test]
fn test_tagged_literals() {
    let uuid = read(r#"#uuid "f81d4fae-7dec-11d0-a765-00a0c91e6bf6""#).unwrap();
    assert_eq!(uuid.class_name(), Some("java.util.UUID"));

    let inst = read(r#"#inst "1985-04-12T23:20:50.52Z""#).unwrap();
    assert_eq!(inst, ForeignValue::Inst("1985-04-12T23:20:50.52Z".to_string()));

    let tempid = read("#db/id [:db.part/user -1000001]").unwrap();
    assert_eq!(tempid.class_name(), Some("datomic.db.DbId"));

    let datom = read("#datom [17592186045418 :user/age 61 13194139534313 true]").unwrap();
    let fields = datom.as_datom().unwrap();
    assert_eq!(fields.v, ForeignValue::Long(61));
    assert!(fields.added);
}

#[test]
fn test_malformed_tagged_literals() {
    assert!(matches!(
        read(r#"#uuid "nope""#),
        Err(ReadError::InvalidTagged { ref tag, .. }) if tag == "uuid"
    ));
    assert!(matches!(
        read("#datom [1 2 3 4 5]"),
        Err(ReadError::InvalidTagged { .. })
    ));
    assert!(matches!(
        read("#foo/bar 1"),
        Err(ReadError::UnknownTag { ref tag, offset: 0 }) if tag == "foo/bar"
    ));
}

#[test]
fn test_malformed_text_reports_offsets() {
    assert_eq!(read(""), Err(ReadError::EmptyInput));
    assert_eq!(read("  ; only a comment"), Err(ReadError::EmptyInput));
    assert_eq!(read("[1 2"), Err(ReadError::UnexpectedEof { offset: 4 }));
    assert_eq!(
        read("[1 2)"),
        Err(ReadError::UnmatchedDelimiter { found: ')', offset: 4 })
    );
    assert_eq!(read("{:a}"), Err(ReadError::OddMapEntries { offset: 0 }));
    assert_eq!(read("1 2"), Err(ReadError::TrailingInput { offset: 2 }));
    assert!(matches!(
        read("{:a 1 :a 2}"),
        Err(ReadError::DuplicateKey { ref key, .. }) if key == ":a"
    ));
    assert!(matches!(
        read(r#""bad \q""#),
        Err(ReadError::InvalidEscape { ref found, offset: 5 }) if found == "q"
    ));
}

#[test]
fn test_read_all_forms() {
    let forms = read_all(":a 1 \"x\"").unwrap();
    assert_eq!(forms.len(), 3);
    assert!(read_all("").unwrap().is_empty());
}

#[test]
fn test_literal_notation_reads_back() {
    let reader = TextualReader::new();
    for text in [
        r#"{:name "ahab", :ranks #{1 2N}}"#,
        "[1.0 -0.5 ##Inf nil true]",
        r#"(:a "q\"uote" \space)"#,
        "#datom [1 :a \"v\" 2 false]",
        "#db/id [:db.part/user -1000001]",
    ] {
        let value = reader.read(text).unwrap();
        assert_eq!(reader.read(&value.to_edn()).unwrap(), value, "{}", text);
    }
}

#[test]
fn test_unicode_escapes_need_four_hex_digits() {
    assert_eq!(read(r#""\u004A""#).unwrap(), ForeignValue::String("J".to_string()));
    assert_eq!(read(r"\u004A").unwrap(), ForeignValue::Char('J'));
    assert_eq!(
        read(r#""\u+04A""#),
        Err(ReadError::InvalidEscape {
            found: "u+04A".to_string(),
            offset: 1
        })
    );
    assert!(matches!(
        read(r"\u+04A"),
        Err(ReadError::InvalidToken { ref text, offset: 0 }) if text == r"\u+04A"
    ));
}

#[test]
fn test_nesting_up_to_the_limit_reads() {
    let value = read(&nested("[", "]", DEFAULT_MAX_DEPTH)).unwrap();
    assert!(value.elements().is_some());
    assert!(read(&nested("#{", "}", DEFAULT_MAX_DEPTH)).is_ok());
}

#[test]
fn test_deep_nesting_is_an_error() {
    for depth in [DEFAULT_MAX_DEPTH + 1, 3_000, 50_000] {
        assert_eq!(
            read(&nested("[", "]", depth)),
            Err(ReadError::DepthLimitExceeded { offset: DEFAULT_MAX_DEPTH })
        );
        assert_eq!(
            read(&nested("#{", "}", depth)),
            Err(ReadError::DepthLimitExceeded { offset: 2 * DEFAULT_MAX_DEPTH })
        );
    }
    assert!(matches!(
        read(&format!("{}1", "#_".repeat(50_000))),
        Err(ReadError::DepthLimitExceeded { .. })
    ));
    assert!(matches!(
        read(&format!("{}\"2020\"", "#inst ".repeat(50_000))),
        Err(ReadError::DepthLimitExceeded { .. })
    ));
    assert!(matches!(
        read_all(&format!("1 {}", "(".repeat(50_000))),
        Err(ReadError::DepthLimitExceeded { .. })
    ));
}

#[test]
fn test_depth_limit_is_configurable() {
    let reader = TextualReader::with_depth_limit(3);
    assert_eq!(reader.depth_limit(), 3);
    assert!(reader.read("{:a [#{1}]}").is_ok());
    assert_eq!(
        reader.read("{:a [#{[1]}]}"),
        Err(ReadError::DepthLimitExceeded { offset: 7 })
    );
}

#[test]
fn test_large_collections_read_in_linear_time() {
    let entries: Vec<String> = (0..40_000).map(|i| format!(":k{} {}", i, i)).collect();
    let text = format!("{{{}}}", entries.join(" "));

    let started = Instant::now();
    let map = read(&text).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5), "read took {:?}", started.elapsed());
    assert_eq!(map.entries().unwrap().len(), 40_000);

    let members: Vec<String> = (0..40_000).map(|i| format!("[{} \"s{}\"]", i, i)).collect();
    let started = Instant::now();
    let set = read(&format!("#{{{}}}", members.join(" "))).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5), "read took {:?}", started.elapsed());
    assert_eq!(set.elements().unwrap().len(), 40_000);
}

#[test]
fn test_duplicates_follow_engine_equality() {
    assert!(matches!(
        read("#{1 2 1N}"),
        Err(ReadError::DuplicateKey { ref key, .. }) if key == "1N"
    ));
    assert!(matches!(
        read("{[1 2] :a (1 2) :b}"),
        Err(ReadError::DuplicateKey { ref key, .. }) if key == "(1 2)"
    ));
    assert!(matches!(
        read("#{#{1 2} #{2 1}}"),
        Err(ReadError::DuplicateKey { .. })
    ));
    assert!(read("#{1 1.0}").is_ok());
}
