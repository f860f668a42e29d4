//! Tests for the annotation table

extern crate std;

use crate::metadata::{MetaTable, MetaValue};

#[test]
fn test_put_keeps_insertion_order() {
    let mut table = MetaTable::new();
    table.put("b", 1i64);
    table.put("a", "text");
    table.put("b", 2i64);

    let keys: std::vec::Vec<&str> = table.keys().collect();
    std::assert_eq!(keys, std::vec!["b", "a"]);
    std::assert_eq!(table.get("b").and_then(MetaValue::as_i64), Some(2));
    std::assert_eq!(table.len(), 2);
}

#[test]
fn test_put_list_promotes_scalars() {
    let mut table = MetaTable::new();
    table.put_list("fresh", 1.5);
    table.put("scalar", "first");
    table.put_list("scalar", "second");
    table.put_list("scalar", "third");

    std::assert_eq!(table.get("fresh"), Some(&MetaValue::List(std::vec![MetaValue::Float(1.5)])));
    let items: std::vec::Vec<&str> = table
        .get("scalar")
        .and_then(MetaValue::as_list)
        .unwrap()
        .iter()
        .filter_map(MetaValue::as_str)
        .collect();
    std::assert_eq!(items, std::vec!["first", "second", "third"]);
}

#[test]
fn test_remove_reindexes() {
    let mut table = MetaTable::new();
    table.put("one", 1i64);
    table.put("two", 2i64);
    table.put("three", 3i64);

    std::assert_eq!(table.remove("one"), Some(MetaValue::Integer(1)));
    std::assert!(table.remove("one").is_none());
    std::assert_eq!(table.get("three").and_then(MetaValue::as_i64), Some(3));
    table.put("two", 22i64);
    let values: std::vec::Vec<i64> = table.iter().filter_map(|(_, v)| v.as_i64()).collect();
    std::assert_eq!(values, std::vec![22, 3]);
}

#[test]
fn test_merge_overwrites() {
    let mut base = MetaTable::new();
    base.put("shared", "old");
    base.put("own", true);
    let mut other = MetaTable::new();
    other.put("shared", "new");
    other.put("extra", 4i64);

    base.merge(&other);
    std::assert_eq!(base.get("shared").and_then(MetaValue::as_str), Some("new"));
    std::assert!(base.contains_key("own"));
    std::assert!(base.contains_key("extra"));
    std::assert_eq!(base.len(), 3);
}

#[test]
fn test_value_accessors() {
    std::assert_eq!(MetaValue::Integer(3).as_f64(), Some(3.0));
    std::assert!(MetaValue::Text("x".to_string()).as_i64().is_none());
    std::assert_eq!(MetaValue::from(std::vec![1i64, 2]).as_list().map(|l| l.len()), Some(2));
}
