//! Ordered key/value annotation table
//!
//! Formats record everything they parse but do not model structurally in a
//! `MetaTable`. Keys keep their insertion order so dumps read like the source
//! header.

use std::collections::HashMap;
use std::fmt;

/// A scalar or list annotation value
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<MetaValue>),
}

impl MetaValue {
    /// Returns the text if this is a `Text` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Integer` value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a float for `Float` and `Integer` values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Float(v) => Some(*v),
            MetaValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the elements if this is a `List` value
    pub fn as_list(&self) -> Option<&[MetaValue]> {
        match self {
            MetaValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => write!(f, "{}", s),
            MetaValue::Integer(v) => write!(f, "{}", v),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Bool(v) => write!(f, "{}", v),
            MetaValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(values: Vec<T>) -> Self {
        MetaValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered string-keyed table of annotations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaTable {
    /// Entries in insertion order
    entries: Vec<(String, MetaValue)>,
    /// Position of each key in `entries`
    index: HashMap<String, usize>,
}

impl MetaTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value
    ///
    /// A replaced key keeps its original position.
    pub fn put<V: Into<MetaValue>>(&mut self, key: &str, value: V) {
        let value = value.into();
        match self.index.get(key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }

    /// Appends a value to the list stored under `key`
    ///
    /// An absent key starts a one-element list; a scalar already stored under
    /// the key becomes the first element of a new list.
    pub fn put_list<V: Into<MetaValue>>(&mut self, key: &str, value: V) {
        let value = value.into();
        let updated = match self.get(key) {
            None => MetaValue::List(vec![value]),
            Some(MetaValue::List(items)) => {
                let mut items = items.clone();
                items.push(value);
                MetaValue::List(items)
            }
            Some(scalar) => MetaValue::List(vec![scalar.clone(), value]),
        };
        self.put(key, updated);
    }

    /// Looks up a value
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    /// Removes a value, returning it
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (_, slot) in self.index.iter_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Copies every entry of `other` into this table
    pub fn merge(&mut self, other: &MetaTable) {
        for (key, value) in other.iter() {
            self.put(key, value.clone());
        }
    }
}

impl fmt::Display for MetaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "  {} = {}", key, value)?;
        }
        Ok(())
    }
}
