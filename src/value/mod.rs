//! Dynamic Typed Value Model
//!
//! The value representation shared by the decoder, the mark propagation
//! engine, and the marshalers. A value is a closed tagged union over the
//! kinds the schema language can declare, and may carry inline marks.
//! Values are immutable once constructed; every transform produces a new
//! value.

pub mod json;
pub mod path;

pub use path::{Path, PathMark, Step};

use serde_json::Number;
use std::collections::{BTreeMap, BTreeSet};

/// Opaque taint tag attached to a value, signaling sensitivity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Sensitive,
}

/// Declared type of an attribute or value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    String,
    Number,
    Bool,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Object(BTreeMap<String, Type>),
    Tuple(Vec<Type>),
    /// Type determined only by the data itself
    Dynamic,
}

impl Type {
    pub fn object<I: IntoIterator<Item = (String, Type)>>(fields: I) -> Self {
        Type::Object(fields.into_iter().collect())
    }
}

/// Discriminant of the value union
///
/// Kept in lockstep with [`Repr`] so transforms can branch exhaustively
/// on kind without holding the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Unknown,
    Bool,
    Number,
    String,
    List,
    Set,
    Tuple,
    Map,
    Object,
}

/// The data of a value, without its marks
#[derive(Debug, Clone, PartialEq)]
pub enum Repr {
    /// Absent value of the declared type
    Null(Type),
    /// Value not yet known; carries the declared type so transforms can
    /// reduce it by kind without traversal
    Unknown(Type),
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Tuple(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(BTreeMap<String, Value>),
}

/// A dynamically typed value with inline marks
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub(crate) repr: Repr,
    pub(crate) marks: BTreeSet<Mark>,
}

impl Value {
    fn bare(repr: Repr) -> Self {
        Self {
            repr,
            marks: BTreeSet::new(),
        }
    }

    pub fn null(ty: Type) -> Self {
        Self::bare(Repr::Null(ty))
    }

    pub fn unknown(ty: Type) -> Self {
        Self::bare(Repr::Unknown(ty))
    }

    pub fn boolean(value: bool) -> Self {
        Self::bare(Repr::Bool(value))
    }

    pub fn number(value: Number) -> Self {
        Self::bare(Repr::Number(value))
    }

    pub fn number_int(value: i64) -> Self {
        Self::bare(Repr::Number(Number::from(value)))
    }

    pub fn string(value: &str) -> Self {
        Self::bare(Repr::String(value.to_string()))
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Self::bare(Repr::List(elements))
    }

    /// Construct a set, deduplicating elements by structural equality
    pub fn set(elements: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(elements.len());
        for element in elements {
            if !unique.iter().any(|e| e.structurally_equal(&element)) {
                unique.push(element);
            }
        }
        Self::bare(Repr::Set(unique))
    }

    pub fn tuple(elements: Vec<Value>) -> Self {
        Self::bare(Repr::Tuple(elements))
    }

    pub fn empty_tuple() -> Self {
        Self::bare(Repr::Tuple(Vec::new()))
    }

    pub fn map<I: IntoIterator<Item = (String, Value)>>(entries: I) -> Self {
        Self::bare(Repr::Map(entries.into_iter().collect()))
    }

    pub fn object<I: IntoIterator<Item = (String, Value)>>(fields: I) -> Self {
        Self::bare(Repr::Object(fields.into_iter().collect()))
    }

    pub fn empty_object() -> Self {
        Self::bare(Repr::Object(BTreeMap::new()))
    }

    /// A copy of this value carrying the given mark in addition to any
    /// marks already present
    pub fn mark(mut self, mark: Mark) -> Self {
        self.marks.insert(mark);
        self
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    pub fn is_marked(&self) -> bool {
        !self.marks.is_empty()
    }

    pub fn marks(&self) -> &BTreeSet<Mark> {
        &self.marks
    }

    pub fn repr(&self) -> &Repr {
        &self.repr
    }

    pub fn kind(&self) -> Kind {
        match &self.repr {
            Repr::Null(_) => Kind::Null,
            Repr::Unknown(_) => Kind::Unknown,
            Repr::Bool(_) => Kind::Bool,
            Repr::Number(_) => Kind::Number,
            Repr::String(_) => Kind::String,
            Repr::List(_) => Kind::List,
            Repr::Set(_) => Kind::Set,
            Repr::Tuple(_) => Kind::Tuple,
            Repr::Map(_) => Kind::Map,
            Repr::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.repr, Repr::Null(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.repr, Repr::Unknown(_))
    }

    /// True when this value is exactly the unmarked boolean `false`
    ///
    /// This is the "trivial" mask the compaction rules drop from set, map,
    /// and object masks.
    pub fn is_false(&self) -> bool {
        self.marks.is_empty() && matches!(self.repr, Repr::Bool(false))
    }

    /// Deep equality over data, ignoring marks
    ///
    /// Marks never affect identity: an externally recorded path key must
    /// route to a set element even if that element has since acquired an
    /// inline mark. Sequence kinds (list/tuple) and keyed kinds
    /// (map/object) are mutually comparable, since persisted path keys
    /// lose that distinction; sets compare as unordered collections.
    pub fn structurally_equal(&self, other: &Value) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Null(_), Repr::Null(_)) => true,
            (Repr::Unknown(_), Repr::Unknown(_)) => true,
            (Repr::Bool(a), Repr::Bool(b)) => a == b,
            (Repr::Number(a), Repr::Number(b)) => a == b,
            (Repr::String(a), Repr::String(b)) => a == b,
            (Repr::List(a) | Repr::Tuple(a), Repr::List(b) | Repr::Tuple(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.structurally_equal(y))
            }
            (Repr::Set(a), Repr::Set(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|x| b.iter().any(|y| x.structurally_equal(y)))
            }
            (Repr::Map(a) | Repr::Object(a), Repr::Map(b) | Repr::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, x)| {
                        b.get(k).is_some_and(|y| x.structurally_equal(y))
                    })
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tracks_repr() {
        assert_eq!(Value::null(Type::String).kind(), Kind::Null);
        assert_eq!(Value::unknown(Type::Dynamic).kind(), Kind::Unknown);
        assert_eq!(Value::string("x").kind(), Kind::String);
        assert_eq!(Value::list(vec![]).kind(), Kind::List);
        assert_eq!(Value::map(vec![]).kind(), Kind::Map);
    }

    #[test]
    fn test_marks_do_not_affect_structural_equality() {
        let plain = Value::string("hello");
        let marked = Value::string("hello").mark(Mark::Sensitive);
        assert!(plain.structurally_equal(&marked));
        assert_ne!(plain, marked);
    }

    #[test]
    fn test_set_deduplicates_structurally() {
        let set = Value::set(vec![
            Value::string("a"),
            Value::string("a").mark(Mark::Sensitive),
            Value::string("b"),
        ]);
        match set.repr() {
            Repr::Set(elements) => assert_eq!(elements.len(), 2),
            other => panic!("unexpected repr: {:?}", other),
        }
    }

    #[test]
    fn test_sequence_kinds_compare_across_list_and_tuple() {
        let list = Value::list(vec![Value::string("a"), Value::number_int(1)]);
        let tuple = Value::tuple(vec![Value::string("a"), Value::number_int(1)]);
        assert!(list.structurally_equal(&tuple));
    }

    #[test]
    fn test_keyed_kinds_compare_across_map_and_object() {
        let map = Value::map(vec![("a".to_string(), Value::string("x"))]);
        let object = Value::object(vec![("a".to_string(), Value::string("x"))]);
        assert!(map.structurally_equal(&object));
        assert!(!map.structurally_equal(&Value::map(vec![(
            "b".to_string(),
            Value::string("x")
        )])));
    }

    #[test]
    fn test_sets_compare_unordered() {
        let a = Value::set(vec![Value::string("x"), Value::string("y")]);
        let b = Value::set(vec![Value::string("y"), Value::string("x")]);
        assert!(a.structurally_equal(&b));
    }

    #[test]
    fn test_is_false_only_for_unmarked_false() {
        assert!(Value::boolean(false).is_false());
        assert!(!Value::boolean(true).is_false());
        assert!(!Value::boolean(false).mark(Mark::Sensitive).is_false());
        assert!(!Value::empty_object().is_false());
    }
}
