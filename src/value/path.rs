//! Value paths
//!
//! A path addresses an exact sub-value within a value tree: field steps
//! for object members, index steps for list positions, map keys, and set
//! elements (a set element is keyed by its own value). Paths arrive from
//! outside the value, recorded in persisted state alongside the raw
//! attribute bytes, so they have a stable serialized form.

use crate::error::PathError;
use crate::value::json::{implied_value, to_json};
use crate::value::{Mark, Repr, Value};
use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Object member access by field name
    Field(String),
    /// List position, map key, or set element key
    Index(Value),
}

impl Step {
    pub fn field(name: &str) -> Self {
        Step::Field(name.to_string())
    }

    pub fn index_int(index: i64) -> Self {
        Step::Index(Value::number_int(index))
    }

    pub fn index_string(key: &str) -> Self {
        Step::Index(Value::string(key))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Field(name) => write!(f, ".{}", name),
            Step::Index(key) => match to_json(key) {
                Ok(json) => write!(f, "[{}]", json),
                Err(_) => f.write_str("[?]"),
            },
        }
    }
}

// The persisted form mirrors how state files record sensitivity paths:
// {"type": "get_attr", "value": "name"} and {"type": "index", "value": <json>}.
// Index keys round-trip through plain JSON with their type implied by shape.
#[derive(Serialize, Deserialize)]
struct RawStep {
    #[serde(rename = "type")]
    kind: String,
    value: serde_json::Value,
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            Step::Field(name) => RawStep {
                kind: "get_attr".to_string(),
                value: serde_json::Value::from(name.as_str()),
            },
            Step::Index(key) => RawStep {
                kind: "index".to_string(),
                value: to_json(key).map_err(S::Error::custom)?,
            },
        };
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawStep::deserialize(deserializer)?;
        match raw.kind.as_str() {
            "get_attr" => match raw.value {
                serde_json::Value::String(name) => Ok(Step::Field(name)),
                other => Err(D::Error::custom(format!(
                    "get_attr step requires a string name, found {}",
                    other
                ))),
            },
            "index" => Ok(Step::Index(implied_value(&raw.value))),
            other => Err(D::Error::custom(format!("unknown path step type {:?}", other))),
        }
    }
}

/// An ordered sequence of steps addressing a sub-value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// The empty path, addressing the value itself
    pub fn root() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk this path against a value, returning the addressed sub-value
    ///
    /// Fails with [`PathError::Malformed`] when any step does not resolve
    /// against the structure it meets.
    pub fn resolve<'v>(&self, value: &'v Value) -> Result<&'v Value, PathError> {
        let mut current = value;
        for step in &self.steps {
            let fail = |reason: String| PathError::Malformed {
                path: self.to_string(),
                reason,
            };
            current = match (step, current.repr()) {
                (Step::Field(name), Repr::Object(fields)) => fields
                    .get(name)
                    .ok_or_else(|| fail(format!("no attribute {:?}", name)))?,
                (Step::Index(key), Repr::Map(entries)) => match key.repr() {
                    Repr::String(k) => entries
                        .get(k)
                        .ok_or_else(|| fail(format!("no map key {:?}", k)))?,
                    _ => return Err(fail("map keys are strings".to_string())),
                },
                (Step::Index(key), Repr::List(elements) | Repr::Tuple(elements)) => {
                    let index = index_position(key, elements.len()).map_err(&fail)?;
                    &elements[index]
                }
                (Step::Index(key), Repr::Set(elements)) => elements
                    .iter()
                    .find(|e| e.structurally_equal(key))
                    .ok_or_else(|| fail("no matching set element".to_string()))?,
                (_, repr) => {
                    return Err(fail(format!(
                        "step {} cannot apply to {} value",
                        step,
                        kind_word(repr)
                    )))
                }
            };
        }
        Ok(current)
    }
}

/// Interpret an index-step key as a position within `len` elements
pub(crate) fn index_position(key: &Value, len: usize) -> Result<usize, String> {
    match key.repr() {
        Repr::Number(n) => {
            let index = n
                .as_u64()
                .ok_or_else(|| format!("index {} is not a non-negative integer", n))?;
            let index = usize::try_from(index).map_err(|_| format!("index {} out of range", n))?;
            if index >= len {
                return Err(format!("index {} out of bounds (length {})", index, len));
            }
            Ok(index)
        }
        _ => Err("sequence indices are numbers".to_string()),
    }
}

pub(crate) fn kind_word(repr: &Repr) -> &'static str {
    match repr {
        Repr::Null(_) => "null",
        Repr::Unknown(_) => "unknown",
        Repr::Bool(_) => "bool",
        Repr::Number(_) => "number",
        Repr::String(_) => "string",
        Repr::List(_) => "list",
        Repr::Set(_) => "set",
        Repr::Tuple(_) => "tuple",
        Repr::Map(_) => "map",
        Repr::Object(_) => "object",
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("(root)");
        }
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// A sensitivity mark recorded against a path, supplied from outside the
/// value tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMark {
    pub path: Path,
    pub mark: Mark,
}

impl PathMark {
    /// A `Sensitive` mark at the given path
    pub fn sensitive(path: Path) -> Self {
        Self {
            path,
            mark: Mark::Sensitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::object(vec![
            (
                "list".to_string(),
                Value::list(vec![Value::string("a"), Value::string("b")]),
            ),
            (
                "map".to_string(),
                Value::map(vec![("k".to_string(), Value::number_int(1))]),
            ),
            (
                "set".to_string(),
                Value::set(vec![Value::string("x"), Value::string("y")]),
            ),
        ])
    }

    #[test]
    fn test_resolve_field_and_index() {
        let value = sample();
        let path = Path::new(vec![Step::field("list"), Step::index_int(1)]);
        assert_eq!(path.resolve(&value).unwrap(), &Value::string("b"));

        let path = Path::new(vec![Step::field("map"), Step::index_string("k")]);
        assert_eq!(path.resolve(&value).unwrap(), &Value::number_int(1));
    }

    #[test]
    fn test_resolve_set_element_by_value() {
        let value = sample();
        let path = Path::new(vec![
            Step::field("set"),
            Step::Index(Value::string("y")),
        ]);
        assert_eq!(path.resolve(&value).unwrap(), &Value::string("y"));
    }

    #[test]
    fn test_resolve_failures() {
        let value = sample();
        for path in [
            Path::new(vec![Step::field("missing")]),
            Path::new(vec![Step::field("list"), Step::index_int(9)]),
            Path::new(vec![Step::field("map"), Step::index_string("absent")]),
            Path::new(vec![Step::field("list"), Step::index_string("zero")]),
            Path::new(vec![Step::field("set"), Step::Index(Value::string("z"))]),
        ] {
            assert!(path.resolve(&value).is_err(), "resolved {:?}", path);
        }
    }

    #[test]
    fn test_root_path_resolves_to_self() {
        let value = sample();
        assert_eq!(Path::root().resolve(&value).unwrap(), &value);
    }

    #[test]
    fn test_step_serde_round_trip() {
        let path = Path::new(vec![
            Step::field("data"),
            Step::index_int(0),
            Step::Index(Value::string("key")),
        ]);
        let encoded = serde_json::to_string(&path).unwrap();
        assert_eq!(
            encoded,
            r#"[{"type":"get_attr","value":"data"},{"type":"index","value":0},{"type":"index","value":"key"}]"#
        );
        let decoded: Path = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn test_path_display() {
        let path = Path::new(vec![Step::field("data"), Step::index_int(2)]);
        assert_eq!(path.to_string(), ".data[2]");
        assert_eq!(Path::root().to_string(), "(root)");
    }
}
