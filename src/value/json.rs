//! Plaintext JSON encoding
//!
//! Converts values to plain JSON fragments and types to their descriptor
//! form. Object and map keys land in `serde_json` maps backed by a
//! sorted-key representation, so rendering the same inputs always yields
//! byte-identical documents.

use crate::error::EncodeError;
use crate::value::{Repr, Type, Value};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Encode a value as a plain JSON fragment
///
/// Inline marks are stripped; redaction is the mask's job, not the
/// encoder's. Unknown values have no JSON form and fail.
pub fn to_json(value: &Value) -> Result<JsonValue, EncodeError> {
    match value.repr() {
        Repr::Null(_) => Ok(JsonValue::Null),
        Repr::Unknown(_) => Err(EncodeError::UnknownValue),
        Repr::Bool(b) => Ok(JsonValue::Bool(*b)),
        Repr::Number(n) => Ok(JsonValue::Number(n.clone())),
        Repr::String(s) => Ok(JsonValue::String(s.clone())),
        Repr::List(elements) | Repr::Set(elements) | Repr::Tuple(elements) => Ok(
            JsonValue::Array(elements.iter().map(to_json).collect::<Result<_, _>>()?),
        ),
        Repr::Map(entries) | Repr::Object(entries) => {
            let mut out = serde_json::Map::new();
            for (key, member) in entries {
                out.insert(key.clone(), to_json(member)?);
            }
            Ok(JsonValue::Object(out))
        }
    }
}

/// Build a value from plain JSON, with the type implied by shape
///
/// Arrays become tuples and objects become object values; there is no
/// way to recover list/set or map intent from plain JSON.
pub fn implied_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::null(Type::Dynamic),
        JsonValue::Bool(b) => Value::boolean(*b),
        JsonValue::Number(n) => Value::number(n.clone()),
        JsonValue::String(s) => Value::string(s),
        JsonValue::Array(elements) => Value::tuple(elements.iter().map(implied_value).collect()),
        JsonValue::Object(fields) => Value::object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), implied_value(v))),
        ),
    }
}

impl Type {
    /// The type rendered in the descriptor grammar
    ///
    /// Primitives are strings; collections are `[kind, element]` pairs;
    /// objects are `["object", {field: descriptor}]`; tuples are
    /// `["tuple", [descriptor, ...]]`.
    pub fn descriptor(&self) -> JsonValue {
        match self {
            Type::String => JsonValue::from("string"),
            Type::Number => JsonValue::from("number"),
            Type::Bool => JsonValue::from("bool"),
            Type::Dynamic => JsonValue::from("dynamic"),
            Type::List(element) => serde_json::json!(["list", element.descriptor()]),
            Type::Set(element) => serde_json::json!(["set", element.descriptor()]),
            Type::Map(element) => serde_json::json!(["map", element.descriptor()]),
            Type::Object(fields) => {
                let mut descriptors = serde_json::Map::new();
                for (name, field) in fields {
                    descriptors.insert(name.clone(), field.descriptor());
                }
                serde_json::json!(["object", descriptors])
            }
            Type::Tuple(elements) => {
                let descriptors: Vec<JsonValue> =
                    elements.iter().map(Type::descriptor).collect();
                serde_json::json!(["tuple", descriptors])
            }
        }
    }

    /// Parse a type from its descriptor form
    pub fn from_descriptor(descriptor: &JsonValue) -> Result<Type, String> {
        match descriptor {
            JsonValue::String(name) => match name.as_str() {
                "string" => Ok(Type::String),
                "number" => Ok(Type::Number),
                "bool" => Ok(Type::Bool),
                "dynamic" => Ok(Type::Dynamic),
                other => Err(format!("unknown primitive type {:?}", other)),
            },
            JsonValue::Array(parts) => {
                let [kind, argument] = parts.as_slice() else {
                    return Err("compound type descriptors have exactly two elements".to_string());
                };
                let kind = kind
                    .as_str()
                    .ok_or_else(|| "compound type kind must be a string".to_string())?;
                match kind {
                    "list" => Ok(Type::List(Box::new(Type::from_descriptor(argument)?))),
                    "set" => Ok(Type::Set(Box::new(Type::from_descriptor(argument)?))),
                    "map" => Ok(Type::Map(Box::new(Type::from_descriptor(argument)?))),
                    "object" => {
                        let fields = argument
                            .as_object()
                            .ok_or_else(|| "object descriptor requires a field map".to_string())?;
                        let mut out = std::collections::BTreeMap::new();
                        for (name, field) in fields {
                            out.insert(name.clone(), Type::from_descriptor(field)?);
                        }
                        Ok(Type::Object(out))
                    }
                    "tuple" => {
                        let elements = argument
                            .as_array()
                            .ok_or_else(|| "tuple descriptor requires an element list".to_string())?;
                        Ok(Type::Tuple(
                            elements
                                .iter()
                                .map(Type::from_descriptor)
                                .collect::<Result<_, _>>()?,
                        ))
                    }
                    other => Err(format!("unknown compound type kind {:?}", other)),
                }
            }
            other => Err(format!("malformed type descriptor: {}", other)),
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.descriptor().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let descriptor = JsonValue::deserialize(deserializer)?;
        Type::from_descriptor(&descriptor).map_err(D::Error::custom)
    }
}
