//! Schema-Driven Attribute Decoding
//!
//! Reconstructs typed attribute values from the raw bytes persisted with a
//! resource instance. The stored payload is a JSON object keyed by
//! attribute name; the schema declares what type each attribute must
//! carry. The decoded result is an object value with exactly the schema's
//! attributes: absent attributes decode to typed nulls, undeclared keys
//! are ignored.

use crate::error::DecodeError;
use crate::schema::ResourceSchema;
use crate::value::json::implied_value;
use crate::value::{Type, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Decode stored raw attribute bytes against a resource schema
pub fn decode_attributes(raw: &[u8], schema: &ResourceSchema) -> Result<Value, DecodeError> {
    let parsed: JsonValue = serde_json::from_slice(raw)?;
    let JsonValue::Object(fields) = &parsed else {
        return Err(DecodeError::NotAnObject {
            found: json_shape(&parsed).to_string(),
        });
    };

    let mut attributes = BTreeMap::new();
    for (name, attr) in &schema.attributes {
        let value = match fields.get(name) {
            Some(json) => coerce(json, &attr.ty, name)?,
            None => Value::null(attr.ty.clone()),
        };
        attributes.insert(name.clone(), value);
    }
    Ok(Value::object(attributes))
}

/// Coerce a plain JSON fragment into a declared type
///
/// Attribute decoding uses this per attribute; it also stands alone for
/// values persisted with an explicit type, like recorded outputs.
pub fn decode_value(json: &JsonValue, ty: &Type, context: &str) -> Result<Value, DecodeError> {
    coerce(json, ty, context)
}

/// Coerce one JSON fragment into the declared type
///
/// `context` names the attribute (with any nested path accumulated) for
/// error reporting.
fn coerce(json: &JsonValue, ty: &Type, context: &str) -> Result<Value, DecodeError> {
    let mismatch = || DecodeError::SchemaMismatch {
        attribute: context.to_string(),
        expected: ty.descriptor().to_string(),
        found: json_shape(json).to_string(),
    };

    if json.is_null() {
        return Ok(Value::null(ty.clone()));
    }

    match ty {
        Type::String => match json {
            JsonValue::String(s) => Ok(Value::string(s)),
            // Primitive conversions mirror what the configuration
            // language permits.
            JsonValue::Number(n) => Ok(Value::string(&n.to_string())),
            JsonValue::Bool(b) => Ok(Value::string(if *b { "true" } else { "false" })),
            _ => Err(mismatch()),
        },
        Type::Number => match json {
            JsonValue::Number(n) => Ok(Value::number(n.clone())),
            JsonValue::String(s) => serde_json::from_str::<serde_json::Number>(s)
                .map(Value::number)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        Type::Bool => match json {
            JsonValue::Bool(b) => Ok(Value::boolean(*b)),
            JsonValue::String(s) => match s.as_str() {
                "true" => Ok(Value::boolean(true)),
                "false" => Ok(Value::boolean(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        Type::List(element) => match json {
            JsonValue::Array(items) => Ok(Value::list(coerce_elements(items, element, context)?)),
            _ => Err(mismatch()),
        },
        Type::Set(element) => match json {
            JsonValue::Array(items) => Ok(Value::set(coerce_elements(items, element, context)?)),
            _ => Err(mismatch()),
        },
        Type::Tuple(elements) => match json {
            JsonValue::Array(items) if items.len() == elements.len() => Ok(Value::tuple(
                items
                    .iter()
                    .zip(elements)
                    .enumerate()
                    .map(|(i, (item, element))| {
                        coerce(item, element, &format!("{}[{}]", context, i))
                    })
                    .collect::<Result<_, _>>()?,
            )),
            _ => Err(mismatch()),
        },
        Type::Map(element) => match json {
            JsonValue::Object(entries) => Ok(Value::map(
                entries
                    .iter()
                    .map(|(key, member)| {
                        coerce(member, element, &format!("{}[{:?}]", context, key))
                            .map(|value| (key.clone(), value))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?,
            )),
            _ => Err(mismatch()),
        },
        Type::Object(declared) => match json {
            JsonValue::Object(entries) => {
                let mut out = BTreeMap::new();
                for (name, field_ty) in declared {
                    let value = match entries.get(name) {
                        Some(member) => {
                            coerce(member, field_ty, &format!("{}.{}", context, name))?
                        }
                        None => Value::null(field_ty.clone()),
                    };
                    out.insert(name.clone(), value);
                }
                Ok(Value::object(out))
            }
            _ => Err(mismatch()),
        },
        Type::Dynamic => Ok(implied_value(json)),
    }
}

fn coerce_elements(
    items: &[JsonValue],
    element: &Type,
    context: &str,
) -> Result<Vec<Value>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| coerce(item, element, &format!("{}[{}]", context, i)))
        .collect()
}

fn json_shape(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
