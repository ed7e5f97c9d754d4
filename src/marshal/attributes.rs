//! Attribute Marshaling
//!
//! Turns a decoded attribute object into its two public faces: the
//! plaintext attribute values, and the sensitivity mask that tells
//! consumers which parts of those values must be redacted before display.

use crate::error::AttributeError;
use crate::marks::{apply_path_mark, redaction_mask_with_paths};
use crate::schema::ResourceSchema;
use crate::value::json::to_json;
use crate::value::{Mark, Path, PathMark, Repr, Step, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Attribute name to plaintext JSON fragment
pub type AttributeValues = BTreeMap<String, JsonValue>;

/// Encode a decoded attribute object as plaintext JSON fragments
///
/// A null value means "no attributes" and yields an empty map rather than
/// explicit null members. Inline marks are stripped; redaction lives in
/// the mask, never in the values.
pub fn marshal_attribute_values(value: &Value) -> Result<AttributeValues, AttributeError> {
    match value.repr() {
        Repr::Object(fields) | Repr::Map(fields) => {
            let mut out = AttributeValues::new();
            for (name, member) in fields {
                out.insert(name.clone(), to_json(member)?);
            }
            Ok(out)
        }
        // The decoder only ever produces an object; anything else is the
        // no-attributes case.
        _ => Ok(AttributeValues::new()),
    }
}

/// Marshal a decoded attribute object into plaintext values plus the
/// sensitivity mask
///
/// The mask folds together both sensitivity sources: each attribute the
/// schema declares `sensitive` is marked inline at its own path, and the
/// dynamically recorded `path_marks` are merged on top.
pub fn marshal_attributes(
    value: &Value,
    schema: &ResourceSchema,
    path_marks: &[PathMark],
) -> Result<(AttributeValues, JsonValue), AttributeError> {
    let values = marshal_attribute_values(value)?;

    // A null root has no attribute members to fold schema sensitivity
    // into; its mask is whatever the dynamic marks say about the whole.
    if value.is_null() {
        let mask = redaction_mask_with_paths(value, path_marks)?;
        return Ok((values, to_json(&mask)?));
    }

    let mut marked = value.clone();
    for (name, attr) in &schema.attributes {
        if attr.sensitive {
            marked = apply_path_mark(
                &marked,
                &PathMark {
                    path: Path::new(vec![Step::field(name)]),
                    mark: Mark::Sensitive,
                },
            )?;
        }
    }
    let mask = redaction_mask_with_paths(&marked, path_marks)?;

    Ok((values, to_json(&mask)?))
}
