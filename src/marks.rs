//! Mark Propagation
//!
//! Computes redaction masks: boolean-shaped mirrors of a value marking
//! which parts are sensitive. A marked sub-value collapses to the single
//! boolean `true` in place of its entire substructure, so nothing about a
//! sensitive value's shape leaks through the mask. Marks arrive two ways:
//! inline on the value itself, and as an external path-addressed list
//! recorded in persisted state; both feed the same mask.
//!
//! Compaction is deliberately asymmetric. List and tuple masks keep every
//! position, `false` entries included, so consumers can align mask index
//! with source index. Set, map, and object masks omit members whose mask
//! is exactly `false`; absent key means not sensitive.

use crate::error::PathError;
use crate::value::path::{index_position, kind_word};
use crate::value::{Mark, Path, PathMark, Repr, Step, Type, Value};

/// Compute the redaction mask of a value from its inline marks
pub fn redaction_mask(value: &Value) -> Value {
    if value.is_marked() {
        return Value::boolean(true);
    }
    match value.repr() {
        Repr::Null(_) | Repr::Bool(_) | Repr::Number(_) | Repr::String(_) => {
            Value::boolean(false)
        }
        // Unknown compounds reduce by kind; their members do not exist yet
        // and must not be traversed.
        Repr::Unknown(ty) => unknown_mask(ty),
        Repr::List(elements) | Repr::Tuple(elements) => {
            Value::tuple(elements.iter().map(redaction_mask).collect())
        }
        Repr::Set(elements) => {
            let kept: Vec<Value> = elements
                .iter()
                .map(redaction_mask)
                .filter(|mask| !mask.is_false())
                .collect();
            if kept.is_empty() {
                Value::empty_object()
            } else {
                Value::tuple(kept)
            }
        }
        Repr::Map(entries) | Repr::Object(entries) => {
            let kept: std::collections::BTreeMap<String, Value> = entries
                .iter()
                .filter_map(|(key, member)| {
                    let mask = redaction_mask(member);
                    (!mask.is_false()).then(|| (key.clone(), mask))
                })
                .collect();
            Value::object(kept)
        }
    }
}

/// Compute the redaction mask of a value, merging inline marks with an
/// externally recorded path-mark list
///
/// Every supplied path must resolve against the value's structure; a path
/// that does not is a [`PathError::Malformed`], never silently dropped,
/// since an unresolvable path would hide a sensitivity marking.
pub fn redaction_mask_with_paths(
    value: &Value,
    path_marks: &[PathMark],
) -> Result<Value, PathError> {
    let mut marked = value.clone();
    for path_mark in path_marks {
        marked = apply_path_mark(&marked, path_mark)?;
    }
    Ok(redaction_mask(&marked))
}

/// A copy of `value` with the mark attached at the addressed sub-value
pub fn apply_path_mark(value: &Value, path_mark: &PathMark) -> Result<Value, PathError> {
    apply_mark_at(value, &path_mark.path, path_mark.path.steps(), path_mark.mark)
}

fn unknown_mask(ty: &Type) -> Value {
    match ty {
        Type::List(_) | Type::Tuple(_) => Value::empty_tuple(),
        Type::Set(_) | Type::Map(_) | Type::Object(_) => Value::empty_object(),
        Type::String | Type::Number | Type::Bool | Type::Dynamic => Value::boolean(false),
    }
}

fn apply_mark_at(
    value: &Value,
    full_path: &Path,
    remaining: &[Step],
    mark: Mark,
) -> Result<Value, PathError> {
    let Some((step, rest)) = remaining.split_first() else {
        return Ok(value.clone().mark(mark));
    };
    let fail = |reason: String| PathError::Malformed {
        path: full_path.to_string(),
        reason,
    };

    let repr = match (step, value.repr()) {
        (Step::Field(name), Repr::Object(fields)) => {
            let member = fields
                .get(name)
                .ok_or_else(|| fail(format!("no attribute {:?}", name)))?;
            let mut fields = fields.clone();
            fields.insert(name.clone(), apply_mark_at(member, full_path, rest, mark)?);
            Repr::Object(fields)
        }
        (Step::Index(key), Repr::Map(entries)) => {
            let Repr::String(map_key) = key.repr() else {
                return Err(fail("map keys are strings".to_string()));
            };
            let member = entries
                .get(map_key)
                .ok_or_else(|| fail(format!("no map key {:?}", map_key)))?;
            let mut entries = entries.clone();
            entries.insert(map_key.clone(), apply_mark_at(member, full_path, rest, mark)?);
            Repr::Map(entries)
        }
        (Step::Index(key), Repr::List(elements)) => {
            Repr::List(replace_at(elements, key, full_path, rest, mark, &fail)?)
        }
        (Step::Index(key), Repr::Tuple(elements)) => {
            Repr::Tuple(replace_at(elements, key, full_path, rest, mark, &fail)?)
        }
        (Step::Index(key), Repr::Set(elements)) => {
            // Set elements are addressed by their own value; routing
            // compares structurally so a key recorded against the stored
            // value still matches after other marks were applied.
            let position = elements
                .iter()
                .position(|element| element.structurally_equal(key))
                .ok_or_else(|| fail("no matching set element".to_string()))?;
            let mut elements = elements.clone();
            elements[position] = apply_mark_at(&elements[position], full_path, rest, mark)?;
            Repr::Set(elements)
        }
        (step, repr) => {
            return Err(fail(format!(
                "step {} cannot apply to {} value",
                step,
                kind_word(repr)
            )));
        }
    };

    Ok(Value {
        repr,
        marks: value.marks().clone(),
    })
}

fn replace_at(
    elements: &[Value],
    key: &Value,
    full_path: &Path,
    rest: &[Step],
    mark: Mark,
    fail: &dyn Fn(String) -> PathError,
) -> Result<Vec<Value>, PathError> {
    let position = index_position(key, elements.len()).map_err(fail)?;
    let mut elements = elements.to_vec();
    elements[position] = apply_mark_at(&elements[position], full_path, rest, mark)?;
    Ok(elements)
}
