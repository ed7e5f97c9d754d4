//! Output Document Assembly
//!
//! The top-level entry point: turns a state snapshot plus a schema
//! registry into the versioned output document. Rendering the same
//! snapshot always yields a byte-identical string; every map in the
//! document serializes with lexicographically sorted keys.

pub mod attributes;
pub mod modules;
pub mod resources;

pub use attributes::{marshal_attribute_values, marshal_attributes, AttributeValues};
pub use modules::{marshal_modules, marshal_root_module, ModuleRecord};
pub use resources::{marshal_outputs, marshal_resources, OutputRecord, ResourceRecord};

use crate::error::MarshalError;
use crate::schema::SchemaRegistry;
use crate::state::State;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Version of the output document format
pub const FORMAT_VERSION: &str = "1.0";

/// The versioned output document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDocument {
    pub format_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<StateValues>,
}

/// The values block of the document: root outputs and the module tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateValues {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, OutputRecord>,
    pub root_module: ModuleRecord,
}

/// Marshal a state snapshot into the output document
///
/// An empty snapshot produces a document with no values block at all.
pub fn marshal_state(
    state: &State,
    schemas: &dyn SchemaRegistry,
) -> Result<StateDocument, MarshalError> {
    if state.is_empty() {
        return Ok(StateDocument {
            format_version: FORMAT_VERSION.to_string(),
            values: None,
        });
    }

    let outputs = marshal_outputs(state.outputs())?;
    let root_module = marshal_root_module(state, schemas)?;
    debug!(outputs = outputs.len(), "marshaled state snapshot");

    Ok(StateDocument {
        format_version: FORMAT_VERSION.to_string(),
        values: Some(StateValues {
            outputs,
            root_module,
        }),
    })
}

impl StateDocument {
    /// Render the document as a compact JSON string
    pub fn render(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Render the document as an indented JSON string
    pub fn render_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
