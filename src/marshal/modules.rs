//! Module Tree Assembly
//!
//! Groups resource records by owning module instance and nests modules
//! according to the parent/child address relation. The relation is
//! derived from the snapshot's module addresses, so an intermediate
//! module that owns no resources still appears between its parent and
//! its populated descendants.

use crate::addrs::ModuleInstance;
use crate::error::MarshalError;
use crate::marshal::resources::{marshal_resources, ResourceRecord};
use crate::schema::SchemaRegistry;
use crate::state::State;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// One module instance in the output document
///
/// The root module serializes without its (empty) address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_modules: Vec<ModuleRecord>,
}

/// Assemble the root module record and its nested children
pub fn marshal_root_module(
    state: &State,
    schemas: &dyn SchemaRegistry,
) -> Result<ModuleRecord, MarshalError> {
    let children_of = state.child_modules();
    let root_children = children_of.get("").cloned().unwrap_or_default();
    let record = ModuleRecord {
        address: String::new(),
        resources: module_resources(state, &ModuleInstance::root(), schemas)?,
        child_modules: marshal_modules(state, schemas, &root_children, &children_of)?,
    };
    debug!(
        resources = record.resources.len(),
        child_modules = record.child_modules.len(),
        "assembled root module"
    );
    Ok(record)
}

/// Assemble records for the given module instances, recursing into their
/// children per the supplied relation
///
/// Sibling modules are ordered by rendered address; resources within each
/// module are ordered by (address, deposed key). Addresses grow strictly
/// from parent to child, so the recursion is bounded by nesting depth.
pub fn marshal_modules(
    state: &State,
    schemas: &dyn SchemaRegistry,
    modules: &[ModuleInstance],
    children_of: &BTreeMap<String, Vec<ModuleInstance>>,
) -> Result<Vec<ModuleRecord>, MarshalError> {
    let mut records = Vec::with_capacity(modules.len());
    for module in modules {
        let address = module.to_string();
        let children = children_of.get(&address).cloned().unwrap_or_default();
        records.push(ModuleRecord {
            address,
            resources: module_resources(state, module, schemas)?,
            child_modules: marshal_modules(state, schemas, &children, children_of)?,
        });
    }
    records.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(records)
}

fn module_resources(
    state: &State,
    module: &ModuleInstance,
    schemas: &dyn SchemaRegistry,
) -> Result<Vec<ResourceRecord>, MarshalError> {
    let mut records = match state.module(module) {
        Some(found) => marshal_resources(&found.resources, module, schemas)?,
        None => Vec::new(),
    };
    records.sort_by(|a, b| {
        (a.address.as_str(), a.deposed_key.as_deref())
            .cmp(&(b.address.as_str(), b.deposed_key.as_deref()))
    });
    Ok(records)
}
