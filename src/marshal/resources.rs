//! Resource and Output Records
//!
//! Builds the per-instance records of the output document. Every resource
//! instance contributes one record per stored object: the current object,
//! plus one per deposed object retained during replacement. Outputs are
//! marshaled with their recorded type descriptor and sensitive flag.

use crate::addrs::{InstanceKey, ModuleInstance, ResourceAddr, ResourceMode};
use crate::decode::decode_attributes;
use crate::error::MarshalError;
use crate::marshal::attributes::{marshal_attributes, AttributeValues};
use crate::schema::{ResourceSchema, SchemaRegistry};
use crate::state::{InstanceObject, OutputValue, Resource};
use crate::value::json::to_json;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::trace;

/// One resource instance object in the output document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRecord {
    pub address: String,
    pub mode: ResourceMode,
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposed_key: Option<String>,
    pub provider_name: String,
    pub values: AttributeValues,
    pub sensitive_values: JsonValue,
}

/// One output in the output document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub value: JsonValue,
    #[serde(rename = "type")]
    pub type_descriptor: JsonValue,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

/// Marshal the recorded outputs
pub fn marshal_outputs(
    outputs: &BTreeMap<String, OutputValue>,
) -> Result<BTreeMap<String, OutputRecord>, MarshalError> {
    let mut records = BTreeMap::new();
    for (name, output) in outputs {
        let value = to_json(&output.value).map_err(|source| MarshalError::Output {
            name: name.clone(),
            source,
        })?;
        records.insert(
            name.clone(),
            OutputRecord {
                value,
                type_descriptor: output.ty.descriptor(),
                sensitive: output.sensitive,
                deprecated: output.deprecated.clone().filter(|d| !d.is_empty()),
            },
        );
    }
    Ok(records)
}

/// Marshal every instance object of every resource in one module
///
/// A missing schema or a decode failure aborts the whole call; partial
/// results are never returned. Record order is not significant here;
/// callers sort by (address, deposed key) for deterministic output.
pub fn marshal_resources(
    resources: &BTreeMap<String, Resource>,
    module: &ModuleInstance,
    schemas: &dyn SchemaRegistry,
) -> Result<Vec<ResourceRecord>, MarshalError> {
    let mut records = Vec::new();
    for resource in resources.values() {
        for (key, instance) in &resource.instances {
            let address = instance_address(module, &resource.addr, key);
            let schema = schemas
                .lookup(&resource.provider, &resource.addr.type_name, resource.addr.mode)
                .ok_or_else(|| MarshalError::SchemaNotFound {
                    address: address.clone(),
                    provider: resource.provider.to_string(),
                })?;

            if let Some(object) = &instance.current {
                records.push(marshal_instance_object(
                    &address, resource, key, None, object, schema,
                )?);
            }
            for (deposed_key, object) in &instance.deposed {
                records.push(marshal_instance_object(
                    &address,
                    resource,
                    key,
                    Some(deposed_key.to_string()),
                    object,
                    schema,
                )?);
            }
        }
    }
    Ok(records)
}

fn marshal_instance_object(
    address: &str,
    resource: &Resource,
    key: &InstanceKey,
    deposed_key: Option<String>,
    object: &InstanceObject,
    schema: &ResourceSchema,
) -> Result<ResourceRecord, MarshalError> {
    let decoded =
        decode_attributes(&object.attrs_json, schema).map_err(|source| MarshalError::Decode {
            address: address.to_string(),
            source,
        })?;
    let (values, sensitive_values) =
        marshal_attributes(&decoded, schema, &object.sensitive_paths).map_err(|source| {
            MarshalError::Attributes {
                address: address.to_string(),
                source,
            }
        })?;

    trace!(address, deposed = deposed_key.is_some(), "marshaled resource instance");

    Ok(ResourceRecord {
        address: address.to_string(),
        mode: resource.addr.mode,
        type_name: resource.addr.type_name.clone(),
        name: resource.addr.name.clone(),
        index: key.index_json(),
        deposed_key,
        provider_name: resource.provider.to_string(),
        values,
        sensitive_values,
    })
}

/// Absolute instance address: module prefix, resource address, key suffix
fn instance_address(module: &ModuleInstance, addr: &ResourceAddr, key: &InstanceKey) -> String {
    if module.is_root() {
        format!("{}{}", addr, key.suffix())
    } else {
        format!("{}.{}{}", module, addr, key.suffix())
    }
}
