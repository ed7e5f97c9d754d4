//! Snapshot CLI
//!
//! Command parsing and snapshot loading for the `stateview` binary. A
//! snapshot file captures what the state layer hands the marshaler:
//! modules of resource instances with raw attribute payloads and recorded
//! sensitive paths, plus root outputs stored with their type descriptors.

use crate::addrs::{
    DeposedKey, InstanceKey, ModuleInstance, ProviderAddr, ResourceAddr, ResourceMode,
};
use crate::decode::decode_value;
use crate::error::MarshalError;
use crate::schema::SchemaTable;
use crate::state::{InstanceObject, ObjectStatus, OutputValue, State};
use crate::value::{Path as ValuePath, PathMark, Type};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Command-line interface of the snapshot viewer
#[derive(Debug, Parser)]
#[command(
    name = "stateview",
    version,
    about = "Deterministic JSON projection of infrastructure state"
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the output document for a state snapshot
    Show {
        /// Path to the state snapshot JSON file
        #[arg(long)]
        state: PathBuf,

        /// Path to the schema table JSON file
        #[arg(long)]
        schemas: PathBuf,

        /// Indent the output document
        #[arg(long)]
        pretty: bool,
    },
}

// Serde mirror of the snapshot file format.

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    modules: Vec<SnapshotModule>,
    #[serde(default)]
    outputs: BTreeMap<String, SnapshotOutput>,
}

#[derive(Debug, Deserialize)]
struct SnapshotModule {
    /// Rendered module instance address; empty for the root module
    #[serde(default)]
    address: String,
    #[serde(default)]
    resources: Vec<SnapshotResource>,
}

#[derive(Debug, Deserialize)]
struct SnapshotResource {
    mode: ResourceMode,
    #[serde(rename = "type")]
    type_name: String,
    name: String,
    provider: ProviderAddr,
    #[serde(default)]
    instances: Vec<SnapshotInstance>,
}

#[derive(Debug, Deserialize)]
struct SnapshotInstance {
    /// Instance key: integer, string, or absent
    #[serde(default)]
    index: Option<serde_json::Value>,
    #[serde(default)]
    schema_version: u64,
    attributes: serde_json::Value,
    #[serde(default)]
    sensitive_paths: Vec<ValuePath>,
    #[serde(default = "default_status")]
    status: ObjectStatus,
    /// Set when this entry is a deposed object rather than the current one
    #[serde(default)]
    deposed: Option<DeposedKey>,
}

fn default_status() -> ObjectStatus {
    ObjectStatus::Ready
}

#[derive(Debug, Deserialize)]
struct SnapshotOutput {
    value: serde_json::Value,
    #[serde(rename = "type")]
    ty: Type,
    #[serde(default)]
    sensitive: bool,
    #[serde(default)]
    deprecated: Option<String>,
}

/// Parse a state snapshot from raw JSON bytes
pub fn parse_state(bytes: &[u8]) -> Result<State, MarshalError> {
    let snapshot: SnapshotFile =
        serde_json::from_slice(bytes).map_err(|e| MarshalError::Snapshot(e.to_string()))?;

    let mut state = State::new();
    for module in &snapshot.modules {
        let module_addr = ModuleInstance::parse(&module.address)
            .map_err(|e| MarshalError::Snapshot(e.to_string()))?;
        for resource in &module.resources {
            let addr = ResourceAddr {
                mode: resource.mode,
                type_name: resource.type_name.clone(),
                name: resource.name.clone(),
            };
            for instance in &resource.instances {
                let key = instance_key(instance.index.as_ref())?;
                let object = InstanceObject {
                    schema_version: instance.schema_version,
                    attrs_json: serde_json::to_vec(&instance.attributes)
                        .map_err(|e| MarshalError::Snapshot(e.to_string()))?,
                    sensitive_paths: instance
                        .sensitive_paths
                        .iter()
                        .cloned()
                        .map(PathMark::sensitive)
                        .collect(),
                    status: instance.status,
                };
                match &instance.deposed {
                    None => state.set_resource_instance_current(
                        &module_addr,
                        &addr,
                        key,
                        &resource.provider,
                        object,
                    ),
                    Some(deposed_key) => state.set_resource_instance_deposed(
                        &module_addr,
                        &addr,
                        key,
                        deposed_key.clone(),
                        &resource.provider,
                        object,
                    ),
                }
            }
        }
    }

    for (name, output) in &snapshot.outputs {
        let value = decode_value(&output.value, &output.ty, name)
            .map_err(|e| MarshalError::Snapshot(format!("output {:?}: {}", name, e)))?;
        state.set_output(
            name,
            OutputValue {
                value,
                ty: output.ty.clone(),
                sensitive: output.sensitive,
                deprecated: output.deprecated.clone().filter(|d| !d.is_empty()),
            },
        );
    }

    Ok(state)
}

/// Parse a schema table from raw JSON bytes
pub fn parse_schemas(bytes: &[u8]) -> Result<SchemaTable, MarshalError> {
    serde_json::from_slice(bytes).map_err(|e| MarshalError::Snapshot(e.to_string()))
}

/// Read and parse a state snapshot file
pub fn load_state(path: &Path) -> Result<State, MarshalError> {
    parse_state(&read_file(path)?)
}

/// Read and parse a schema table file
pub fn load_schemas(path: &Path) -> Result<SchemaTable, MarshalError> {
    parse_schemas(&read_file(path)?)
}

fn read_file(path: &Path) -> Result<Vec<u8>, MarshalError> {
    std::fs::read(path).map_err(|e| {
        MarshalError::Snapshot(format!("failed to read {}: {}", path.display(), e))
    })
}

fn instance_key(index: Option<&serde_json::Value>) -> Result<InstanceKey, MarshalError> {
    match index {
        None | Some(serde_json::Value::Null) => Ok(InstanceKey::NoKey),
        Some(serde_json::Value::Number(n)) => n.as_i64().map(InstanceKey::Int).ok_or_else(|| {
            MarshalError::Snapshot(format!("instance key {} is not an integer", n))
        }),
        Some(serde_json::Value::String(s)) => Ok(InstanceKey::Str(s.clone())),
        Some(other) => Err(MarshalError::Snapshot(format!(
            "instance key must be an integer or string, found {}",
            other
        ))),
    }
}
