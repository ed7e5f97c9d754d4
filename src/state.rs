//! State Snapshot Model
//!
//! Read-only view of persisted resource state, grouped by owning module
//! instance. The marshaler never mutates a snapshot; the mutating helpers
//! here exist to construct snapshots in tests and loaders.

use crate::addrs::{
    DeposedKey, InstanceKey, ModuleInstance, ProviderAddr, ResourceAddr,
};
use crate::value::{PathMark, Type, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Readiness of a stored resource instance object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    /// Fully provisioned and usable
    Ready,
    /// Provisioning was interrupted; the object exists but needs replacement
    Tainted,
}

/// Stored state of one resource instance object
///
/// Attributes are kept as the raw schema-versioned bytes they were
/// persisted with; decoding happens at marshal time, against the schema
/// the registry supplies. `sensitive_paths` records which parts of the
/// decoded value are dynamically sensitive.
#[derive(Debug, Clone)]
pub struct InstanceObject {
    pub schema_version: u64,
    pub attrs_json: Vec<u8>,
    pub sensitive_paths: Vec<PathMark>,
    pub status: ObjectStatus,
}

impl InstanceObject {
    /// A ready object with the given raw attribute payload
    pub fn ready(attrs_json: &[u8]) -> Self {
        Self {
            schema_version: 0,
            attrs_json: attrs_json.to_vec(),
            sensitive_paths: Vec::new(),
            status: ObjectStatus::Ready,
        }
    }

    pub fn with_sensitive_paths(mut self, sensitive_paths: Vec<PathMark>) -> Self {
        self.sensitive_paths = sensitive_paths;
        self
    }
}

/// One resource instance: an optional current object plus any deposed
/// objects retained during replacement
#[derive(Debug, Clone, Default)]
pub struct ResourceInstance {
    pub current: Option<InstanceObject>,
    pub deposed: BTreeMap<DeposedKey, InstanceObject>,
}

/// A resource and its instances within one module
#[derive(Debug, Clone)]
pub struct Resource {
    pub addr: ResourceAddr,
    pub provider: ProviderAddr,
    pub instances: BTreeMap<InstanceKey, ResourceInstance>,
}

/// The resources owned by one module instance
#[derive(Debug, Clone)]
pub struct Module {
    pub addr: ModuleInstance,
    pub resources: BTreeMap<String, Resource>,
}

impl Module {
    pub fn new(addr: ModuleInstance) -> Self {
        Self {
            addr,
            resources: BTreeMap::new(),
        }
    }
}

/// A recorded output of the root module
#[derive(Debug, Clone)]
pub struct OutputValue {
    pub value: Value,
    pub ty: Type,
    pub sensitive: bool,
    pub deprecated: Option<String>,
}

impl OutputValue {
    pub fn new(value: Value, ty: Type) -> Self {
        Self {
            value,
            ty,
            sensitive: false,
            deprecated: None,
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn deprecated(mut self, notice: &str) -> Self {
        self.deprecated = Some(notice.to_string());
        self
    }
}

/// Read-only snapshot of persisted state
#[derive(Debug, Clone, Default)]
pub struct State {
    modules: BTreeMap<String, Module>,
    outputs: BTreeMap<String, OutputValue>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no module owns resources and no outputs are recorded
    pub fn is_empty(&self) -> bool {
        self.modules.values().all(|m| m.resources.is_empty()) && self.outputs.is_empty()
    }

    pub fn module(&self, addr: &ModuleInstance) -> Option<&Module> {
        self.modules.get(&addr.to_string())
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn outputs(&self) -> &BTreeMap<String, OutputValue> {
        &self.outputs
    }

    pub fn set_output(&mut self, name: &str, output: OutputValue) {
        self.outputs.insert(name.to_string(), output);
    }

    fn ensure_module(&mut self, addr: &ModuleInstance) -> &mut Module {
        self.modules
            .entry(addr.to_string())
            .or_insert_with(|| Module::new(addr.clone()))
    }

    fn ensure_instance(
        &mut self,
        module: &ModuleInstance,
        addr: &ResourceAddr,
        provider: &ProviderAddr,
        key: InstanceKey,
    ) -> &mut ResourceInstance {
        let resource = self
            .ensure_module(module)
            .resources
            .entry(addr.to_string())
            .or_insert_with(|| Resource {
                addr: addr.clone(),
                provider: provider.clone(),
                instances: BTreeMap::new(),
            });
        resource.instances.entry(key).or_default()
    }

    /// Record the current object for a resource instance
    pub fn set_resource_instance_current(
        &mut self,
        module: &ModuleInstance,
        addr: &ResourceAddr,
        key: InstanceKey,
        provider: &ProviderAddr,
        object: InstanceObject,
    ) {
        self.ensure_instance(module, addr, provider, key).current = Some(object);
    }

    /// Record a deposed object for a resource instance
    pub fn set_resource_instance_deposed(
        &mut self,
        module: &ModuleInstance,
        addr: &ResourceAddr,
        key: InstanceKey,
        deposed_key: DeposedKey,
        provider: &ProviderAddr,
        object: InstanceObject,
    ) {
        self.ensure_instance(module, addr, provider, key)
            .deposed
            .insert(deposed_key, object);
    }

    /// The parent-to-children module instance relation implied by the
    /// snapshot's module addresses
    ///
    /// Every ancestor of a recorded module appears as a parent, so a
    /// module with no resources of its own still shows up between its
    /// parent and its populated descendants. Children are listed in
    /// rendered-address order.
    pub fn child_modules(&self) -> BTreeMap<String, Vec<ModuleInstance>> {
        let mut children: BTreeMap<String, Vec<ModuleInstance>> = BTreeMap::new();
        for module in self.modules.values() {
            let mut addr = module.addr.clone();
            while let Some(parent) = addr.parent() {
                let entry = children.entry(parent.to_string()).or_default();
                if !entry.contains(&addr) {
                    entry.push(addr.clone());
                }
                addr = parent;
            }
        }
        for siblings in children.values_mut() {
            siblings.sort_by_key(|a| a.to_string());
        }
        children
    }
}
