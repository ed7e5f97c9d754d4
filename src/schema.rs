//! Provider Schemas
//!
//! Declared attribute shapes for resource types, and the registry seam
//! through which the marshaler looks them up. The registry is always
//! passed in explicitly; tests and the snapshot CLI use the in-memory
//! [`SchemaTable`], real integrations supply their own implementation.

use crate::addrs::{ProviderAddr, ResourceMode};
use crate::value::Type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type and flags of one resource attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
}

impl AttributeSchema {
    pub fn required(ty: Type) -> Self {
        Self {
            ty,
            required: true,
            optional: false,
            computed: false,
            sensitive: false,
        }
    }

    pub fn optional(ty: Type) -> Self {
        Self {
            ty,
            required: false,
            optional: true,
            computed: false,
            sensitive: false,
        }
    }

    pub fn optional_computed(ty: Type) -> Self {
        Self {
            computed: true,
            ..Self::optional(ty)
        }
    }

    /// This attribute, flagged statically sensitive
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// The declared attribute set of one resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    #[serde(default)]
    pub version: u64,
    pub attributes: BTreeMap<String, AttributeSchema>,
}

impl ResourceSchema {
    pub fn new<I: IntoIterator<Item = (String, AttributeSchema)>>(attributes: I) -> Self {
        Self {
            version: 0,
            attributes: attributes.into_iter().collect(),
        }
    }
}

/// Lookup of resource schemas by provider identity, resource type, and mode
///
/// Supplied externally; absence of a schema is reported by the caller as
/// an error, never a panic.
pub trait SchemaRegistry {
    fn lookup(
        &self,
        provider: &ProviderAddr,
        resource_type: &str,
        mode: ResourceMode,
    ) -> Option<&ResourceSchema>;
}

/// Schemas published by one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchemas {
    #[serde(default)]
    pub resource_types: BTreeMap<String, ResourceSchema>,
    #[serde(default)]
    pub data_sources: BTreeMap<String, ResourceSchema>,
}

/// In-memory [`SchemaRegistry`], keyed by canonical provider address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTable {
    providers: BTreeMap<String, ProviderSchemas>,
}

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        provider: &ProviderAddr,
        mode: ResourceMode,
        resource_type: &str,
        schema: ResourceSchema,
    ) {
        let provider_schemas = self.providers.entry(provider.to_string()).or_default();
        let table = match mode {
            ResourceMode::Managed => &mut provider_schemas.resource_types,
            ResourceMode::Data => &mut provider_schemas.data_sources,
        };
        table.insert(resource_type.to_string(), schema);
    }
}

impl SchemaRegistry for SchemaTable {
    fn lookup(
        &self,
        provider: &ProviderAddr,
        resource_type: &str,
        mode: ResourceMode,
    ) -> Option<&ResourceSchema> {
        let provider_schemas = self.providers.get(&provider.to_string())?;
        let table = match mode {
            ResourceMode::Managed => &provider_schemas.resource_types,
            ResourceMode::Data => &provider_schemas.data_sources,
        };
        table.get(resource_type)
    }
}
