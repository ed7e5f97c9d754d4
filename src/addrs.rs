//! Resource, module, and provider addressing
//!
//! Address types identify resources and module instances within a state
//! snapshot and render to the canonical string forms used in the output
//! document. Rendering is deterministic; parsing accepts exactly the
//! rendered forms.

use crate::error::AddrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a resource is managed by the tool or merely read from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    Managed,
    Data,
}

impl ResourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceMode::Managed => "managed",
            ResourceMode::Data => "data",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a resource within its owning module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceAddr {
    pub mode: ResourceMode,
    pub type_name: String,
    pub name: String,
}

impl ResourceAddr {
    pub fn managed(type_name: &str, name: &str) -> Self {
        Self {
            mode: ResourceMode::Managed,
            type_name: type_name.to_string(),
            name: name.to_string(),
        }
    }

    pub fn data(type_name: &str, name: &str) -> Self {
        Self {
            mode: ResourceMode::Data,
            type_name: type_name.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ResourceMode::Managed => write!(f, "{}.{}", self.type_name, self.name),
            ResourceMode::Data => write!(f, "data.{}.{}", self.type_name, self.name),
        }
    }
}

/// Key distinguishing repeated instances of a resource or module
///
/// `NoKey` is the single-instance case and renders as the empty suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstanceKey {
    NoKey,
    Int(i64),
    Str(String),
}

impl InstanceKey {
    /// Render as an address suffix: `[0]`, `["key"]`, or nothing
    pub fn suffix(&self) -> String {
        match self {
            InstanceKey::NoKey => String::new(),
            InstanceKey::Int(n) => format!("[{}]", n),
            // JSON string encoding gives the quoting and escaping the
            // address grammar requires.
            InstanceKey::Str(s) => format!("[{}]", serde_json::Value::from(s.as_str())),
        }
    }

    /// The key as a raw JSON fragment, absent for `NoKey`
    pub fn index_json(&self) -> Option<serde_json::Value> {
        match self {
            InstanceKey::NoKey => None,
            InstanceKey::Int(n) => Some(serde_json::Value::from(*n)),
            InstanceKey::Str(s) => Some(serde_json::Value::from(s.as_str())),
        }
    }
}

/// Opaque identifier for a deposed resource instance object
///
/// Eight lowercase hex digits, assigned by the state layer when a
/// create-before-destroy replacement begins.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeposedKey(String);

impl DeposedKey {
    pub fn new(key: &str) -> Result<Self, AddrError> {
        if key.len() == 8 && key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            Ok(Self(key.to_string()))
        } else {
            Err(AddrError::InvalidDeposedKey {
                key: key.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeposedKey {
    type Error = AddrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DeposedKey::new(&value)
    }
}

impl From<DeposedKey> for String {
    fn from(key: DeposedKey) -> String {
        key.0
    }
}

impl fmt::Display for DeposedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step in a module instance address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleStep {
    pub name: String,
    pub key: Option<InstanceKey>,
}

/// Address of one instantiation of a module
///
/// The root module is the empty step sequence and renders as the empty
/// string. Child addresses are strictly longer than their parents, so the
/// parent/child relation cannot cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ModuleInstance {
    steps: Vec<ModuleStep>,
}

impl ModuleInstance {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ModuleStep] {
        &self.steps
    }

    /// The address of a direct child call of this instance
    pub fn child(&self, name: &str, key: Option<InstanceKey>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(ModuleStep {
            name: name.to_string(),
            key,
        });
        Self { steps }
    }

    /// The containing module instance, or `None` for the root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }

    /// Parse a rendered module instance address
    ///
    /// Accepts the empty string for the root and otherwise sequences of
    /// `module.<name>` steps, each optionally keyed: `module.child[0]` or
    /// `module.child["key"]`.
    pub fn parse(addr: &str) -> Result<Self, AddrError> {
        let invalid = |reason: &str| AddrError::InvalidModuleAddress {
            addr: addr.to_string(),
            reason: reason.to_string(),
        };

        let mut steps = Vec::new();
        let mut rest = addr;
        while !rest.is_empty() {
            rest = rest
                .strip_prefix("module.")
                .ok_or_else(|| invalid("expected \"module.\" step prefix"))?;
            let name_end = rest
                .find(|c| c == '.' || c == '[')
                .unwrap_or(rest.len());
            let name = &rest[..name_end];
            if name.is_empty() {
                return Err(invalid("empty module name"));
            }
            rest = &rest[name_end..];

            let mut key = None;
            if let Some(after) = rest.strip_prefix('[') {
                let close = after
                    .find(']')
                    .ok_or_else(|| invalid("unterminated instance key"))?;
                let raw = &after[..close];
                key = Some(if let Some(quoted) = raw.strip_prefix('"') {
                    let inner = quoted
                        .strip_suffix('"')
                        .ok_or_else(|| invalid("unterminated string key"))?;
                    InstanceKey::Str(inner.to_string())
                } else {
                    InstanceKey::Int(
                        raw.parse()
                            .map_err(|_| invalid("instance key is neither integer nor string"))?,
                    )
                });
                rest = &after[close + 1..];
            }

            steps.push(ModuleStep {
                name: name.to_string(),
                key,
            });

            if !rest.is_empty() {
                rest = rest
                    .strip_prefix('.')
                    .ok_or_else(|| invalid("expected \".\" between steps"))?;
                if rest.is_empty() {
                    return Err(invalid("trailing \".\""));
                }
            }
        }
        Ok(Self { steps })
    }
}

impl fmt::Display for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "module.{}", step.name)?;
            if let Some(key) = &step.key {
                f.write_str(&key.suffix())?;
            }
        }
        Ok(())
    }
}

/// Canonical identity of a provider
///
/// Renders as `<registry-host>/<namespace>/<type>`, for example
/// `registry.example.org/vendor/test`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderAddr {
    pub hostname: String,
    pub namespace: String,
    pub type_name: String,
}

impl ProviderAddr {
    pub fn new(hostname: &str, namespace: &str, type_name: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
        }
    }

    /// Parse the canonical `<host>/<namespace>/<type>` form
    pub fn parse(addr: &str) -> Result<Self, AddrError> {
        let parts: Vec<&str> = addr.split('/').collect();
        match parts.as_slice() {
            [host, namespace, type_name]
                if !host.is_empty() && !namespace.is_empty() && !type_name.is_empty() =>
            {
                Ok(Self::new(host, namespace, type_name))
            }
            _ => Err(AddrError::InvalidProviderAddress {
                addr: addr.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ProviderAddr {
    type Error = AddrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ProviderAddr::parse(&value)
    }
}

impl From<ProviderAddr> for String {
    fn from(addr: ProviderAddr) -> String {
        addr.to_string()
    }
}

impl fmt::Display for ProviderAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hostname, self.namespace, self.type_name)
    }
}
