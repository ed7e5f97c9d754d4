//! Error types for the state projection engine.

use thiserror::Error;

/// Errors decoding stored raw attribute bytes against a resource schema
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed attribute payload: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("attribute {attribute:?}: declared {expected}, found {found}")]
    SchemaMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("attribute payload must be a JSON object, found {found}")]
    NotAnObject { found: String },
}

/// Errors resolving an externally supplied sensitivity path against a value
#[derive(Debug, Error)]
pub enum PathError {
    #[error("sensitivity path {path} cannot be resolved: {reason}")]
    Malformed { path: String, reason: String },
}

/// Errors encoding a value as plaintext JSON
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot serialize unknown value")]
    UnknownValue,
}

/// Errors loading configuration or initializing logging
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Errors parsing rendered address strings
#[derive(Debug, Error)]
pub enum AddrError {
    #[error("invalid module address {addr:?}: {reason}")]
    InvalidModuleAddress { addr: String, reason: String },

    #[error("invalid provider address {addr:?}: expected <registry-host>/<namespace>/<type>")]
    InvalidProviderAddress { addr: String },

    #[error("invalid deposed key {key:?}: expected eight lowercase hex digits")]
    InvalidDeposedKey { key: String },
}

/// Errors producing attribute values and their sensitivity mask
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors marshaling state into the output document
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("no schema available for {address} (provider {provider})")]
    SchemaNotFound { address: String, provider: String },

    #[error("failed to decode attributes for {address}: {source}")]
    Decode {
        address: String,
        #[source]
        source: DecodeError,
    },

    #[error("failed to marshal attributes for {address}: {source}")]
    Attributes {
        address: String,
        #[source]
        source: AttributeError,
    },

    #[error("failed to marshal output {name:?}: {source}")]
    Output {
        name: String,
        #[source]
        source: EncodeError,
    },

    #[error("invalid state snapshot: {0}")]
    Snapshot(String),
}
