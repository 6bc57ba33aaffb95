//! Schemaport Core
//!
//! Canonical schema model and configuration shared by the fetch and import
//! layers. The canonical schema is the format-independent representation
//! every importer produces.

pub mod config;
pub mod schema;

pub use config::{Config, ConfigError, SftpConfig};
pub use schema::{CanonicalSchema, Field, LogicalType, Nullability};
