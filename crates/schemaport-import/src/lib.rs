//! Format importers for schema extraction
//!
//! This crate turns the raw bytes of a schema-bearing file into a
//! [`CanonicalSchema`](schemaport_core::CanonicalSchema). Each supported
//! format has one importer; the format tag is supplied by the caller and
//! resolved through [`importer_for`], never auto-detected.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaport_import::{importer_for, SourceFormat};
//!
//! let importer = importer_for(SourceFormat::Csv);
//! let schema = importer.import(bytes, "/sftp/data/sample_data.csv")?;
//! ```

pub mod avro;
pub mod csv;
pub mod dbml;
pub mod dbt;
pub mod format;
pub mod iceberg;
pub mod importer;
pub mod jsonschema;
pub mod odcs;
pub mod parquet;

pub use format::{importer_for, SourceFormat};
pub use importer::{ImportError, SchemaImporter};
