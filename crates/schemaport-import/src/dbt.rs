//! dbt manifest.json import
//!
//! Parses the subset of a dbt-generated manifest.json needed to recover
//! model shapes: model nodes and their declared columns. Each model becomes
//! one Struct field; models and columns are sorted by name because the
//! manifest stores both in maps with no stable order.

use crate::format::SourceFormat;
use crate::importer::{json_error, ImportError, SchemaImporter};
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};
use serde::Deserialize;
use std::collections::HashMap;

/// dbt manifest.json structure (subset of fields we care about)
#[derive(Debug, Deserialize)]
struct Manifest {
    /// Model and test nodes
    #[serde(default)]
    nodes: HashMap<String, ManifestNode>,
}

/// A node in the manifest (model, test, snapshot, etc.)
#[derive(Debug, Deserialize)]
struct ManifestNode {
    /// Node name (e.g., "users")
    name: String,

    /// Resource type (model, test, snapshot, etc.)
    resource_type: String,

    /// Column definitions
    #[serde(default)]
    columns: HashMap<String, ColumnDefinition>,
}

/// Column definition from manifest
#[derive(Debug, Deserialize)]
struct ColumnDefinition {
    /// Column name
    name: String,

    /// Data type (if specified in the model YAML)
    #[serde(default)]
    data_type: Option<String>,
}

/// Importer for dbt manifest.json artifacts
pub struct DbtImporter;

impl DbtImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DbtImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for DbtImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Dbt
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let manifest: Manifest = serde_json::from_slice(bytes)
            .map_err(|e| json_error(SourceFormat::Dbt, e))?;

        let mut models: Vec<&ManifestNode> = manifest
            .nodes
            .values()
            .filter(|node| node.resource_type == "model")
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));

        if models.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::Dbt,
            });
        }

        let fields = models
            .into_iter()
            .map(|model| {
                let mut columns: Vec<&ColumnDefinition> = model.columns.values().collect();
                columns.sort_by(|a, b| a.name.cmp(&b.name));

                let children = columns
                    .into_iter()
                    .map(|col| {
                        let logical_type = col
                            .data_type
                            .as_deref()
                            .map(map_sql_type)
                            .unwrap_or(LogicalType::Unknown);
                        Field::new(&col.name, logical_type).with_nullability(Nullability::Unknown)
                    })
                    .collect();

                Field::new(&model.name, LogicalType::Struct)
                    .with_nullability(Nullability::No)
                    .with_children(children)
            })
            .collect();

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

/// Map a declared SQL data type onto the canonical type system
fn map_sql_type(decl: &str) -> LogicalType {
    let lower = decl.to_lowercase();
    let base = lower.split('(').next().unwrap_or("").trim();

    match base {
        "int" | "integer" | "bigint" | "smallint" | "tinyint" | "int64" => LogicalType::Int,
        "varchar" | "char" | "character varying" | "text" | "string" => LogicalType::String,
        "bool" | "boolean" => LogicalType::Bool,
        "float" | "float64" | "double" | "double precision" | "real" => LogicalType::Float,
        "decimal" | "numeric" => LogicalType::Decimal {
            precision: None,
            scale: None,
        },
        "date" => LogicalType::Date,
        "timestamp" | "timestamptz" | "datetime" | "timestamp_ntz" => LogicalType::Timestamp,
        "json" | "jsonb" | "variant" => LogicalType::Json,
        _ => LogicalType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"{
        "metadata": {"dbt_version": "1.7.0"},
        "nodes": {
            "model.jaffle_shop.customers": {
                "name": "customers",
                "resource_type": "model",
                "columns": {
                    "customer_id": {"name": "customer_id", "data_type": "integer"},
                    "first_name": {"name": "first_name", "data_type": "varchar"},
                    "joined_at": {"name": "joined_at", "data_type": "timestamp"}
                }
            },
            "model.jaffle_shop.orders": {
                "name": "orders",
                "resource_type": "model",
                "columns": {
                    "order_id": {"name": "order_id", "data_type": "integer"},
                    "amount": {"name": "amount", "data_type": "numeric"}
                }
            },
            "test.jaffle_shop.not_null_orders_order_id": {
                "name": "not_null_orders_order_id",
                "resource_type": "test",
                "columns": {}
            }
        }
    }"#;

    #[test]
    fn models_become_struct_fields() {
        let schema = DbtImporter::new()
            .import(MANIFEST.as_bytes(), "manifest.json")
            .unwrap();

        // Sorted by model name; test nodes are filtered out
        assert_eq!(schema.field_names(), vec!["customers", "orders"]);

        let customers = schema.find_field("customers").unwrap();
        assert_eq!(customers.logical_type, LogicalType::Struct);
        assert_eq!(customers.children.len(), 3);
        assert_eq!(customers.children[0].name, "customer_id");
        assert_eq!(customers.children[0].logical_type, LogicalType::Int);
        assert_eq!(customers.children[2].logical_type, LogicalType::Timestamp);
    }

    #[test]
    fn missing_data_type_is_unknown() {
        let manifest = r#"{
            "nodes": {
                "model.p.m": {
                    "name": "m",
                    "resource_type": "model",
                    "columns": {"c": {"name": "c"}}
                }
            }
        }"#;

        let schema = DbtImporter::new().import(manifest.as_bytes(), "manifest.json").unwrap();
        let model = schema.find_field("m").unwrap();
        assert_eq!(model.children[0].logical_type, LogicalType::Unknown);
    }

    #[test]
    fn manifest_without_models_is_empty() {
        let err = DbtImporter::new()
            .import(br#"{"nodes": {}}"#, "manifest.json")
            .unwrap_err();
        assert!(matches!(err, ImportError::Empty { .. }));
    }

    #[test]
    fn malformed_manifest_reports_line() {
        let err = DbtImporter::new()
            .import(b"{\n  \"nodes\": !\n}", "manifest.json")
            .unwrap_err();
        match err {
            ImportError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
