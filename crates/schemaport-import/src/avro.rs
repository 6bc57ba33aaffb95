//! Avro schema (.avsc) import
//!
//! An .avsc file is a JSON document describing a record schema. Unions with
//! "null" map to nullable fields, nested records to Struct fields, and Avro
//! logical types (date, timestamp-millis/micros, decimal, uuid) onto the
//! canonical type system.

use crate::format::SourceFormat;
use crate::importer::{json_error, ImportError, SchemaImporter};
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};
use serde_json::Value;

/// Importer for Avro schema files
pub struct AvroImporter;

impl AvroImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AvroImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for AvroImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Avro
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|e| json_error(SourceFormat::Avro, e))?;

        let fields = record_fields(&root)?;
        if fields.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::Avro,
            });
        }

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

/// Extract the fields of a record schema node
fn record_fields(node: &Value) -> Result<Vec<Field>, ImportError> {
    if node.get("type").and_then(Value::as_str) != Some("record") {
        return Err(ImportError::parse(
            SourceFormat::Avro,
            "top-level schema must be a record",
        ));
    }

    let fields = node
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| ImportError::parse(SourceFormat::Avro, "record has no 'fields' array"))?;

    fields.iter().map(convert_field).collect()
}

/// Convert one record field declaration
fn convert_field(field: &Value) -> Result<Field, ImportError> {
    let name = field
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ImportError::parse(SourceFormat::Avro, "field without a name"))?;

    let field_type = field
        .get("type")
        .ok_or_else(|| ImportError::parse(SourceFormat::Avro, format!("field '{}' has no type", name)))?;

    let (logical_type, nullable, children) = convert_type(field_type, name)?;

    Ok(Field::new(name, logical_type)
        .with_nullability(nullable)
        .with_children(children))
}

/// Resolve an Avro type node into (type, nullability, children)
fn convert_type(
    node: &Value,
    field_name: &str,
) -> Result<(LogicalType, Nullability, Vec<Field>), ImportError> {
    match node {
        Value::String(name) => Ok((primitive_type(name), Nullability::No, Vec::new())),

        // Union: nullable when "null" is a branch; the schema of the first
        // non-null branch wins.
        Value::Array(branches) => {
            let has_null = branches
                .iter()
                .any(|b| b.as_str() == Some("null"));
            let branch = branches
                .iter()
                .find(|b| b.as_str() != Some("null"))
                .ok_or_else(|| {
                    ImportError::parse(
                        SourceFormat::Avro,
                        format!("field '{}' union has only null branches", field_name),
                    )
                })?;

            let (logical_type, _, children) = convert_type(branch, field_name)?;
            let nullable = if has_null {
                Nullability::Yes
            } else {
                Nullability::No
            };
            Ok((logical_type, nullable, children))
        }

        Value::Object(obj) => {
            // Logical types override the underlying primitive
            if let Some(logical) = obj.get("logicalType").and_then(Value::as_str) {
                let mapped = match logical {
                    "date" => Some(LogicalType::Date),
                    "timestamp-millis" | "timestamp-micros" | "local-timestamp-millis"
                    | "local-timestamp-micros" => Some(LogicalType::Timestamp),
                    "decimal" => Some(LogicalType::Decimal {
                        precision: obj.get("precision").and_then(Value::as_u64).map(|p| p as u16),
                        scale: obj.get("scale").and_then(Value::as_u64).map(|s| s as u16),
                    }),
                    "uuid" => Some(LogicalType::String),
                    _ => None,
                };
                if let Some(logical_type) = mapped {
                    return Ok((logical_type, Nullability::No, Vec::new()));
                }
            }

            match obj.get("type").and_then(Value::as_str) {
                Some("record") => {
                    let children = node
                        .get("fields")
                        .and_then(Value::as_array)
                        .ok_or_else(|| {
                            ImportError::parse(
                                SourceFormat::Avro,
                                format!("record in field '{}' has no fields", field_name),
                            )
                        })?
                        .iter()
                        .map(convert_field)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok((LogicalType::Struct, Nullability::No, children))
                }
                Some("array") => {
                    let items = obj.get("items").ok_or_else(|| {
                        ImportError::parse(
                            SourceFormat::Avro,
                            format!("array in field '{}' has no items", field_name),
                        )
                    })?;
                    let (element_type, _, children) = convert_type(items, field_name)?;
                    Ok((
                        LogicalType::Array {
                            element_type: Box::new(element_type),
                        },
                        Nullability::No,
                        children,
                    ))
                }
                Some("enum") => Ok((LogicalType::String, Nullability::No, Vec::new())),
                Some("fixed") => Ok((LogicalType::Bytes, Nullability::No, Vec::new())),
                Some("map") => Ok((LogicalType::Json, Nullability::No, Vec::new())),
                Some(primitive) => Ok((primitive_type(primitive), Nullability::No, Vec::new())),
                None => Err(ImportError::parse(
                    SourceFormat::Avro,
                    format!("field '{}' has a type object without a type", field_name),
                )),
            }
        }

        _ => Err(ImportError::parse(
            SourceFormat::Avro,
            format!("field '{}' has an unrecognized type node", field_name),
        )),
    }
}

fn primitive_type(name: &str) -> LogicalType {
    match name {
        "boolean" => LogicalType::Bool,
        "int" | "long" => LogicalType::Int,
        "float" | "double" => LogicalType::Float,
        "string" => LogicalType::String,
        "bytes" => LogicalType::Bytes,
        _ => LogicalType::Unknown,
    }
}
