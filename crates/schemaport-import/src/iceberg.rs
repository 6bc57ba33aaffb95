//! Iceberg schema JSON import
//!
//! Parses an Iceberg schema document: a top-level struct with `fields`
//! entries carrying `name`, `required`, and a primitive or nested `type`.
//! Field ids are ignored; only names, types and requiredness survive.

use crate::format::SourceFormat;
use crate::importer::{json_error, ImportError, SchemaImporter};
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};
use serde_json::Value;

/// Importer for Iceberg schema files
pub struct IcebergImporter;

impl IcebergImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IcebergImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for IcebergImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Iceberg
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|e| json_error(SourceFormat::Iceberg, e))?;

        if root.get("type").and_then(Value::as_str) != Some("struct") {
            return Err(ImportError::parse(
                SourceFormat::Iceberg,
                "top-level schema must be a struct",
            ));
        }

        let fields = struct_fields(&root)?;
        if fields.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::Iceberg,
            });
        }

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

fn struct_fields(node: &Value) -> Result<Vec<Field>, ImportError> {
    node.get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| ImportError::parse(SourceFormat::Iceberg, "struct has no 'fields' array"))?
        .iter()
        .map(convert_field)
        .collect()
}

fn convert_field(field: &Value) -> Result<Field, ImportError> {
    let name = field
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ImportError::parse(SourceFormat::Iceberg, "field without a name"))?;

    let required = field
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let nullable = if required {
        Nullability::No
    } else {
        Nullability::Yes
    };

    let type_node = field.get("type").ok_or_else(|| {
        ImportError::parse(SourceFormat::Iceberg, format!("field '{}' has no type", name))
    })?;

    let (logical_type, children) = convert_type(type_node, name)?;

    Ok(Field::new(name, logical_type)
        .with_nullability(nullable)
        .with_children(children))
}

/// Resolve an Iceberg type node into (type, children)
fn convert_type(
    node: &Value,
    field_name: &str,
) -> Result<(LogicalType, Vec<Field>), ImportError> {
    match node {
        Value::String(name) => Ok((primitive_type(name), Vec::new())),

        Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
            Some("struct") => {
                let children = struct_fields(node)?;
                Ok((LogicalType::Struct, children))
            }
            Some("list") => {
                let element = obj.get("element").ok_or_else(|| {
                    ImportError::parse(
                        SourceFormat::Iceberg,
                        format!("list in field '{}' has no element", field_name),
                    )
                })?;
                let (element_type, children) = convert_type(element, field_name)?;
                Ok((
                    LogicalType::Array {
                        element_type: Box::new(element_type),
                    },
                    children,
                ))
            }
            // Map values carry arbitrary shapes; surface them as JSON
            Some("map") => Ok((LogicalType::Json, Vec::new())),
            _ => Err(ImportError::parse(
                SourceFormat::Iceberg,
                format!("field '{}' has an unrecognized type object", field_name),
            )),
        },

        _ => Err(ImportError::parse(
            SourceFormat::Iceberg,
            format!("field '{}' has an unrecognized type node", field_name),
        )),
    }
}

fn primitive_type(name: &str) -> LogicalType {
    // decimal(p, s) and fixed[n] carry arguments in the name
    if let Some(args) = name.strip_prefix("decimal(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<Option<u16>> = args
            .split(',')
            .map(|p| p.trim().parse::<u16>().ok())
            .collect();
        return LogicalType::Decimal {
            precision: parts.first().copied().flatten(),
            scale: parts.get(1).copied().flatten(),
        };
    }
    if name.starts_with("fixed[") {
        return LogicalType::Bytes;
    }

    match name {
        "boolean" => LogicalType::Bool,
        "int" | "long" => LogicalType::Int,
        "float" | "double" => LogicalType::Float,
        "string" | "uuid" => LogicalType::String,
        "binary" => LogicalType::Bytes,
        "date" => LogicalType::Date,
        "timestamp" | "timestamptz" => LogicalType::Timestamp,
        _ => LogicalType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE_SCHEMA: &str = r#"{
        "type": "struct",
        "schema-id": 0,
        "fields": [
            {"id": 1, "name": "id", "required": true, "type": "long"},
            {"id": 2, "name": "data", "required": false, "type": "string"},
            {"id": 3, "name": "price", "required": false, "type": "decimal(9, 2)"},
            {"id": 4, "name": "created", "required": true, "type": "timestamptz"},
            {"id": 5, "name": "tags", "required": false, "type": {
                "type": "list", "element-id": 6, "element": "string", "element-required": true
            }},
            {"id": 7, "name": "location", "required": false, "type": {
                "type": "struct",
                "fields": [
                    {"id": 8, "name": "lat", "required": true, "type": "double"},
                    {"id": 9, "name": "lon", "required": true, "type": "double"}
                ]
            }}
        ]
    }"#;

    #[test]
    fn simple_schema() {
        let schema = IcebergImporter::new()
            .import(SIMPLE_SCHEMA.as_bytes(), "simple_schema.json")
            .unwrap();

        assert_eq!(
            schema.field_names(),
            vec!["id", "data", "price", "created", "tags", "location"]
        );

        let id = schema.find_field("id").unwrap();
        assert_eq!(id.logical_type, LogicalType::Int);
        assert_eq!(id.nullable, Nullability::No);

        assert_eq!(schema.find_field("data").unwrap().nullable, Nullability::Yes);
        assert_eq!(
            schema.find_field("price").unwrap().logical_type,
            LogicalType::Decimal {
                precision: Some(9),
                scale: Some(2)
            }
        );
        assert_eq!(
            schema.find_field("created").unwrap().logical_type,
            LogicalType::Timestamp
        );
        assert_eq!(
            schema.find_field("tags").unwrap().logical_type,
            LogicalType::Array {
                element_type: Box::new(LogicalType::String)
            }
        );

        let location = schema.find_field("location").unwrap();
        assert_eq!(location.logical_type, LogicalType::Struct);
        assert_eq!(location.children.len(), 2);
        assert_eq!(location.children[0].name, "lat");
    }

    #[test]
    fn non_struct_root_is_rejected() {
        let err = IcebergImporter::new()
            .import(br#"{"type": "list", "element": "string"}"#, "x.json")
            .unwrap_err();
        assert!(err.to_string().contains("struct"));
    }

    #[test]
    fn malformed_json_reports_line() {
        let err = IcebergImporter::new()
            .import(b"{\n  \"type\": \"struct\",\n  \"fields\": [!]\n}", "x.json")
            .unwrap_err();
        match err {
            ImportError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
