//! JSON Schema import
//!
//! Walks a JSON Schema document's `properties`, using the `required` list
//! and `["null", T]` type unions for nullability and `format` annotations
//! for temporal types. Nested objects become Struct fields, `items` become
//! array element types.

use crate::format::SourceFormat;
use crate::importer::{json_error, ImportError, SchemaImporter};
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};
use serde_json::Value;

/// Importer for JSON Schema documents
pub struct JsonSchemaImporter;

impl JsonSchemaImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonSchemaImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for JsonSchemaImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::JsonSchema
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|e| json_error(SourceFormat::JsonSchema, e))?;

        let fields = object_fields(&root)?;
        if fields.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::JsonSchema,
            });
        }

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

/// Extract the fields of an object schema node
fn object_fields(node: &Value) -> Result<Vec<Field>, ImportError> {
    let properties = node
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ImportError::parse(SourceFormat::JsonSchema, "schema has no 'properties' object")
        })?;

    let required: Vec<&str> = node
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, prop)| convert_property(name, prop, required.contains(&name.as_str())))
        .collect()
}

fn convert_property(name: &str, prop: &Value, required: bool) -> Result<Field, ImportError> {
    let (type_name, type_allows_null) = declared_type(prop);

    let nullable = if type_allows_null || !required {
        Nullability::Yes
    } else {
        Nullability::No
    };

    let (logical_type, children) = match type_name.as_deref() {
        Some("object") => (LogicalType::Struct, nested_fields(prop)?),
        Some("array") => {
            let items = prop.get("items");
            match items {
                Some(items) => {
                    let (item_type, _) = declared_type(items);
                    match item_type.as_deref() {
                        Some("object") => (
                            LogicalType::Array {
                                element_type: Box::new(LogicalType::Struct),
                            },
                            nested_fields(items)?,
                        ),
                        other => (
                            LogicalType::Array {
                                element_type: Box::new(scalar_type(other, items)),
                            },
                            Vec::new(),
                        ),
                    }
                }
                None => (
                    LogicalType::Array {
                        element_type: Box::new(LogicalType::Unknown),
                    },
                    Vec::new(),
                ),
            }
        }
        other => (scalar_type(other, prop), Vec::new()),
    };

    Ok(Field::new(name, logical_type)
        .with_nullability(nullable)
        .with_children(children))
}

/// Fields of a nested object schema
///
/// Unlike the root, a nested object is allowed to omit `properties` (an
/// open-shape object); it then contributes no children.
fn nested_fields(node: &Value) -> Result<Vec<Field>, ImportError> {
    if node.get("properties").is_none() {
        return Ok(Vec::new());
    }
    object_fields(node)
}

/// Resolve the declared type, flattening `["null", T]` unions
fn declared_type(node: &Value) -> (Option<String>, bool) {
    match node.get("type") {
        Some(Value::String(name)) => (Some(name.clone()), name == "null"),
        Some(Value::Array(names)) => {
            let allows_null = names.iter().any(|n| n.as_str() == Some("null"));
            let first = names
                .iter()
                .filter_map(Value::as_str)
                .find(|n| *n != "null")
                .map(|n| n.to_string());
            (first, allows_null)
        }
        _ => (None, false),
    }
}

/// Map a scalar type name, honoring `format` annotations on strings
fn scalar_type(type_name: Option<&str>, node: &Value) -> LogicalType {
    match type_name {
        Some("string") => match node.get("format").and_then(Value::as_str) {
            Some("date") => LogicalType::Date,
            Some("date-time") => LogicalType::Timestamp,
            _ => LogicalType::String,
        },
        Some("integer") => LogicalType::Int,
        Some("number") => LogicalType::Float,
        Some("boolean") => LogicalType::Bool,
        _ => LogicalType::Unknown,
    }
}
