//! ODCS (Open Data Contract Standard) v3 import
//!
//! Parses an ODCS YAML document and recovers the declared schema objects.
//! Each entry in the top-level `schema` list becomes one Struct field with
//! the object's properties as children; nested object/array properties
//! recurse the same way.

use crate::format::SourceFormat;
use crate::importer::{ImportError, SchemaImporter};
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};
use serde::Deserialize;

/// ODCS document (subset of fields we care about)
#[derive(Debug, Deserialize)]
struct Document {
    /// Document kind; must be "DataContract"
    #[serde(default)]
    kind: Option<String>,

    /// Schema objects (tables, views, etc.)
    #[serde(default)]
    schema: Vec<SchemaObject>,
}

/// One schema object in the contract
#[derive(Debug, Deserialize)]
struct SchemaObject {
    name: String,

    #[serde(default)]
    properties: Vec<Property>,
}

/// One property of a schema object
#[derive(Debug, Deserialize)]
struct Property {
    /// Absent for array `items` entries, which are anonymous in ODCS v3
    #[serde(default)]
    name: String,

    /// ODCS logical type (string, date, number, integer, boolean, object, array)
    #[serde(rename = "logicalType", default)]
    logical_type: Option<String>,

    #[serde(default)]
    required: bool,

    /// Decimal precision, when the logical type options carry one
    #[serde(rename = "logicalTypeOptions", default)]
    type_options: Option<TypeOptions>,

    /// Nested properties for object-typed entries
    #[serde(default)]
    properties: Vec<Property>,

    /// Element description for array-typed entries
    #[serde(default)]
    items: Option<Box<Property>>,
}

#[derive(Debug, Deserialize)]
struct TypeOptions {
    #[serde(default)]
    precision: Option<u16>,

    #[serde(default)]
    scale: Option<u16>,
}

/// Importer for ODCS data contract documents
pub struct OdcsImporter;

impl OdcsImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OdcsImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for OdcsImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Odcs
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let doc: Document = serde_yaml::from_slice(bytes).map_err(|e| match e.location() {
            Some(loc) => ImportError::parse_at(SourceFormat::Odcs, loc.line(), e.to_string()),
            None => ImportError::parse(SourceFormat::Odcs, e.to_string()),
        })?;

        if let Some(kind) = doc.kind.as_deref() {
            if kind != "DataContract" {
                return Err(ImportError::parse(
                    SourceFormat::Odcs,
                    format!("unexpected document kind '{}'", kind),
                ));
            }
        }

        if doc.schema.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::Odcs,
            });
        }

        let fields = doc
            .schema
            .iter()
            .map(|object| {
                let children = object.properties.iter().map(convert_property).collect();
                Field::new(&object.name, LogicalType::Struct)
                    .with_nullability(Nullability::No)
                    .with_children(children)
            })
            .collect();

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

fn convert_property(prop: &Property) -> Field {
    let nullable = if prop.required {
        Nullability::No
    } else {
        Nullability::Yes
    };

    let (logical_type, children) = match prop.logical_type.as_deref() {
        Some("object") => (
            LogicalType::Struct,
            prop.properties.iter().map(convert_property).collect(),
        ),
        Some("array") => {
            let element = prop.items.as_deref();
            let element_type = element
                .map(|item| scalar_type(item.logical_type.as_deref(), item.type_options.as_ref()))
                .unwrap_or(LogicalType::Unknown);
            let children = element
                .filter(|item| item.logical_type.as_deref() == Some("object"))
                .map(|item| item.properties.iter().map(convert_property).collect())
                .unwrap_or_default();
            (
                LogicalType::Array {
                    element_type: Box::new(element_type),
                },
                children,
            )
        }
        other => (scalar_type(other, prop.type_options.as_ref()), Vec::new()),
    };

    Field::new(&prop.name, logical_type)
        .with_nullability(nullable)
        .with_children(children)
}

/// Map an ODCS logical type onto the canonical type system
fn scalar_type(name: Option<&str>, options: Option<&TypeOptions>) -> LogicalType {
    match name {
        Some("string") => LogicalType::String,
        Some("integer") => LogicalType::Int,
        Some("boolean") => LogicalType::Bool,
        Some("date") => LogicalType::Date,
        Some("timestamp") => LogicalType::Timestamp,
        Some("bytes") | Some("binary") => LogicalType::Bytes,
        Some("object") => LogicalType::Struct,
        Some("number") => match options {
            // A number with declared precision/scale is a decimal
            Some(opts) if opts.precision.is_some() || opts.scale.is_some() => {
                LogicalType::Decimal {
                    precision: opts.precision,
                    scale: opts.scale,
                }
            }
            _ => LogicalType::Float,
        },
        _ => LogicalType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTRACT: &str = r#"
apiVersion: v3.0.0
kind: DataContract
id: 53581432-6c55-4ba2-a65f-72344a91553a
status: active
schema:
  - name: tbl_transactions
    logicalType: object
    physicalType: table
    properties:
      - name: txn_ref_dt
        logicalType: date
        physicalType: date
        required: true
      - name: rcvr_id
        logicalType: string
        physicalType: varchar(18)
        required: true
      - name: amount
        logicalType: number
        logicalTypeOptions:
          precision: 18
          scale: 2
      - name: details
        logicalType: object
        properties:
          - name: memo
            logicalType: string
  - name: tbl_parties
    logicalType: object
    properties:
      - name: party_id
        logicalType: integer
        required: true
      - name: emails
        logicalType: array
        items:
          logicalType: string
"#;

    #[test]
    fn schema_objects_become_struct_fields() {
        let schema = OdcsImporter::new()
            .import(CONTRACT.as_bytes(), "contract.odcs.yaml")
            .unwrap();

        assert_eq!(schema.field_names(), vec!["tbl_transactions", "tbl_parties"]);

        let txns = schema.find_field("tbl_transactions").unwrap();
        assert_eq!(txns.logical_type, LogicalType::Struct);
        assert_eq!(txns.children.len(), 4);
        assert_eq!(txns.children[0].logical_type, LogicalType::Date);
        assert_eq!(txns.children[0].nullable, Nullability::No);
        assert_eq!(txns.children[1].logical_type, LogicalType::String);
        assert_eq!(
            txns.children[2].logical_type,
            LogicalType::Decimal {
                precision: Some(18),
                scale: Some(2)
            }
        );
        assert_eq!(txns.children[2].nullable, Nullability::Yes);

        let details = &txns.children[3];
        assert_eq!(details.logical_type, LogicalType::Struct);
        assert_eq!(details.children[0].name, "memo");

        let parties = schema.find_field("tbl_parties").unwrap();
        assert_eq!(
            parties.children[1].logical_type,
            LogicalType::Array {
                element_type: Box::new(LogicalType::String)
            }
        );
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let doc = "kind: DataProduct\nschema:\n  - name: t\n";
        let err = OdcsImporter::new().import(doc.as_bytes(), "x.yaml").unwrap_err();
        assert!(err.to_string().contains("DataProduct"));
    }

    #[test]
    fn contract_without_schema_is_empty() {
        let err = OdcsImporter::new()
            .import(b"kind: DataContract\nid: abc\n", "x.yaml")
            .unwrap_err();
        assert!(matches!(err, ImportError::Empty { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = OdcsImporter::new()
            .import(b"kind: DataContract\nschema: [}\n", "x.yaml")
            .unwrap_err();
        assert!(matches!(err, ImportError::Parse { .. }));
    }
}
