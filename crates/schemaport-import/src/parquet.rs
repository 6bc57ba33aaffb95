//! Parquet schema extraction
//!
//! Reads only the file footer metadata; row data is never decoded. Physical
//! and logical types are mapped onto the canonical type system, repetition
//! onto nullability, and group types onto Struct/Array fields.

use crate::format::SourceFormat;
use crate::importer::{ImportError, SchemaImporter};
use bytes::Bytes;
use parquet::basic::{ConvertedType, LogicalType as ParquetLogicalType, Repetition};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::schema::types::Type;
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};

/// Importer for Apache Parquet files
pub struct ParquetImporter;

impl ParquetImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParquetImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for ParquetImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Parquet
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let reader = SerializedFileReader::new(Bytes::copy_from_slice(bytes))
            .map_err(|e| ImportError::parse(SourceFormat::Parquet, e.to_string()))?;

        let root = reader.metadata().file_metadata().schema();

        let fields = root
            .get_fields()
            .iter()
            .map(|field| convert_field(field.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if fields.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::Parquet,
            });
        }

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

/// Convert one parquet schema node into a canonical field
fn convert_field(node: &Type) -> Result<Field, ImportError> {
    let info = node.get_basic_info();
    let name = info.name().to_string();

    let nullable = match info.repetition() {
        Repetition::OPTIONAL => Nullability::Yes,
        Repetition::REQUIRED => Nullability::No,
        Repetition::REPEATED => Nullability::No,
    };

    match node {
        Type::PrimitiveType { .. } => {
            let logical_type = map_primitive(node);
            // A repeated primitive is an array of that primitive
            if info.repetition() == Repetition::REPEATED {
                return Ok(Field::new(
                    name,
                    LogicalType::Array {
                        element_type: Box::new(logical_type),
                    },
                )
                .with_nullability(Nullability::No));
            }
            Ok(Field::new(name, logical_type).with_nullability(nullable))
        }
        Type::GroupType { .. } => {
            if is_list(node) {
                return convert_list(node, name, nullable);
            }

            let children = node
                .get_fields()
                .iter()
                .map(|child| convert_field(child.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Field::new(name, LogicalType::Struct)
                .with_nullability(nullable)
                .with_children(children))
        }
    }
}

fn is_list(node: &Type) -> bool {
    let info = node.get_basic_info();
    matches!(info.logical_type(), Some(ParquetLogicalType::List))
        || info.converted_type() == ConvertedType::LIST
}

/// Unwrap the three-level LIST encoding down to its element
fn convert_list(node: &Type, name: String, nullable: Nullability) -> Result<Field, ImportError> {
    // LIST group -> repeated "list" group -> element
    let repeated = node.get_fields().first().ok_or_else(|| {
        ImportError::parse(
            SourceFormat::Parquet,
            format!("LIST group '{}' has no repeated child", name),
        )
    })?;

    let element: &Type = if repeated.is_group() && repeated.get_fields().len() == 1 {
        repeated.get_fields()[0].as_ref()
    } else {
        repeated.as_ref()
    };

    let element_field = convert_field(element)?;
    let (element_type, children) = match element_field.logical_type {
        LogicalType::Struct => (LogicalType::Struct, element_field.children),
        other => (other, Vec::new()),
    };

    Ok(Field::new(
        name,
        LogicalType::Array {
            element_type: Box::new(element_type),
        },
    )
    .with_nullability(nullable)
    .with_children(children))
}

/// Map a primitive parquet node via its logical/converted annotation
fn map_primitive(node: &Type) -> LogicalType {
    use parquet::basic::Type as PhysicalType;

    let info = node.get_basic_info();

    if let Some(logical) = info.logical_type() {
        match logical {
            ParquetLogicalType::String | ParquetLogicalType::Enum => return LogicalType::String,
            ParquetLogicalType::Date => return LogicalType::Date,
            ParquetLogicalType::Timestamp { .. } => return LogicalType::Timestamp,
            ParquetLogicalType::Decimal { precision, scale } => {
                return LogicalType::Decimal {
                    precision: u16::try_from(precision).ok(),
                    scale: u16::try_from(scale).ok(),
                }
            }
            ParquetLogicalType::Integer { .. } => return LogicalType::Int,
            ParquetLogicalType::Json => return LogicalType::Json,
            _ => {}
        }
    }

    match info.converted_type() {
        ConvertedType::UTF8 => return LogicalType::String,
        ConvertedType::DATE => return LogicalType::Date,
        ConvertedType::TIMESTAMP_MILLIS | ConvertedType::TIMESTAMP_MICROS => {
            return LogicalType::Timestamp
        }
        ConvertedType::DECIMAL => {
            // Precision and scale live on the primitive node itself
            if let Type::PrimitiveType {
                precision, scale, ..
            } = node
            {
                return LogicalType::Decimal {
                    precision: u16::try_from(*precision).ok(),
                    scale: u16::try_from(*scale).ok(),
                };
            }
            return LogicalType::Decimal {
                precision: None,
                scale: None,
            };
        }
        _ => {}
    }

    match node.get_physical_type() {
        PhysicalType::BOOLEAN => LogicalType::Bool,
        PhysicalType::INT32 | PhysicalType::INT64 => LogicalType::Int,
        PhysicalType::INT96 => LogicalType::Timestamp,
        PhysicalType::FLOAT | PhysicalType::DOUBLE => LogicalType::Float,
        PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => LogicalType::Bytes,
    }
}
