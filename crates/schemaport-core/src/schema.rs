//! Canonical schema types
//!
//! Maps format-specific types to a common representation. Every importer
//! produces a `CanonicalSchema`; it is immutable once returned.

use serde::{Deserialize, Serialize};

/// Portable logical type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogicalType {
    /// Boolean type
    Bool,

    /// Integer type (any precision)
    Int,

    /// Floating point (any precision)
    Float,

    /// Decimal with precision and scale
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },

    /// String/text type
    String,

    /// Raw byte sequence
    Bytes,

    /// Date (no time component)
    Date,

    /// Timestamp (with time component)
    Timestamp,

    /// JSON/Variant type
    Json,

    /// Structured type; the shape lives in the field's children
    Struct,

    /// Array type
    Array { element_type: Box<LogicalType> },

    /// Unknown type (cannot infer)
    Unknown,
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            Self::String => write!(f, "STRING"),
            Self::Bytes => write!(f, "BYTES"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Json => write!(f, "JSON"),
            Self::Struct => write!(f, "STRUCT"),
            Self::Array { element_type } => write!(f, "ARRAY<{}>", element_type),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Nullability state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nullability {
    /// Definitely nullable
    Yes,

    /// Definitely not nullable
    No,

    /// Cannot determine nullability
    Unknown,
}

/// A field descriptor in a canonical schema
///
/// Nested shapes (structs, arrays of structs) are represented through
/// `children`; leaf fields have an empty children list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,

    /// Logical type
    pub logical_type: LogicalType,

    /// Nullability
    pub nullable: Nullability,

    /// Nested fields (populated for Struct and Array-of-Struct types)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
}

impl Field {
    /// Create a new leaf field with unknown nullability
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable: Nullability::Unknown,
            children: Vec::new(),
        }
    }

    /// Set nullability
    pub fn with_nullability(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set nested fields
    pub fn with_children(mut self, children: Vec<Field>) -> Self {
        self.children = children;
        self
    }
}

/// The unified, format-independent representation of a dataset's structure
///
/// Field order is the order of the source document (header order for CSV,
/// declaration order for schema files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSchema {
    /// Where the schema came from (path component of the locator)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Ordered list of fields
    pub fields: Vec<Field>,
}

impl CanonicalSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self {
            source: None,
            fields: Vec::new(),
        }
    }

    /// Create a schema from fields
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            source: None,
            fields,
        }
    }

    /// Set the source path
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Find a top-level field by name
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get top-level field names in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether the schema carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self::new()
    }
}
