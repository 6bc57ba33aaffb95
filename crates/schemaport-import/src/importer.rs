//! Importer trait and error types

use crate::format::SourceFormat;
use schemaport_core::CanonicalSchema;

/// Errors that can occur while importing a schema
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported format '{tag}'. Supported: {supported}")]
    UnsupportedFormat { tag: String, supported: String },

    #[error("{format} parse error{}: {message}", location_suffix(.line))]
    Parse {
        format: SourceFormat,
        /// 1-indexed line (or row) where parsing broke, when known
        line: Option<usize>,
        message: String,
    },

    #[error("{format} document contains no fields")]
    Empty { format: SourceFormat },
}

impl ImportError {
    /// Parse error without location information
    pub fn parse(format: SourceFormat, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line: None,
            message: message.into(),
        }
    }

    /// Parse error anchored at a 1-indexed line
    pub fn parse_at(format: SourceFormat, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line: Some(line),
            message: message.into(),
        }
    }
}

fn location_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

/// Trait for importers that extract a canonical schema from raw bytes
///
/// Importers are pure over their input: no I/O, no shared mutable state.
/// `source` is the originating path, carried into the schema for provenance
/// and error messages.
pub trait SchemaImporter: Send + Sync {
    /// Get the importer's format
    fn format(&self) -> SourceFormat;

    /// Parse the fetched bytes into a canonical schema
    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError>;
}

/// Decode bytes as UTF-8 or fail with a parse error for `format`
pub(crate) fn decode_utf8(bytes: &[u8], format: SourceFormat) -> Result<&str, ImportError> {
    std::str::from_utf8(bytes)
        .map_err(|e| ImportError::parse(format, format!("invalid UTF-8: {}", e)))
}

/// Map a serde_json error, keeping the location only when the parser has one
///
/// serde_json reports line 0 for errors that carry no position.
pub(crate) fn json_error(format: SourceFormat, err: serde_json::Error) -> ImportError {
    match err.line() {
        0 => ImportError::parse(format, err.to_string()),
        line => ImportError::parse_at(format, line, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_line() {
        let err = ImportError::parse_at(SourceFormat::Csv, 3, "unequal column count");
        assert_eq!(err.to_string(), "csv parse error at line 3: unequal column count");

        let err = ImportError::parse(SourceFormat::Avro, "not a record schema");
        assert_eq!(err.to_string(), "avro parse error: not a record schema");
    }

    #[test]
    fn decode_utf8_rejects_binary() {
        let err = decode_utf8(&[0xff, 0xfe, 0x00], SourceFormat::Dbml).unwrap_err();
        assert!(matches!(err, ImportError::Parse { .. }));
    }

    #[test]
    fn json_error_without_position_has_no_location() {
        let positionless = <serde_json::Error as serde::de::Error>::custom("boom");
        let err = json_error(SourceFormat::Dbt, positionless);
        match err {
            ImportError::Parse { line, .. } => assert_eq!(line, None),
            other => panic!("expected parse error, got {:?}", other),
        }

        let syntax = serde_json::from_str::<serde_json::Value>("{\n!").unwrap_err();
        let err = json_error(SourceFormat::Dbt, syntax);
        assert!(err.to_string().contains("at line 2"));
    }
}
