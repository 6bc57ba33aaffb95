//! Format tags and importer dispatch
//!
//! Pure mapping from a caller-supplied format tag to the matching importer.
//! The tag set is fixed; unknown tags fail at dispatch, before any I/O.

use crate::importer::{ImportError, SchemaImporter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The fixed set of supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Parquet,
    Avro,
    Dbml,
    Dbt,
    Iceberg,
    JsonSchema,
    Odcs,
}

impl SourceFormat {
    /// All supported formats, in tag order
    pub fn all() -> &'static [SourceFormat] {
        &[
            Self::Csv,
            Self::Parquet,
            Self::Avro,
            Self::Dbml,
            Self::Dbt,
            Self::Iceberg,
            Self::JsonSchema,
            Self::Odcs,
        ]
    }

    /// The tag accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Avro => "avro",
            Self::Dbml => "dbml",
            Self::Dbt => "dbt",
            Self::Iceberg => "iceberg",
            Self::JsonSchema => "jsonschema",
            Self::Odcs => "odcs",
        }
    }

    /// Comma-separated list of every supported tag
    pub fn supported_tags() -> String {
        Self::all()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = ImportError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "avro" => Ok(Self::Avro),
            "dbml" => Ok(Self::Dbml),
            "dbt" => Ok(Self::Dbt),
            "iceberg" => Ok(Self::Iceberg),
            "jsonschema" => Ok(Self::JsonSchema),
            "odcs" => Ok(Self::Odcs),
            _ => Err(ImportError::UnsupportedFormat {
                tag: tag.to_string(),
                supported: Self::supported_tags(),
            }),
        }
    }
}

/// Get the importer for a format
///
/// Pure mapping, no I/O; importers are stateless so construction is cheap.
pub fn importer_for(format: SourceFormat) -> Box<dyn SchemaImporter> {
    match format {
        SourceFormat::Csv => Box::new(crate::csv::CsvImporter::new()),
        SourceFormat::Parquet => Box::new(crate::parquet::ParquetImporter::new()),
        SourceFormat::Avro => Box::new(crate::avro::AvroImporter::new()),
        SourceFormat::Dbml => Box::new(crate::dbml::DbmlImporter::new()),
        SourceFormat::Dbt => Box::new(crate::dbt::DbtImporter::new()),
        SourceFormat::Iceberg => Box::new(crate::iceberg::IcebergImporter::new()),
        SourceFormat::JsonSchema => Box::new(crate::jsonschema::JsonSchemaImporter::new()),
        SourceFormat::Odcs => Box::new(crate::odcs::OdcsImporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip() {
        for format in SourceFormat::all() {
            let parsed: SourceFormat = format.as_str().parse().unwrap();
            assert_eq!(parsed, *format);
        }
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let err = "protobuf".parse::<SourceFormat>().unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("protobuf"));
        assert!(err.to_string().contains("jsonschema"));
    }

    #[test]
    fn tag_is_case_sensitive() {
        assert!("CSV".parse::<SourceFormat>().is_err());
    }

    #[test]
    fn every_format_has_an_importer() {
        for format in SourceFormat::all() {
            let importer = importer_for(*format);
            assert_eq!(importer.format(), *format);
        }
    }
}
