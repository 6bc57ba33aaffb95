//! CSV schema inference
//!
//! The header row gives field names in file order. Types are inferred by
//! sampling data rows: each cell is classified, and conflicting
//! classifications widen along a small promotion lattice (Int -> Float ->
//! String). An empty cell marks the field nullable.

use crate::format::SourceFormat;
use crate::importer::{decode_utf8, ImportError, SchemaImporter};
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};

/// Number of data rows to sample for type inference
const SAMPLE_SIZE: usize = 1000;

/// Simplified cell type used during inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Bool,
    Int,
    Float,
    Date,
    Timestamp,
    String,
}

impl CellType {
    /// Classify a single non-empty cell
    fn classify(cell: &str) -> Self {
        let trimmed = cell.trim();

        if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool;
        }
        if trimmed.parse::<i64>().is_ok() {
            return Self::Int;
        }
        if trimmed.parse::<f64>().is_ok() {
            return Self::Float;
        }
        if is_iso_date(trimmed) {
            return Self::Date;
        }
        if is_iso_timestamp(trimmed) {
            return Self::Timestamp;
        }
        Self::String
    }

    /// Widen two observed types to their common representation
    fn widen(self, other: Self) -> Self {
        use CellType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            (Date, Timestamp) | (Timestamp, Date) => Timestamp,
            _ => String,
        }
    }

    fn into_logical(self) -> LogicalType {
        match self {
            Self::Bool => LogicalType::Bool,
            Self::Int => LogicalType::Int,
            Self::Float => LogicalType::Float,
            Self::Date => LogicalType::Date,
            Self::Timestamp => LogicalType::Timestamp,
            Self::String => LogicalType::String,
        }
    }
}

/// `YYYY-MM-DD`
fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && s.chars()
            .enumerate()
            .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
}

/// `YYYY-MM-DD[T ]HH:MM:SS` with optional fraction and zone suffix
fn is_iso_timestamp(s: &str) -> bool {
    if s.len() < 19 || !s.is_ascii() {
        return false;
    }
    let (date, rest) = s.split_at(10);
    if !is_iso_date(date) {
        return false;
    }
    let rest = rest.as_bytes();
    matches!(rest[0], b'T' | b' ')
        && rest[3] == b':'
        && rest[6] == b':'
        && rest[1].is_ascii_digit()
        && rest[2].is_ascii_digit()
        && rest[4].is_ascii_digit()
        && rest[5].is_ascii_digit()
        && rest[7].is_ascii_digit()
        && rest[8].is_ascii_digit()
}

/// Importer for CSV files with a header row
pub struct CsvImporter;

impl CsvImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for CsvImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        // Reject binary input up front so the csv reader never sees it
        decode_utf8(bytes, SourceFormat::Csv)?;

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(map_csv_error)?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::Empty {
                format: SourceFormat::Csv,
            });
        }

        let mut observed: Vec<Option<CellType>> = vec![None; headers.len()];
        let mut saw_empty: Vec<bool> = vec![false; headers.len()];

        for record in reader.records().take(SAMPLE_SIZE) {
            let record = record.map_err(map_csv_error)?;
            for (i, cell) in record.iter().enumerate().take(headers.len()) {
                if cell.trim().is_empty() {
                    saw_empty[i] = true;
                    continue;
                }
                let cell_type = CellType::classify(cell);
                observed[i] = Some(match observed[i] {
                    Some(prev) => prev.widen(cell_type),
                    None => cell_type,
                });
            }
        }

        let fields = headers
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let logical_type = observed[i]
                    .map(CellType::into_logical)
                    .unwrap_or(LogicalType::Unknown);
                let nullable = if saw_empty[i] {
                    Nullability::Yes
                } else {
                    Nullability::Unknown
                };
                Field::new(name, logical_type).with_nullability(nullable)
            })
            .collect();

        Ok(CanonicalSchema::from_fields(fields).with_source(source))
    }
}

/// Map a csv reader error onto the import taxonomy, keeping the line
fn map_csv_error(err: ::csv::Error) -> ImportError {
    let line = err.position().map(|p| p.line() as usize);
    match line {
        Some(line) => ImportError::parse_at(SourceFormat::Csv, line, err.to_string()),
        None => ImportError::parse(SourceFormat::Csv, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn import(data: &str) -> CanonicalSchema {
        CsvImporter::new().import(data.as_bytes(), "test.csv").unwrap()
    }

    #[test]
    fn header_order_is_preserved() {
        let schema = import("field_one,field_two,field_three\n1,a,true\n");
        assert_eq!(schema.field_names(), vec!["field_one", "field_two", "field_three"]);
    }

    #[test]
    fn type_inference_from_samples() {
        let schema = import(
            "id,amount,active,signup_date,created_at,note\n\
             1,9.99,true,2024-01-15,2024-01-15T08:30:00Z,hello\n\
             2,12.50,false,2024-02-20,2024-02-20 09:00:00,world\n",
        );

        assert_eq!(schema.find_field("id").unwrap().logical_type, LogicalType::Int);
        assert_eq!(schema.find_field("amount").unwrap().logical_type, LogicalType::Float);
        assert_eq!(schema.find_field("active").unwrap().logical_type, LogicalType::Bool);
        assert_eq!(schema.find_field("signup_date").unwrap().logical_type, LogicalType::Date);
        assert_eq!(
            schema.find_field("created_at").unwrap().logical_type,
            LogicalType::Timestamp
        );
        assert_eq!(schema.find_field("note").unwrap().logical_type, LogicalType::String);
    }

    #[test]
    fn conflicting_types_widen() {
        let schema = import("mixed_num,mixed_any\n1,1\n2.5,true\n");
        assert_eq!(
            schema.find_field("mixed_num").unwrap().logical_type,
            LogicalType::Float
        );
        assert_eq!(
            schema.find_field("mixed_any").unwrap().logical_type,
            LogicalType::String
        );
    }

    #[test]
    fn empty_cells_mark_nullable() {
        let schema = import("id,note\n1,\n2,text\n");
        assert_eq!(schema.find_field("note").unwrap().nullable, Nullability::Yes);
        assert_eq!(schema.find_field("id").unwrap().nullable, Nullability::Unknown);
    }

    #[test]
    fn header_only_file_has_unknown_types() {
        let schema = import("id,name\n");
        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.find_field("id").unwrap().logical_type, LogicalType::Unknown);
    }

    #[test]
    fn ragged_row_is_a_parse_error_with_line() {
        let err = CsvImporter::new()
            .import(b"a,b\n1,2\n1,2,3\n", "test.csv")
            .unwrap_err();

        match err {
            ImportError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn binary_input_is_rejected() {
        let err = CsvImporter::new()
            .import(&[0x00, 0xff, 0xfe], "test.csv")
            .unwrap_err();
        assert!(matches!(err, ImportError::Parse { .. }));
    }
}
