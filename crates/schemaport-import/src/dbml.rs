//! DBML (database markup language) import
//!
//! Line-oriented parse of `Table <name> { <column> <type> [settings] }`
//! blocks. Ref/Enum/Project blocks, notes, and indexes are skipped; only
//! table shapes matter here. Each table becomes one Struct field whose
//! children are the table's columns.

use crate::format::SourceFormat;
use crate::importer::{decode_utf8, ImportError, SchemaImporter};
use regex::Regex;
use schemaport_core::{CanonicalSchema, Field, LogicalType, Nullability};

/// Importer for DBML documents
pub struct DbmlImporter {
    table_re: Regex,
    column_re: Regex,
}

impl DbmlImporter {
    pub fn new() -> Self {
        Self {
            // Table users { / Table "user orders" as O {
            table_re: Regex::new(
                r#"(?i)^\s*table\s+(?:"([^"]+)"|([A-Za-z0-9_.]+))(?:\s+as\s+\w+)?\s*\{"#,
            )
            .expect("static regex"),
            // id integer [pk, not null]
            column_re: Regex::new(
                r#"^\s*(?:"([^"]+)"|([A-Za-z0-9_]+))\s+([A-Za-z0-9_]+(?:\s*\([^)]*\))?)\s*(?:\[([^\]]*)\])?\s*(?://.*)?$"#,
            )
            .expect("static regex"),
        }
    }
}

impl Default for DbmlImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaImporter for DbmlImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Dbml
    }

    fn import(&self, bytes: &[u8], source: &str) -> Result<CanonicalSchema, ImportError> {
        let text = decode_utf8(bytes, SourceFormat::Dbml)?;

        let mut tables: Vec<Field> = Vec::new();
        let mut current: Option<(String, Vec<Field>)> = None;
        // Depth of skipped nested blocks (indexes, notes) inside a table
        let mut skip_depth = 0usize;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if skip_depth > 0 {
                if line.contains('{') {
                    skip_depth += 1;
                }
                if line.contains('}') {
                    skip_depth -= 1;
                }
                continue;
            }

            if line.starts_with('}') {
                if let Some((name, columns)) = current.take() {
                    if columns.is_empty() {
                        return Err(ImportError::parse_at(
                            SourceFormat::Dbml,
                            line_no,
                            format!("table '{}' has no columns", name),
                        ));
                    }
                    tables.push(
                        Field::new(name, LogicalType::Struct)
                            .with_nullability(Nullability::No)
                            .with_children(columns),
                    );
                }
                continue;
            }

            if let Some((name, columns)) = current.as_mut() {
                if line.to_lowercase().starts_with("indexes")
                    || line.to_lowercase().starts_with("note")
                {
                    if line.contains('{') && !line.contains('}') {
                        skip_depth = 1;
                    }
                    continue;
                }

                let caps = self.column_re.captures(line).ok_or_else(|| {
                    ImportError::parse_at(
                        SourceFormat::Dbml,
                        line_no,
                        format!("unrecognized column declaration in table '{}': '{}'", name, line),
                    )
                })?;

                let column_name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                let type_decl = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
                let settings = caps.get(4).map(|m| m.as_str().to_lowercase()).unwrap_or_default();

                // DBML columns are nullable unless marked otherwise
                let nullable = if settings.contains("not null")
                    || settings.contains("pk")
                    || settings.contains("primary key")
                {
                    Nullability::No
                } else {
                    Nullability::Yes
                };

                columns.push(
                    Field::new(column_name, map_dbml_type(type_decl)).with_nullability(nullable),
                );
            } else if let Some(caps) = self.table_re.captures(line) {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                current = Some((name, Vec::new()));
            } else if line.contains('{') && !line.contains('}') {
                // Some other block (Enum, Project, TableGroup)
                skip_depth = 1;
            }
            // Single-line directives (Ref: ...) fall through untouched
        }

        if current.is_some() {
            return Err(ImportError::parse(
                SourceFormat::Dbml,
                "unterminated table block",
            ));
        }

        if tables.is_empty() {
            return Err(ImportError::Empty {
                format: SourceFormat::Dbml,
            });
        }

        Ok(CanonicalSchema::from_fields(tables).with_source(source))
    }
}

/// Map a DBML column type declaration onto the canonical type system
fn map_dbml_type(decl: &str) -> LogicalType {
    let lower = decl.to_lowercase();
    let base = lower.split('(').next().unwrap_or("").trim();

    match base {
        "int" | "integer" | "bigint" | "smallint" | "tinyint" | "serial" | "bigserial" => {
            LogicalType::Int
        }
        "varchar" | "char" | "character" | "text" | "string" | "nvarchar" | "uuid" => {
            LogicalType::String
        }
        "bool" | "boolean" => LogicalType::Bool,
        "float" | "double" | "real" => LogicalType::Float,
        "decimal" | "numeric" => parse_decimal_args(&lower),
        "date" => LogicalType::Date,
        "timestamp" | "timestamptz" | "datetime" => LogicalType::Timestamp,
        "json" | "jsonb" => LogicalType::Json,
        "blob" | "binary" | "varbinary" | "bytea" => LogicalType::Bytes,
        _ => LogicalType::Unknown,
    }
}

/// Pull `(p,s)` out of a decimal declaration when present
fn parse_decimal_args(decl: &str) -> LogicalType {
    let args = decl
        .split_once('(')
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .map(|args| {
            args.split(',')
                .filter_map(|a| a.trim().parse::<u16>().ok())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    LogicalType::Decimal {
        precision: args.first().copied(),
        scale: args.get(1).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
// schema for the web shop
Table users {
  id integer [primary key]
  username varchar(255) [not null]
  email varchar [unique]
  created_at timestamp
}

Table orders {
  id integer [pk]
  user_id integer [ref: > users.id, not null]
  total decimal(10,2)
  placed_on date
}

Ref: orders.user_id > users.id
"#;

    #[test]
    fn tables_become_struct_fields() {
        let schema = DbmlImporter::new().import(SAMPLE.as_bytes(), "shop.dbml").unwrap();

        assert_eq!(schema.field_names(), vec!["users", "orders"]);

        let users = schema.find_field("users").unwrap();
        assert_eq!(users.logical_type, LogicalType::Struct);
        assert_eq!(users.children.len(), 4);
        assert_eq!(users.children[0].name, "id");
        assert_eq!(users.children[0].nullable, Nullability::No);
        assert_eq!(users.children[1].logical_type, LogicalType::String);
        assert_eq!(users.children[3].logical_type, LogicalType::Timestamp);

        let orders = schema.find_field("orders").unwrap();
        assert_eq!(
            orders.children[2].logical_type,
            LogicalType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
        );
        assert_eq!(orders.children[3].logical_type, LogicalType::Date);
    }

    #[test]
    fn unique_alone_keeps_column_nullable() {
        let schema = DbmlImporter::new().import(SAMPLE.as_bytes(), "shop.dbml").unwrap();
        let users = schema.find_field("users").unwrap();
        assert_eq!(users.children[2].name, "email");
        assert_eq!(users.children[2].nullable, Nullability::Yes);
    }

    #[test]
    fn indexes_block_is_skipped() {
        let dbml = "Table t {\n  id int [pk]\n  indexes {\n    (id) [unique]\n  }\n}\n";
        let schema = DbmlImporter::new().import(dbml.as_bytes(), "t.dbml").unwrap();
        assert_eq!(schema.find_field("t").unwrap().children.len(), 1);
    }

    #[test]
    fn bad_column_line_reports_line_number() {
        let dbml = "Table t {\n  id int\n  ???\n}\n";
        let err = DbmlImporter::new().import(dbml.as_bytes(), "t.dbml").unwrap_err();
        match err {
            ImportError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_table_is_an_error() {
        let err = DbmlImporter::new()
            .import(b"Table t {\n  id int\n", "t.dbml")
            .unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn document_without_tables_is_empty() {
        let err = DbmlImporter::new()
            .import(b"// nothing here\n", "t.dbml")
            .unwrap_err();
        assert!(matches!(err, ImportError::Empty { .. }));
    }
}
