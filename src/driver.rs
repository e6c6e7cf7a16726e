//! Text-in, text-out pipeline.
//!
//! Tables are generated as soon as the parser closes them, so output order
//! always matches input order.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::ast::Table;
use crate::config::{Config, ErrorPolicy};
use crate::error::GenResult;
use crate::generator::{Operation, ToGo};
use crate::parser::Tables;
use crate::types::GoType;

/// `package <name>` followed by a blank line.
pub fn header(config: &Config) -> String {
    format!("package {}\n\n", config.package)
}

/// Generate the Go source for a whole DDL document.
///
/// # Example
///
/// ```
/// use sql2godb::{config::Config, driver::generate};
///
/// let go = generate("CREATE TABLE tags (\nlabel text NOT NULL\n);", &Config::default()).unwrap();
/// assert!(go.starts_with("package data\n\ntype Tag struct {"));
/// ```
pub fn generate(input: &str, config: &Config) -> GenResult<String> {
    config.validate()?;

    let mut out = header(config);
    for table in Tables::new(input) {
        let table = table?;
        match generate_table(&table, config) {
            Ok(code) => {
                debug!(table = %table.name, bytes = code.len(), "generated table");
                out.push_str(&code);
            }
            Err(e) if config.on_error == ErrorPolicy::SkipTable => {
                warn!(table = %table.name, error = %e, "skipping table");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Generate one table without the package header.
pub fn generate_table(table: &Table, config: &Config) -> GenResult<String> {
    table.to_go(config)
}

/// Replace `path` with `contents` in one step.
///
/// The data goes to a temporary file next to `path` first, so a failure
/// leaves any existing file untouched. An existing file keeps its mode; a
/// new one is created `0644` (minus the umask) on Unix.
pub fn write_atomically(path: &Path, contents: &str) -> GenResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = std::fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut tmp = temp_file_builder().tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    if let Some(permissions) = existing {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn temp_file_builder() -> tempfile::Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tempfile::Builder::new();
    builder.permissions(std::fs::Permissions::from_mode(0o644));
    builder
}

#[cfg(not(unix))]
fn temp_file_builder() -> tempfile::Builder<'static, 'static> {
    tempfile::Builder::new()
}

/// Parsed view of one table, for `explain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub entity: String,
    pub columns: Vec<ColumnReport>,
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub field: String,
    pub sql_type: String,
    /// `None` when the type has no mapping.
    pub go_type: Option<GoType>,
    pub not_null: bool,
}

impl From<&Table> for TableReport {
    fn from(table: &Table) -> Self {
        Self {
            table: table.name.clone(),
            entity: table.entity_name(),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnReport {
                    name: c.name.clone(),
                    field: c.field_name(),
                    sql_type: c.type_token().to_string(),
                    go_type: c.go_type().ok(),
                    not_null: c.not_null,
                })
                .collect(),
            operations: Operation::for_table(table)
                .iter()
                .map(|op| format!("{}{}", op, table.entity_name()))
                .collect(),
        }
    }
}

/// Parse `input` and describe every table without generating code.
pub fn explain(input: &str) -> GenResult<Vec<TableReport>> {
    Tables::new(input)
        .map(|table| table.map(|t| TableReport::from(&t)))
        .collect()
}
