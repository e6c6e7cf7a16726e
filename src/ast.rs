//! Table model produced by the parser.

use serde::Serialize;

use crate::error::GenResult;
use crate::ident::{clashes_with_generated_code, singularize, to_upper_camel};
use crate::types::{GoType, map_sql_type, strip_trailing_comma};

pub const ID: &str = "id";
pub const VERSION: &str = "version";
pub const CREATED_AT: &str = "created_at";
pub const CREATED_BY: &str = "created_by";
pub const EDITED_AT: &str = "edited_at";

/// One column declaration inside a `CREATE TABLE` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Raw `snake_case` column name.
    pub name: String,
    /// Raw type token, possibly with the line's trailing comma.
    pub sql_type: String,
    /// Set by `NOT NULL` or `PRIMARY KEY` on the declaration line.
    pub not_null: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>, not_null: bool) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null,
        }
    }

    /// Type token without the trailing comma.
    pub fn type_token(&self) -> &str {
        strip_trailing_comma(&self.sql_type)
    }

    /// Go struct field name.
    pub fn field_name(&self) -> String {
        to_upper_camel(&self.name)
    }

    pub fn go_type(&self) -> GenResult<GoType> {
        map_sql_type(&self.sql_type)
    }

    pub fn is_id(&self) -> bool {
        self.name == ID
    }

    pub fn is_version(&self) -> bool {
        self.name == VERSION
    }
}

/// A parsed `CREATE TABLE` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Plural SQL table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder-style column append, handy for constructing tables by hand.
    pub fn column(mut self, name: &str, sql_type: &str, not_null: bool) -> Self {
        self.columns.push(Column::new(name, sql_type, not_null));
        self
    }

    /// Go type name: singular, PascalCase.
    pub fn entity_name(&self) -> String {
        to_upper_camel(singularize(&self.name))
    }

    /// Go receiver/variable name: the singular table name as written.
    pub fn var_name(&self) -> &str {
        singularize(&self.name)
    }

    /// True if [`Table::var_name`] shadows a keyword or a name the generated
    /// functions already declare, which makes the Go output fail to compile.
    pub fn var_name_clashes(&self) -> bool {
        clashes_with_generated_code(self.var_name())
    }

    pub fn id_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_id())
    }

    pub fn has_id(&self) -> bool {
        self.id_column().is_some()
    }

    pub fn has_version(&self) -> bool {
        self.columns.iter().any(Column::is_version)
    }

    /// Check every column type resolves, reporting the first that doesn't.
    pub fn validate_types(&self) -> GenResult<()> {
        for col in &self.columns {
            col.go_type().map_err(|e| e.in_table(self.name.clone()))?;
        }
        Ok(())
    }
}
