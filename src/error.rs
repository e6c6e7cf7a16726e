//! Error types for sql2godb.

use thiserror::Error;

/// The main error type for parsing and generation.
#[derive(Debug, Error)]
pub enum GenError {
    /// A SQL type token with no Go counterpart.
    #[error("No conversion for type '{token}'")]
    UnknownType { token: String },

    /// A `CREATE` or column line with too few tokens.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A column declaration seen while no `CREATE TABLE` block is open.
    #[error("Column declaration outside of a CREATE TABLE block on line {line}: '{text}'")]
    ColumnOutsideTable { line: usize, text: String },

    /// Generation failed for one table.
    #[error("Table '{table}': {source}")]
    Table {
        table: String,
        #[source]
        source: Box<GenError>,
    },

    /// A template slot was rendered without a binding.
    #[error("Template '{template}' has no binding for '{{{{{slot}}}}}'")]
    Template { template: &'static str, slot: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Create a parse error at the given (1-based) line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Attach the table being generated to an error.
    pub fn in_table(self, table: impl Into<String>) -> Self {
        Self::Table {
            table: table.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for sql2godb operations.
pub type GenResult<T> = Result<T, GenError>;
