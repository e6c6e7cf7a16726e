//! SQL to Go type mapping.
//!
//! The table is closed: a token not listed here stops generation.

use serde::Serialize;
use std::fmt;

use crate::error::{GenError, GenResult};

/// Go types a column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoType {
    Int64,
    Int32,
    String,
    Time,
    Uuid,
    Bool,
}

impl GoType {
    /// Go spelling of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoType::Int64 => "int64",
            GoType::Int32 => "int32",
            GoType::String => "string",
            GoType::Time => "time.Time",
            GoType::Uuid => "uuid.UUID",
            GoType::Bool => "bool",
        }
    }

    /// Field type as written in a struct, pointer-wrapped when nullable.
    pub fn render(&self, nullable: bool) -> String {
        if nullable {
            format!("*{}", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the separator a column line may leave on its type token.
pub fn strip_trailing_comma(token: &str) -> &str {
    token.strip_suffix(',').unwrap_or(token)
}

/// Map a raw SQL type token onto its Go type.
///
/// Matching is exact and case-sensitive after one trailing comma is removed.
///
/// ```
/// use sql2godb::types::{map_sql_type, GoType};
///
/// assert_eq!(map_sql_type("bigserial").unwrap(), GoType::Int64);
/// assert_eq!(map_sql_type("text,").unwrap(), GoType::String);
/// assert!(map_sql_type("jsonb").is_err());
/// ```
pub fn map_sql_type(token: &str) -> GenResult<GoType> {
    match strip_trailing_comma(token) {
        "bigserial" | "bigint" => Ok(GoType::Int64),
        "int" => Ok(GoType::Int32),
        "text" => Ok(GoType::String),
        "date" | "time" | "timestamp(0)" => Ok(GoType::Time),
        "uuid" => Ok(GoType::Uuid),
        "boolean" => Ok(GoType::Bool),
        _ => Err(GenError::UnknownType {
            token: token.to_string(),
        }),
    }
}
