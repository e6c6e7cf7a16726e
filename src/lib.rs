//! # sql2godb
//!
//! Turns `CREATE TABLE` statements into a Go data-access layer for
//! [pgx](https://github.com/jackc/pgx): one struct and up to four CRUD
//! functions per table.
//!
//! ## Quick Example
//!
//! ```rust
//! use sql2godb::prelude::*;
//!
//! let ddl = "\
//! CREATE TABLE users (
//!     id bigserial PRIMARY KEY,
//!     name text NOT NULL,
//!     version int NOT NULL
//! );
//! ";
//!
//! let go = sql2godb::generate(ddl, &Config::default())?;
//! assert!(go.contains("func UpdateUser(user *User, db DB) error {"));
//! # Ok::<(), GenError>(())
//! ```
//!
//! ## Pipeline
//!
//! | Stage       | Module        | Output                 |
//! |-------------|---------------|------------------------|
//! | Parse       | [`parser`]    | [`ast::Table`] stream  |
//! | Map types   | [`types`]     | [`types::GoType`]      |
//! | Name things | [`ident`]     | Go identifiers         |
//! | Generate    | [`generator`] | struct + CRUD sections |
//! | Assemble    | [`driver`]    | one Go file            |

pub mod ast;
pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod ident;
pub mod parser;
pub mod template;
pub mod types;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{Config, ErrorPolicy};
    pub use crate::driver::{explain, generate, generate_table};
    pub use crate::error::*;
    pub use crate::generator::{Generator, Operation, ToGo};
    pub use crate::parser::{parse, Tables};
    pub use crate::types::{map_sql_type, GoType};
}

/// Generate Go source for every table in `input`.
///
/// # Example
///
/// ```
/// use sql2godb::config::Config;
///
/// let go = sql2godb::generate("", &Config::default()).unwrap();
/// assert_eq!(go, "package data\n\n");
/// ```
pub fn generate(input: &str, config: &config::Config) -> error::GenResult<String> {
    driver::generate(input, config)
}
