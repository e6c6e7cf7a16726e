//! Line-oriented `CREATE TABLE` parser.
//!
//! The parser is a two-state machine driven one line at a time:
//!
//! ```text
//!            CREATE ...                 );
//!   Idle ─────────────────▶ InTable ─────────▶ Idle  (+ completed Table)
//!                           │    ▲
//!                           └────┘ column / PRIMARY KEY / UNIQUE / CREATE
//! ```
//!
//! Blank lines and `--` comments are ignored in every state. Only the
//! markers above are recognised; anything else inside a block is a column
//! declaration of the form `<name> <type> [...]`.

use nom::{
    bytes::complete::take_till1, character::complete::multispace0, multi::many0,
    sequence::preceded, IResult,
};
use tracing::{debug, warn};

use crate::ast::{Column, Table};
use crate::error::{GenError, GenResult};

/// What a single input line means to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// `CREATE TABLE <name> (`
    TableOpen { name: &'a str },
    /// Table-level `PRIMARY KEY (...)` or `UNIQUE (...)`.
    Constraint,
    /// `);`
    TableClose,
    Column(Column),
}

/// Parser state between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParseState {
    #[default]
    Idle,
    InTable(Table),
}

/// Result of feeding one line to [`step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ParseState,
    /// Set when the line closed a table.
    pub completed: Option<Table>,
}

impl Transition {
    fn stay(state: ParseState) -> Self {
        Self {
            state,
            completed: None,
        }
    }
}

/// Parse a single whitespace-delimited token.
fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(char::is_whitespace))(input)
}

/// Split a line into whitespace-delimited tokens.
pub fn lex(line: &str) -> Vec<&str> {
    match many0(token)(line) {
        Ok((_, tokens)) => tokens,
        Err(_) => Vec::new(),
    }
}

/// Classify one line. `line_no` is 1-based and only used for errors.
pub fn classify(line_no: usize, line: &str) -> GenResult<LineKind<'_>> {
    let trimmed = line.trim_start();

    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }

    if trimmed.starts_with("--") {
        return Ok(LineKind::Comment);
    }

    if line.starts_with("CREATE") {
        let tokens = lex(line);
        // CREATE TABLE <name> ( -> the name sits just before the paren
        if tokens.len() < 3 {
            return Err(GenError::parse(
                line_no,
                format!("expected 'CREATE TABLE <name> (', got '{}'", line.trim()),
            ));
        }
        return Ok(LineKind::TableOpen {
            name: tokens[tokens.len() - 2],
        });
    }

    if trimmed.starts_with("PRIMARY KEY") || trimmed.starts_with("UNIQUE") {
        return Ok(LineKind::Constraint);
    }

    if line.starts_with(");") {
        return Ok(LineKind::TableClose);
    }

    parse_column(line_no, line).map(LineKind::Column)
}

/// Parse a column declaration line.
fn parse_column(line_no: usize, line: &str) -> GenResult<Column> {
    match lex(line).as_slice() {
        [name, sql_type, ..] => {
            let not_null = line.contains("NOT NULL") || line.contains("PRIMARY KEY");
            Ok(Column::new(*name, *sql_type, not_null))
        }
        _ => Err(GenError::parse(
            line_no,
            format!("expected '<name> <type>' in column declaration '{}'", line.trim()),
        )),
    }
}

/// Advance the state machine by one line.
pub fn step(state: ParseState, line_no: usize, line: &str) -> GenResult<Transition> {
    match (classify(line_no, line)?, state) {
        (LineKind::Blank | LineKind::Comment | LineKind::Constraint, state) => {
            Ok(Transition::stay(state))
        }
        (LineKind::TableOpen { name }, state) => {
            if let ParseState::InTable(abandoned) = state {
                warn!(
                    table = %abandoned.name,
                    line = line_no,
                    "CREATE before ');', dropping the unfinished table"
                );
            }
            Ok(Transition::stay(ParseState::InTable(Table::new(name))))
        }
        (LineKind::TableClose, ParseState::InTable(table)) => Ok(Transition {
            state: ParseState::Idle,
            completed: Some(table),
        }),
        (LineKind::TableClose, ParseState::Idle) => Ok(Transition::stay(ParseState::Idle)),
        (LineKind::Column(column), ParseState::InTable(mut table)) => {
            table.columns.push(column);
            Ok(Transition::stay(ParseState::InTable(table)))
        }
        (LineKind::Column(_), ParseState::Idle) => Err(GenError::ColumnOutsideTable {
            line: line_no,
            text: line.trim().to_string(),
        }),
    }
}

/// Streaming iterator over the tables of a DDL document, in input order.
///
/// Yields at most one error, after which iteration ends.
pub struct Tables<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    state: ParseState,
    done: bool,
}

impl<'a> Tables<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            state: ParseState::Idle,
            done: false,
        }
    }
}

impl Iterator for Tables<'_> {
    type Item = GenResult<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for (idx, line) in self.lines.by_ref() {
            let state = std::mem::take(&mut self.state);
            match step(state, idx + 1, line) {
                Ok(Transition { state, completed }) => {
                    self.state = state;
                    if let Some(table) = completed {
                        debug!(table = %table.name, columns = table.columns.len(), "parsed table");
                        return Some(Ok(table));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if let ParseState::InTable(table) = std::mem::take(&mut self.state) {
            warn!(table = %table.name, "input ended before ');', dropping the unfinished table");
        }
        self.done = true;
        None
    }
}

/// Parse a complete DDL document into its tables.
///
/// # Example
///
/// ```
/// use sql2godb::parser::parse;
///
/// let tables = parse("CREATE TABLE users (\nid bigserial PRIMARY KEY\n);").unwrap();
/// assert_eq!(tables[0].name, "users");
/// assert!(tables[0].columns[0].not_null);
/// ```
pub fn parse(input: &str) -> GenResult<Vec<Table>> {
    Tables::new(input).collect()
}
