//! Go code generation for parsed tables.
//!
//! Each table yields a record struct and up to four functions. The column
//! roles that drive the SQL are fixed by name:
//!
//! | column       | Create              | Update                     |
//! |--------------|---------------------|----------------------------|
//! | `id`         | RETURNING           | `WHERE id = $n`            |
//! | `version`    | RETURNING           | `WHERE version = $n`, `+1` |
//! | `created_at` | skipped             | skipped                    |
//! | `created_by` | inserted            | skipped                    |
//! | `edited_at`  | skipped             | `edited_at = NOW()`        |
//!
//! Get and Delete need an `id` column; Update needs `id` and `version`.
//! Functions whose columns are missing are left out.

use std::fmt;

use crate::ast::{Column, Table, CREATED_AT, CREATED_BY, EDITED_AT};
use crate::config::Config;
use crate::error::GenResult;
use crate::template::{Bindings, Template};
use crate::types::GoType;

const RECORD: Template = Template::new(
    "record",
    "type {{entity}} struct {
{{fields}}}
",
);

const FIELD: Template = Template::new("field", "\t{{field}}\t{{type}}\t`db:\"{{column}}\"`\n");

const SCOPE: Template = Template::new(
    "scope",
    "\tctx, cancel := context.WithTimeout(context.Background(), time.Second*{{secs}})
\tdefer cancel()
",
);

const CHECK: &str = "\tif err != nil {
\t\treturn err
\t}
";

const CONFLICT_CHECK: Template = Template::new(
    "conflict_check",
    "\tif errors.Is(err, pgx.ErrNoRows) {
\t\treturn {{conflict}}
\t}
\tif err != nil {
\t\treturn err
\t}
",
);

const CREATE_RETURNING: Template = Template::new(
    "create",
    "func Create{{entity}}({{var}} *{{entity}}, db {{db}}) error {
\tq := `{{sql}}`

{{scope}}
\terr := db.QueryRow(ctx, q{{args}}).Scan({{scan}})

{{check}}
\treturn nil
}
",
);

const CREATE_EXEC: Template = Template::new(
    "create",
    "func Create{{entity}}({{var}} *{{entity}}, db {{db}}) error {
\tq := `{{sql}}`

{{scope}}
\t_, err := db.Exec(ctx, q{{args}})
{{check}}
\treturn nil
}
",
);

const GET: Template = Template::new(
    "get",
    "func Get{{entity}}(id {{id_type}}, db {{db}}) (*{{entity}}, error) {
\tq := `SELECT {{columns}} FROM {{table}} WHERE id = $1`

{{scope}}
\trows, err := db.Query(ctx, q, id)
\tif err != nil {
\t\treturn nil, err
\t}

\t{{var}}, err := pgx.CollectOneRow(rows, pgx.RowToStructByName[{{entity}}])
\tif err != nil {
\t\treturn nil, err
\t}

\treturn &{{var}}, nil
}
",
);

const UPDATE: Template = Template::new(
    "update",
    "func Update{{entity}}({{var}} *{{entity}}, db {{db}}) error {
\tq := `UPDATE {{table}}
SET {{set}}
WHERE {{where}}
RETURNING version`

{{scope}}
\terr := db.QueryRow(ctx, q, {{args}}).Scan(&{{var}}.{{version}})

{{check}}
\treturn nil
}
",
);

const DELETE: Template = Template::new(
    "delete",
    "func Delete{{entity}}(id {{id_type}}, db {{db}}) error {
\tq := `DELETE FROM {{table}} WHERE id = $1`

{{scope}}
\tresult, err := db.Exec(ctx, q, id)
{{check}}
\trowsAffected := result.RowsAffected()

\tif rowsAffected == 0 {
\t\treturn pgx.ErrNoRows
\t}

\treturn nil
}
",
);

/// Generated data-access functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Get,
        Operation::Update,
        Operation::Delete,
    ];

    /// Whether the table has the columns this operation needs.
    pub fn applies_to(&self, table: &Table) -> bool {
        match self {
            Operation::Create => true,
            Operation::Get | Operation::Delete => table.has_id(),
            Operation::Update => table.has_id() && table.has_version(),
        }
    }

    /// Operations generated for `table`, in output order.
    pub fn for_table(table: &Table) -> Vec<Operation> {
        Self::ALL
            .into_iter()
            .filter(|op| op.applies_to(table))
            .collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "Create",
            Operation::Get => "Get",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Column partitioning for the INSERT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan<'a> {
    /// Inserted columns, bound as `$1..$n` in declaration order.
    pub columns: Vec<&'a Column>,
    /// Server-generated columns echoed back: `id` then `version`.
    pub returning: Vec<&'a Column>,
}

impl<'a> InsertPlan<'a> {
    pub fn new(table: &'a Table) -> Self {
        let columns = table
            .columns
            .iter()
            .filter(|c| {
                !c.is_id() && !c.is_version() && c.name != CREATED_AT && c.name != EDITED_AT
            })
            .collect();

        let returning = table
            .id_column()
            .into_iter()
            .chain(table.columns.iter().find(|c| c.is_version()))
            .collect();

        Self { columns, returning }
    }

    /// `RETURNING ...`, if anything comes back.
    pub fn returning_clause(&self) -> Option<String> {
        if self.returning.is_empty() {
            return None;
        }
        Some(format!("RETURNING {}", column_names(&self.returning)))
    }

    pub fn sql(&self, table: &str) -> String {
        let mut sql = if self.columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let placeholders: Vec<String> =
                (1..=self.columns.len()).map(|i| format!("${}", i)).collect();
            format!(
                "INSERT INTO {} ({})\nVALUES ({})",
                table,
                column_names(&self.columns),
                placeholders.join(", ")
            )
        };

        if let Some(returning) = self.returning_clause() {
            sql.push('\n');
            sql.push_str(&returning);
        }
        sql
    }
}

/// One entry of an UPDATE's SET list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment<'a> {
    /// `col = $n`
    Bound(&'a Column),
    /// `col = NOW()`
    Now(&'a Column),
}

/// Column partitioning for the optimistic-lock UPDATE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan<'a> {
    pub assignments: Vec<Assignment<'a>>,
    pub id: &'a Column,
    pub version: &'a Column,
}

impl<'a> UpdatePlan<'a> {
    /// `None` unless the table has both `id` and `version`.
    pub fn new(table: &'a Table) -> Option<Self> {
        let id = table.id_column()?;
        let version = table.columns.iter().find(|c| c.is_version())?;

        let assignments = table
            .columns
            .iter()
            .filter(|c| {
                !c.is_id() && !c.is_version() && c.name != CREATED_AT && c.name != CREATED_BY
            })
            .map(|c| {
                if c.name == EDITED_AT {
                    Assignment::Now(c)
                } else {
                    Assignment::Bound(c)
                }
            })
            .collect();

        Some(Self {
            assignments,
            id,
            version,
        })
    }

    /// Columns bound to parameters, in placeholder order (SET list, id, version).
    pub fn bound(&self) -> Vec<&'a Column> {
        self.assignments
            .iter()
            .filter_map(|a| match a {
                Assignment::Bound(c) => Some(*c),
                Assignment::Now(_) => None,
            })
            .chain([self.id, self.version])
            .collect()
    }

    pub fn set_clause(&self) -> String {
        let mut param = 0;
        let mut set: Vec<String> = self
            .assignments
            .iter()
            .map(|a| match a {
                Assignment::Bound(c) => {
                    param += 1;
                    format!("{} = ${}", c.name, param)
                }
                Assignment::Now(c) => format!("{} = NOW()", c.name),
            })
            .collect();
        set.push("version = version + 1".to_string());
        set.join(", ")
    }

    pub fn where_clause(&self) -> String {
        let id_param = self.bound().len() - 1;
        format!("id = ${} AND version = ${}", id_param, id_param + 1)
    }
}

/// Render a table as Go source.
pub trait ToGo {
    fn to_go(&self, config: &Config) -> GenResult<String>;
}

impl ToGo for Table {
    /// Every section followed by one blank line.
    fn to_go(&self, config: &Config) -> GenResult<String> {
        let sections = Generator::new(self, config).sections()?;
        Ok(sections.into_iter().map(|s| s + "\n").collect())
    }
}

/// Builds the Go sections for one table.
pub struct Generator<'a> {
    table: &'a Table,
    config: &'a Config,
}

impl<'a> Generator<'a> {
    pub fn new(table: &'a Table, config: &'a Config) -> Self {
        Self { table, config }
    }

    /// Record type followed by every applicable function.
    ///
    /// Fails before rendering anything if a column type is unknown.
    pub fn sections(&self) -> GenResult<Vec<String>> {
        self.table.validate_types()?;
        if self.table.var_name_clashes() {
            tracing::warn!(
                table = %self.table.name,
                var = self.table.var_name(),
                "variable name clashes with generated code; output will not compile"
            );
        }

        let mut sections = vec![self.record_type()?];
        for op in Operation::for_table(self.table) {
            let section = match op {
                Operation::Create => Some(self.create_fn()?),
                Operation::Get => self.get_fn()?,
                Operation::Update => self.update_fn()?,
                Operation::Delete => self.delete_fn()?,
            };
            sections.extend(section);
        }
        Ok(sections)
    }

    pub fn record_type(&self) -> GenResult<String> {
        let mut fields = String::new();
        for col in &self.table.columns {
            let ty = self.go_type(col)?;
            fields.push_str(&FIELD.render(
                &Bindings::new()
                    .set("field", col.field_name())
                    .set("type", ty.render(!col.not_null))
                    .set("column", col.name.as_str()),
            )?);
        }

        RECORD.render(
            &Bindings::new()
                .set("entity", self.table.entity_name())
                .set("fields", fields),
        )
    }

    pub fn create_fn(&self) -> GenResult<String> {
        let plan = InsertPlan::new(self.table);
        let args = self.fields(&plan.columns, "");

        let template = if plan.returning.is_empty() {
            CREATE_EXEC
        } else {
            CREATE_RETURNING
        };

        template.render(
            &self
                .common()?
                .set("sql", plan.sql(&self.table.name))
                .set("args", prefixed_args(&args))
                .set("scan", self.fields(&plan.returning, "&").join(", ")),
        )
    }

    pub fn get_fn(&self) -> GenResult<Option<String>> {
        let Some(id) = self.table.id_column() else {
            return Ok(None);
        };
        let columns: Vec<&Column> = self.table.columns.iter().collect();

        GET.render(
            &self
                .common()?
                .set("id_type", self.go_type(id)?.as_str())
                .set("columns", column_names(&columns)),
        )
        .map(Some)
    }

    pub fn update_fn(&self) -> GenResult<Option<String>> {
        let Some(plan) = UpdatePlan::new(self.table) else {
            return Ok(None);
        };

        UPDATE
            .render(
                &self
                    .common()?
                    .set("set", plan.set_clause())
                    .set("where", plan.where_clause())
                    .set("args", self.fields(&plan.bound(), "").join(", "))
                    .set("version", plan.version.field_name())
                    .set("check", self.update_check()?),
            )
            .map(Some)
    }

    pub fn delete_fn(&self) -> GenResult<Option<String>> {
        let Some(id) = self.table.id_column() else {
            return Ok(None);
        };

        DELETE
            .render(&self.common()?.set("id_type", self.go_type(id)?.as_str()))
            .map(Some)
    }

    /// Bindings shared by all function templates.
    fn common(&self) -> GenResult<Bindings> {
        let scope = SCOPE.render(
            &Bindings::new().set("secs", self.config.timeout_secs.to_string()),
        )?;

        Ok(Bindings::new()
            .set("entity", self.table.entity_name())
            .set("var", self.table.var_name())
            .set("table", self.table.name.as_str())
            .set("db", self.config.db_type.as_str())
            .set("scope", scope)
            .set("check", CHECK))
    }

    fn update_check(&self) -> GenResult<String> {
        match &self.config.conflict_error {
            Some(conflict) => {
                CONFLICT_CHECK.render(&Bindings::new().set("conflict", conflict.as_str()))
            }
            None => Ok(CHECK.to_string()),
        }
    }

    /// `var.Field` (or `&var.Field`) for each column.
    fn fields(&self, columns: &[&Column], prefix: &str) -> Vec<String> {
        columns
            .iter()
            .map(|c| format!("{}{}.{}", prefix, self.table.var_name(), c.field_name()))
            .collect()
    }

    fn go_type(&self, column: &Column) -> GenResult<GoType> {
        column
            .go_type()
            .map_err(|e| e.in_table(self.table.name.clone()))
    }
}

fn column_names(columns: &[&Column]) -> String {
    columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn prefixed_args(args: &[String]) -> String {
    args.iter().map(|a| format!(", {}", a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::GenError;
    use pretty_assertions::assert_eq;

    fn users() -> Table {
        Table::new("users")
            .column("id", "bigserial", true)
            .column("name", "text", true)
            .column("version", "int", true)
    }

    fn articles() -> Table {
        Table::new("articles")
            .column("id", "uuid", true)
            .column("title", "text", true)
            .column("created_at", "timestamp(0)", true)
            .column("created_by", "bigint", true)
            .column("edited_at", "timestamp(0)", false)
            .column("version", "int", true)
    }

    fn render(table: &Table) -> Vec<String> {
        Generator::new(table, &Config::default()).sections().unwrap()
    }

    #[test]
    fn test_operations_follow_columns() {
        assert_eq!(Operation::for_table(&users()), Operation::ALL.to_vec());

        let no_version = Table::new("tags").column("id", "bigserial", true);
        assert_eq!(
            Operation::for_table(&no_version),
            vec![Operation::Create, Operation::Get, Operation::Delete]
        );

        let no_id = Table::new("logs").column("message", "text", true);
        assert_eq!(Operation::for_table(&no_id), vec![Operation::Create]);
    }

    #[test]
    fn test_record_type() {
        let out = Generator::new(&articles(), &Config::default())
            .record_type()
            .unwrap();
        assert_eq!(
            out,
            "type Article struct {
\tID\tuuid.UUID\t`db:\"id\"`
\tTitle\tstring\t`db:\"title\"`
\tCreatedAt\ttime.Time\t`db:\"created_at\"`
\tCreatedBy\tint64\t`db:\"created_by\"`
\tEditedAt\t*time.Time\t`db:\"edited_at\"`
\tVersion\tint32\t`db:\"version\"`
}
"
        );
    }

    #[test]
    fn test_insert_plan() {
        let table = articles();
        let plan = InsertPlan::new(&table);
        let names: Vec<&str> = plan.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["title", "created_by"]);
        assert_eq!(
            plan.sql("articles"),
            "INSERT INTO articles (title, created_by)\nVALUES ($1, $2)\nRETURNING id, version"
        );
    }

    #[test]
    fn test_insert_returning_variants() {
        let only_version = Table::new("counters")
            .column("version", "int", true)
            .column("label", "text", true);
        assert_eq!(
            InsertPlan::new(&only_version).returning_clause().as_deref(),
            Some("RETURNING version")
        );

        let only_id = Table::new("tags").column("id", "bigserial", true);
        assert_eq!(
            InsertPlan::new(&only_id).sql("tags"),
            "INSERT INTO tags DEFAULT VALUES\nRETURNING id"
        );

        let neither = Table::new("logs").column("message", "text", true);
        assert_eq!(
            InsertPlan::new(&neither).sql("logs"),
            "INSERT INTO logs (message)\nVALUES ($1)"
        );
    }

    #[test]
    fn test_returning_order_is_id_then_version() {
        let table = Table::new("notes")
            .column("version", "int", true)
            .column("id", "bigserial", true);
        let plan = InsertPlan::new(&table);
        assert_eq!(plan.returning_clause().as_deref(), Some("RETURNING id, version"));
    }

    #[test]
    fn test_update_plan() {
        let table = articles();
        let plan = UpdatePlan::new(&table).unwrap();
        assert_eq!(
            plan.set_clause(),
            "title = $1, edited_at = NOW(), version = version + 1"
        );
        assert_eq!(plan.where_clause(), "id = $2 AND version = $3");
        let bound: Vec<&str> = plan.bound().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(bound, vec!["title", "id", "version"]);
    }

    #[test]
    fn test_update_plan_needs_id_and_version() {
        let table = Table::new("tags").column("id", "bigserial", true);
        assert!(UpdatePlan::new(&table).is_none());

        let table = Table::new("tags").column("version", "int", true);
        assert!(UpdatePlan::new(&table).is_none());
    }

    #[test]
    fn test_create_fn() {
        let out = Generator::new(&users(), &Config::default()).create_fn().unwrap();
        assert_eq!(
            out,
            "func CreateUser(user *User, db DB) error {
\tq := `INSERT INTO users (name)
VALUES ($1)
RETURNING id, version`

\tctx, cancel := context.WithTimeout(context.Background(), time.Second*3)
\tdefer cancel()

\terr := db.QueryRow(ctx, q, user.Name).Scan(&user.ID, &user.Version)

\tif err != nil {
\t\treturn err
\t}

\treturn nil
}
"
        );
    }

    #[test]
    fn test_create_without_returning_uses_exec() {
        let table = Table::new("logs").column("message", "text", true);
        let out = Generator::new(&table, &Config::default()).create_fn().unwrap();
        assert!(out.contains("\t_, err := db.Exec(ctx, q, log.Message)\n"));
        assert!(!out.contains("Scan("));
    }

    #[test]
    fn test_update_fn_with_conflict_error() {
        let config = Config {
            conflict_error: Some("ErrEditConflict".to_string()),
            ..Config::default()
        };
        let out = Generator::new(&users(), &config).update_fn().unwrap().unwrap();
        assert!(out.contains(
            "\tif errors.Is(err, pgx.ErrNoRows) {\n\t\treturn ErrEditConflict\n\t}\n"
        ));
        assert!(out.contains(".Scan(&user.Version)"));
    }

    #[test]
    fn test_get_and_delete_use_id_type() {
        let table = articles();
        let config = Config::default();
        let generator = Generator::new(&table, &config);
        let get = generator.get_fn().unwrap().unwrap();
        assert!(get.starts_with("func GetArticle(id uuid.UUID, db DB) (*Article, error) {\n"));
        assert!(get.contains(
            "SELECT id, title, created_at, created_by, edited_at, version FROM articles WHERE id = $1"
        ));

        let delete = generator.delete_fn().unwrap().unwrap();
        assert!(delete.starts_with("func DeleteArticle(id uuid.UUID, db DB) error {\n"));
        assert!(delete.contains("\t\treturn pgx.ErrNoRows\n"));
    }

    #[test]
    fn test_config_timeout_and_db_type() {
        let config = Config {
            timeout_secs: 10,
            db_type: "Querier".to_string(),
            ..Config::default()
        };
        let out = Generator::new(&users(), &config).delete_fn().unwrap().unwrap();
        assert!(out.starts_with("func DeleteUser(id int64, db Querier) error {\n"));
        assert!(out.contains("time.Second*10)"));
    }

    #[test]
    fn test_sections_without_id() {
        let table = Table::new("logs")
            .column("message", "text", true)
            .column("level", "int", false);
        let sections = render(&table);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("type Log struct {"));
        assert!(sections[1].starts_with("func CreateLog("));
    }

    #[test]
    fn test_unknown_type_fails_whole_table() {
        let table = users().column("payload", "jsonb", false);
        let err = Generator::new(&table, &Config::default())
            .sections()
            .unwrap_err();
        match err {
            GenError::Table { table, source } => {
                assert_eq!(table, "users");
                assert!(matches!(*source, GenError::UnknownType { ref token } if token == "jsonb"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_to_go_separates_sections() {
        let out = users().to_go(&Config::default()).unwrap();
        assert!(out.contains("}\n\nfunc CreateUser("));
        assert!(out.contains("}\n\nfunc GetUser("));
        assert!(out.contains("}\n\nfunc UpdateUser("));
        assert!(out.contains("}\n\nfunc DeleteUser("));
        assert!(out.ends_with("}\n\n"));
    }
}
