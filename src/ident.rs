//! Identifier conversions between SQL and Go naming.
//!
//! Both functions are deliberately simple and keep the behavior existing
//! generated code depends on:
//!
//! - [`to_upper_camel`] folds every `Id` into `ID` after casing, so
//!   `identity` becomes `IDentity`.
//! - [`singularize`] only drops one trailing `s`, so `status` becomes `statu`.
//! - The singular table name is used as-is for the Go variable. Tables such
//!   as `dbs`, `ids` or `times` therefore clash with names the generated
//!   functions already use; [`clashes_with_generated_code`] detects this so
//!   the generator can warn.

/// Convert a `snake_case` identifier into a Go exported `PascalCase` name.
///
/// # Example
///
/// ```
/// use sql2godb::ident::to_upper_camel;
///
/// assert_eq!(to_upper_camel("user_id"), "UserID");
/// assert_eq!(to_upper_camel("created_at"), "CreatedAt");
/// ```
pub fn to_upper_camel(snake: &str) -> String {
    let pascal: String = snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect();

    pascal.replace("Id", "ID")
}

/// Turn a plural table name into its singular entity form.
///
/// ```
/// use sql2godb::ident::singularize;
///
/// assert_eq!(singularize("users"), "user");
/// ```
pub fn singularize(plural: &str) -> &str {
    plural.strip_suffix('s').unwrap_or(plural)
}

/// Go's reserved keywords.
pub const GO_KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Parameters, locals and packages referenced by the generated functions.
const GENERATED_NAMES: [&str; 13] = [
    "db",
    "id",
    "ctx",
    "cancel",
    "q",
    "err",
    "rows",
    "result",
    "rowsAffected",
    "context",
    "time",
    "pgx",
    "errors",
];

pub fn is_go_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// True if `name` cannot be used as the entity variable in generated code.
pub fn clashes_with_generated_code(name: &str) -> bool {
    is_go_keyword(name) || GENERATED_NAMES.contains(&name)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_camel() {
        assert_eq!(to_upper_camel("name"), "Name");
        assert_eq!(to_upper_camel("edited_at"), "EditedAt");
        assert_eq!(to_upper_camel("user_id"), "UserID");
        assert_eq!(to_upper_camel("id"), "ID");
    }

    #[test]
    fn test_upper_camel_folds_id_substrings() {
        assert_eq!(to_upper_camel("identity"), "IDentity");
        assert_eq!(to_upper_camel("paid_amount"), "PaIDAmount");
    }

    #[test]
    fn test_upper_camel_lowercases_tail() {
        assert_eq!(to_upper_camel("api_URL"), "ApiUrl");
    }

    #[test]
    fn test_upper_camel_skips_empty_segments() {
        assert_eq!(to_upper_camel("_first__name_"), "FirstName");
        assert_eq!(to_upper_camel(""), "");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("user_accounts"), "user_account");
        assert_eq!(singularize("status"), "statu");
        assert_eq!(singularize("data"), "data");
        assert_eq!(singularize("ss"), "s");
    }

    #[test]
    fn test_go_keywords() {
        assert!(is_go_keyword("func"));
        assert!(is_go_keyword("type"));
        assert!(!is_go_keyword("user"));
        assert!(!is_go_keyword("Func"));
    }

    #[test]
    fn test_clashes_with_generated_code() {
        for clash in ["db", "id", "time", "ctx", "err", "range", "select"] {
            assert!(clashes_with_generated_code(clash), "{}", clash);
        }
        assert!(!clashes_with_generated_code("user"));
        assert!(!clashes_with_generated_code("audit_log"));
    }
}
