use std::path::Path;
use std::process::{Command, Output};

fn sql2godb(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sql2godb"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("SQL2GODB_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sql2godb")
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let out = sql2godb(dir.path(), &["--version"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        format!("sql2godb v{}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.sql"), include_str!("golden/schema.sql")).unwrap();

    let out = sql2godb(dir.path(), &["-i", "schema.sql", "-o", "models.go"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());

    let written = std::fs::read_to_string(dir.path().join("models.go")).unwrap();
    assert_eq!(written, include_str!("golden/schema.go"));
}

#[test]
fn test_local_config_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.sql"), include_str!("golden/schema.sql")).unwrap();
    std::fs::write(dir.path().join("sql2godb.toml"), "package = \"store\"\n").unwrap();

    let out = sql2godb(dir.path(), &["-i", "schema.sql"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("package store\n\n"));

    let out = sql2godb(dir.path(), &["-i", "schema.sql", "--package", "models"]);
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("package models\n\n"));
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = sql2godb(dir.path(), &["-i", "nope.sql"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Cannot open file nope.sql"));
}

#[test]
fn test_failed_run_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("schema.sql"),
        "CREATE TABLE docs (\n    body jsonb\n);\n",
    )
    .unwrap();

    let out = sql2godb(dir.path(), &["-i", "schema.sql", "-o", "models.go"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No conversion for type 'jsonb'"));
    assert!(!dir.path().join("models.go").exists());
}

#[test]
fn test_explain_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.sql"), include_str!("golden/schema.sql")).unwrap();

    let out = sql2godb(dir.path(), &["explain", "-i", "schema.sql", "--format", "json"]);
    assert!(out.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(reports.as_array().unwrap().len(), 3);
    assert_eq!(reports[0]["entity"], "User");
    assert_eq!(reports[2]["operations"], serde_json::json!(["CreateAuditLog"]));
    assert_eq!(reports[1]["columns"][0]["go_type"], "int64");
}
