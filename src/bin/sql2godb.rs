//! sql2godb, the SQL to Go code generator CLI
//!
//! Reads `CREATE TABLE` statements and writes a Go data-access layer.
//!
//! # Usage
//!
//! ```bash
//! # stdin to stdout
//! sql2godb < schema.sql > models.go
//!
//! # named files
//! sql2godb -i schema.sql -o data/models.go
//!
//! # inspect the parsed tables
//! sql2godb explain -i schema.sql --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sql2godb::driver::{self, TableReport};
use sql2godb::prelude::*;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(name = "sql2godb")]
#[command(version = VERSION)]
#[command(about = "SQL to Go code generator", long_about = None)]
#[command(after_help = "If no input or output file is specified, stdin and stdout will be used.

EXAMPLES:
    sql2godb -i schema.sql -o data/models.go
    cat schema.sql | sql2godb --package store --timeout 5
    sql2godb explain -i schema.sql --format json")]
struct Cli {
    /// Input file path
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to ./sql2godb.toml, then the user config dir)
    #[arg(short, long, env = "SQL2GODB_CONFIG")]
    config: Option<PathBuf>,

    /// Go package name of the generated file
    #[arg(short, long)]
    package: Option<String>,

    /// Timeout of each generated database call, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed tables and which functions they get
    Explain {
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "sql2godb=warn",
        1 => "sql2godb=info",
        _ => "sql2godb=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let input = read_input(cli.input.as_deref())?;

    match &cli.command {
        Some(Commands::Explain { format }) => explain_tables(&input, format),
        None => {
            let config = load_config(cli)?;
            let code = sql2godb::generate(&input, &config)?;
            write_output(cli.output.as_deref(), &code)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(package) = &cli.package {
        config.package = package.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config.validate()?;

    tracing::debug!(?config, "effective config");
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open file {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Cannot read standard input")?;
            Ok(input)
        }
    }
}

fn write_output(path: Option<&Path>, code: &str) -> Result<()> {
    match path {
        Some(path) => {
            driver::write_atomically(path, code)
                .with_context(|| format!("Cannot write file {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = code.len(), "wrote generated code");
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(code.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Cannot write standard output")
        }
    }
}

fn explain_tables(input: &str, format: &OutputFormat) -> Result<()> {
    let reports = driver::explain(input)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Pretty => {
            if reports.is_empty() {
                println!("{}", "(no tables)".dimmed());
            }
            for report in &reports {
                print_report(report);
            }
        }
    }
    Ok(())
}

fn print_report(report: &TableReport) {
    println!(
        "{} {} {} {}",
        "Table:".green().bold(),
        report.table.white(),
        "→".dimmed(),
        report.entity.cyan()
    );

    let width = report
        .columns
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    for col in &report.columns {
        let go_type = match col.go_type {
            Some(ty) => ty.render(!col.not_null).yellow(),
            None => "unsupported".red().bold(),
        };
        println!(
            "  {}  {} {} {}",
            format!("{:width$}", col.name, width = width).white(),
            format!("{:14}", col.sql_type).dimmed(),
            "→".dimmed(),
            go_type
        );
    }

    println!("  {} {}", "Functions:".dimmed(), report.operations.join(", "));
    println!();
}
