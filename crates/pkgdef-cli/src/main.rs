//! # pkgdef-cli
//!
//! Command-line checker for pkgdef registry files.
//!
//! Reads `.pkgdef`/`.pkgundef` files (or every such file under a directory),
//! runs the validator, and prints each rule violation with its location.

mod config;
mod errors;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use pkgdef::{Document, ErrorCode, ErrorReport, Severity, split_lines, variables};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, debug, info};

use config::Config;
use errors::ReportDisplay;

#[derive(Parser)]
#[command(name = "pkgdef")]
#[command(about = "Checker for pkgdef registry files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log what the checker is doing
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Validate pkgdef files or directories")]
    Check {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
        /// Fail on warnings as well as errors
        #[arg(long)]
        deny_warnings: bool,
        /// Rule codes to hide, comma separated (e.g. PL004,PL008)
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,
    },
    #[command(about = "List the predefined $Variables$")]
    Variables,
    #[command(about = "Describe a rule code")]
    Explain { code: String },
    #[command(about = "Write a default .pkgdefrc in the current directory")]
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("{} Failed to load config: {:#}", "⚠".yellow().bold(), e);
        Config::default()
    });

    let (deny_warnings, ignore) = match &cli.command {
        Commands::Check {
            deny_warnings,
            ignore,
            ..
        } => (*deny_warnings, ignore.clone()),
        _ => (false, Vec::new()),
    };
    config.merge_cli_args(cli.no_color, cli.verbose, deny_warnings, ignore);

    init_logging(config.verbose);
    if !config.colored {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Check { paths, .. } => check(&paths, &config),
        Commands::Variables => {
            list_variables();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Explain { code } => explain(&code),
        Commands::Init { force } => init_config(force),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Default)]
struct Totals {
    files: usize,
    errors: usize,
    warnings: usize,
    suggestions: usize,
}

fn check(paths: &[PathBuf], config: &Config) -> Result<ExitCode> {
    let files = collect_files(paths, config)?;
    let ignored = config.ignored_codes();
    let mut totals = Totals::default();

    for file in &files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!(
                    "{} Failed to read {}: {}",
                    "error:".red().bold(),
                    file.display(),
                    e
                );
                totals.errors += 1;
                continue;
            }
        };

        for report in check_source(&source, &ignored, config.show_suggestions) {
            match report.severity {
                Severity::Error => totals.errors += 1,
                Severity::Warning => totals.warnings += 1,
                Severity::Suggestion => totals.suggestions += 1,
            }
            ReportDisplay::new(&report)
                .with_file(file.display().to_string())
                .with_source(&source)
                .display();
        }
        totals.files += 1;
    }

    print_summary(&totals);

    let failed = totals.errors > 0 || (config.deny_warnings && totals.warnings > 0);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn check_source(source: &str, ignored: &HashSet<ErrorCode>, show_suggestions: bool) -> Vec<ErrorReport> {
    let document = Document::snapshot(split_lines(source));
    let parsed = document.current();
    debug!(
        items = parsed.items().len(),
        entries = parsed.entries().len(),
        valid = parsed.is_valid(),
        "checked document"
    );

    parsed
        .reports()
        .into_iter()
        .filter(|r| !ignored.contains(&r.code))
        .filter(|r| show_suggestions || r.severity != Severity::Suggestion)
        .collect()
}

fn print_summary(totals: &Totals) {
    let files = match totals.files {
        1 => "1 file".to_string(),
        n => format!("{} files", n),
    };

    if totals.errors + totals.warnings + totals.suggestions == 0 {
        println!("{} {} checked, no problems found", "✓".green().bold(), files);
        return;
    }

    println!(
        "{} checked: {} {}, {} {}, {} {}",
        files,
        totals.errors.to_string().red().bold(),
        if totals.errors == 1 { "error" } else { "errors" },
        totals.warnings.to_string().yellow().bold(),
        if totals.warnings == 1 { "warning" } else { "warnings" },
        totals.suggestions.to_string().cyan().bold(),
        if totals.suggestions == 1 { "suggestion" } else { "suggestions" },
    );
}

/// Expands directories into the pkgdef files below them.
fn collect_files(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let found = files_in_dir(path, config)?;
            info!("{} pkgdef files under {}", found.len(), path.display());
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }

    Ok(files)
}

fn files_in_dir(dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.display().to_string()));
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid search path {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file() && config.matches_extension(p))
        .collect();
    files.sort();
    Ok(files)
}

fn list_variables() {
    for variable in variables::all() {
        println!(
            "{:<30} {}",
            format!("${}$", variable.name).green().bold(),
            variable.description
        );
    }
}

fn explain(code: &str) -> Result<ExitCode> {
    let code: ErrorCode = code.parse()?;
    let descriptor = code.descriptor();

    println!("{} ({}, {})", code.to_string().bold(), descriptor.severity, descriptor.category);
    println!("  {}", descriptor.template);
    Ok(ExitCode::SUCCESS)
}

fn init_config(force: bool) -> Result<ExitCode> {
    let path = Path::new(".pkgdefrc");
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::create_default(path)?;
    println!("{} Created {}", "✓".green().bold(), path.display());
    Ok(ExitCode::SUCCESS)
}
