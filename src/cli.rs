//! Command-line interface module for pngtidy.
//!
//! Parses arguments with `clap`, loads the configuration and dispatches to
//! the lister or the organizer.

use crate::config::ToolConfig;
use crate::image_organizer::ImageOrganizer;
use crate::output::OutputFormatter;
use crate::png_lister::run_lister;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Environment variable naming the catalog directory for `list`.
pub const CATALOG_DIR_ENV: &str = "PNGTIDY_CATALOG_DIR";
/// Environment variable naming the products directory for `organize`.
pub const PRODUCTS_DIR_ENV: &str = "PNGTIDY_PRODUCTS_DIR";

#[derive(Debug, Parser)]
#[command(name = "pngtidy", version)]
#[command(about = "List catalog PNG files and organize product images")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write the names of the PNG files in a directory to a JSON file
    List {
        /// Directory to scan
        #[arg(env = CATALOG_DIR_ENV)]
        dir: PathBuf,

        /// Output file (defaults to png_list.json in the working directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Move PNG files from the source into the product subdirectory
    Organize {
        /// Directory holding the source and destination subdirectories
        #[arg(env = PRODUCTS_DIR_ENV)]
        base_dir: PathBuf,

        /// Show what would be moved without touching any file
        #[arg(long)]
        dry_run: bool,
    },
}

/// Runs the parsed command line.
pub fn run(cli: Cli) -> Result<(), String> {
    run_cli_with_config(cli.command, cli.config.as_deref())
}

/// Runs a command with an optional configuration file.
///
/// # Examples
///
/// ```no_run
/// use pngtidy::cli::{Command, run_cli_with_config};
/// use std::path::PathBuf;
///
/// let command = Command::List {
///     dir: PathBuf::from("/home/user/Downloads/catalog"),
///     output: None,
/// };
/// if let Err(e) = run_cli_with_config(command, None) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli_with_config(command: Command, config_path: Option<&Path>) -> Result<(), String> {
    let config = ToolConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    match command {
        Command::List { dir, output } => {
            let output = output.unwrap_or(config.lister.output_file);
            run_lister(&dir, &output).map_err(|e| e.to_string())?;
            Ok(())
        }
        Command::Organize { base_dir, dry_run } => {
            organize_products(&base_dir, &config, dry_run)
        }
    }
}

/// Runs the organizer and prints the closing summary.
///
/// Individual move failures are reported but do not fail the command.
fn organize_products(base_dir: &Path, config: &ToolConfig, dry_run: bool) -> Result<(), String> {
    let settings = &config.organizer;
    if dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing {}", base_dir.display()));
    }

    let report = ImageOrganizer::new(settings, dry_run)
        .organize(base_dir)
        .map_err(|e| e.to_string())?;

    if !report.is_complete_success() {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be moved. Please review errors above.",
            report.failed.len()
        ));
    }

    if dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "{} file(s) would be moved. No files were modified.",
            report.moved.len()
        ));
    } else {
        OutputFormatter::plain(&format!(
            "Reorganization of {}'s items complete.",
            settings.product_name()
        ));
    }

    Ok(())
}
