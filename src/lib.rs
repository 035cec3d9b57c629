//! pngtidy - PNG catalog listing and product image organization
//!
//! This library provides two independent utilities: a lister that writes the
//! names of the PNG files in a directory to a JSON file, and an organizer that
//! moves product images into a prefixed subdirectory and cleans up the drained
//! source directory.

pub mod cli;
pub mod config;
pub mod image_organizer;
pub mod output;
pub mod png_lister;

pub use config::{ConfigError, ListerSettings, OrganizerSettings, ToolConfig};
pub use image_organizer::{ImageOrganizer, OrganizeError, OrganizeReport, destination_name};
pub use png_lister::{ListError, is_png_name, list_png_files, run_lister, write_png_list};

pub use cli::{Cli, Command, run, run_cli_with_config};
