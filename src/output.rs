//! Output formatting and styling module.
//!
//! Every user-facing line printed by the lister and the organizer goes
//! through [`OutputFormatter`], so styling can be changed in one place.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// - Plain messages, the literal lines other tools may parse
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Dry-run notices (yellow)
/// - Progress bars for file moves
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a regular message without styling.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pngtidy::output::OutputFormatter;
    /// OutputFormatter::plain("Saved to png_list.json");
    /// ```
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for moving `total` files.
    ///
    /// The bar draws to stderr and stays hidden when stderr is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        // The template is a literal; fall back to the default style if it is ever rejected.
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints an unstyled line above a running progress bar.
    pub fn plain_above(pb: &ProgressBar, message: &str) {
        pb.suspend(|| Self::plain(message));
    }
}
