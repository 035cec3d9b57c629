/// PNG listing for catalog directories.
///
/// Enumerates the immediate entries of a directory, keeps the ones whose name
/// ends in `.png` (in any letter case) and writes the names to a JSON file as
/// an array of strings.
use crate::output::OutputFormatter;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while listing PNG files.
#[derive(Debug)]
pub enum ListError {
    /// The source directory is missing or cannot be read.
    DirectoryReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The name list could not be serialized.
    SerializeFailed { source: serde_json::Error },
    /// The JSON output file could not be written.
    OutputWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryReadFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::SerializeFailed { source } => {
                write!(f, "Failed to serialize PNG list: {}", source)
            }
            Self::OutputWriteFailed { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ListError {}

/// Result type for listing operations.
pub type ListResult<T> = Result<T, ListError>;

/// Returns true if `name` ends with `.png`, ignoring letter case.
///
/// # Examples
///
/// ```
/// use pngtidy::png_lister::is_png_name;
///
/// assert!(is_png_name("item-1.png"));
/// assert!(is_png_name("COVER.PNG"));
/// assert!(!is_png_name("photo.jpg"));
/// ```
pub fn is_png_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".png")
}

/// Lists the PNG names among the immediate entries of `dir`.
///
/// Names are returned in the order the directory listing yields them; no
/// sorting is applied. Entries of every kind are considered, only the name
/// decides.
///
/// # Errors
///
/// Returns `ListError::DirectoryReadFailed` if `dir` is missing or unreadable,
/// or if an entry cannot be read.
pub fn list_png_files(dir: &Path) -> ListResult<Vec<String>> {
    let read_failed = |source| ListError::DirectoryReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_png_name(&name) {
            names.push(name);
        } else {
            log::debug!("skipping non-PNG entry {}", name);
        }
    }

    Ok(names)
}

/// Writes `names` as a JSON array of strings to `output_path`.
///
/// Any previous contents are replaced. The JSON text is built before the file
/// is opened, so a failure never leaves a partially written list behind.
pub fn write_png_list(names: &[String], output_path: &Path) -> ListResult<()> {
    let json = serde_json::to_string(names).map_err(|e| ListError::SerializeFailed { source: e })?;

    fs::write(output_path, json).map_err(|e| ListError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source: e,
    })
}

/// Lists the PNG files in `dir`, reports the count and saves the list.
///
/// Returns the names that were written.
pub fn run_lister(dir: &Path, output_path: &Path) -> ListResult<Vec<String>> {
    let names = list_png_files(dir)?;

    OutputFormatter::plain(&format!("Found {} PNG files.", names.len()));

    write_png_list(&names, output_path)?;
    log::info!(
        "wrote {} names from {} to {}",
        names.len(),
        dir.display(),
        output_path.display()
    );

    OutputFormatter::plain(&format!("Saved to {}", output_path.display()));
    Ok(names)
}
