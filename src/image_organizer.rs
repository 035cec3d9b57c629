/// Product image organization.
///
/// Moves the PNG files of a product line out of a shared source subdirectory
/// into the product's own subdirectory, prefixing each file name with the
/// product prefix unless it already carries it. The source subdirectory is
/// removed once it has been drained.
use crate::config::OrganizerSettings;
use crate::output::OutputFormatter;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during image organization.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create the destination directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to list the source directory.
    DirectoryReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a single file to its destination.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to remove the drained source directory.
    DirectoryRemovalFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DirectoryReadFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DirectoryRemovalFailed { path, source } => {
                write!(
                    f,
                    "Failed to remove directory {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for image organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A single planned or performed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// Path of the file in the source directory.
    pub original_path: PathBuf,
    /// Path of the file in the destination directory.
    pub new_path: PathBuf,
}

/// Summary of one organizer run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Moves that succeeded, or that would be made in a dry run.
    pub moved: Vec<Move>,
    /// Files that could not be moved, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// The source directory did not exist, nothing was done.
    pub source_missing: bool,
    /// The source directory was drained and removed.
    pub source_removed: bool,
}

impl OrganizeReport {
    /// Returns true if every eligible file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Returns true if `name` ends with `.png` in exactly that letter case.
///
/// Unlike [`crate::png_lister::is_png_name`], upper-case extensions do not match.
pub fn is_png_name_strict(name: &str) -> bool {
    name.ends_with(".png")
}

/// Computes the destination file name for `name`.
///
/// # Examples
///
/// ```
/// use pngtidy::image_organizer::destination_name;
///
/// assert_eq!(destination_name("item-1.png", "lalahs-"), "lalahs-item-1.png");
/// assert_eq!(destination_name("lalahs-item-1.png", "lalahs-"), "lalahs-item-1.png");
/// ```
pub fn destination_name(name: &str, prefix: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}

/// EXDEV on Linux and macOS.
const CROSS_DEVICE_OS_ERROR: i32 = 18;

/// Returns true if a rename failed because source and destination are on
/// different filesystems.
fn is_cross_device(error: &std::io::Error) -> bool {
    error.kind() == std::io::ErrorKind::CrossesDevices
        || error.raw_os_error() == Some(CROSS_DEVICE_OS_ERROR)
}

/// Copies `original_path` to `new_path` and then deletes the original.
///
/// A partially written copy is removed again if the copy fails.
fn copy_then_remove(original_path: &Path, new_path: &Path) -> std::io::Result<()> {
    if let Err(e) = fs::copy(original_path, new_path) {
        let _ = fs::remove_file(new_path);
        return Err(e);
    }
    fs::remove_file(original_path)
}

/// Moves prefixed product images from the source into the destination subdirectory.
pub struct ImageOrganizer<'a> {
    settings: &'a OrganizerSettings,
    dry_run: bool,
}

impl<'a> ImageOrganizer<'a> {
    pub fn new(settings: &'a OrganizerSettings, dry_run: bool) -> Self {
        Self { settings, dry_run }
    }

    /// Organizes the product images below `base_path`.
    ///
    /// The destination directory is created first if missing. A missing source
    /// directory is not an error: the report is returned with `source_missing`
    /// set. Individual move failures are logged and recorded in the report and
    /// the remaining files are still processed. In a dry run nothing on disk
    /// is changed.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::DirectoryCreationFailed` if the destination
    /// cannot be created and `OrganizeError::DirectoryReadFailed` if the source
    /// directory exists but cannot be listed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pngtidy::config::OrganizerSettings;
    /// use pngtidy::image_organizer::ImageOrganizer;
    /// use std::path::Path;
    ///
    /// let settings = OrganizerSettings::default();
    /// let report = ImageOrganizer::new(&settings, false)
    ///     .organize(Path::new("/srv/shop/public/products"))
    ///     .expect("organization failed");
    /// println!("Moved {} files", report.moved.len());
    /// ```
    pub fn organize(&self, base_path: &Path) -> OrganizeResult<OrganizeReport> {
        let source_dir = base_path.join(&self.settings.source_dir);
        let destination_dir = base_path.join(&self.settings.destination_dir);
        let mut report = OrganizeReport::default();

        if !self.dry_run && !destination_dir.exists() {
            fs::create_dir_all(&destination_dir).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: destination_dir.clone(),
                    source: e,
                }
            })?;
            log::debug!("created {}", destination_dir.display());
        }

        if !source_dir.exists() {
            log::debug!("{} does not exist, nothing to move", source_dir.display());
            report.source_missing = true;
            return Ok(report);
        }

        OutputFormatter::plain(&format!("Checking {} for images...", source_dir.display()));
        let names = Self::png_names(&source_dir)?;

        let pb = OutputFormatter::create_progress_bar(names.len() as u64);
        for name in &names {
            let original_path = source_dir.join(name);
            let new_path = destination_dir.join(destination_name(name, &self.settings.prefix));
            log::debug!("{} -> {}", original_path.display(), new_path.display());

            if self.dry_run {
                pb.suspend(|| {
                    OutputFormatter::dry_run_notice(&format!(
                        "Would move {} to {}",
                        name,
                        new_path.display()
                    ))
                });
                report.moved.push(Move {
                    original_path,
                    new_path,
                });
                pb.inc(1);
                continue;
            }

            match Self::move_file(&original_path, &new_path) {
                Ok(()) => {
                    OutputFormatter::plain_above(
                        &pb,
                        &format!("Moved {} to {}", name, new_path.display()),
                    );
                    report.moved.push(Move {
                        original_path,
                        new_path,
                    });
                }
                Err(e) => {
                    OutputFormatter::plain_above(&pb, &format!("Error moving {}: {}", name, e));
                    log::debug!("{}", e);
                    report.failed.push((original_path, e.to_string()));
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        if !self.dry_run {
            report.source_removed = self.remove_if_drained(&source_dir);
        }

        Ok(report)
    }

    /// Lists the names in `dir` that qualify for a move.
    fn png_names(dir: &Path) -> OrganizeResult<Vec<String>> {
        let read_failed = |source| OrganizeError::DirectoryReadFailed {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_failed)? {
            let entry = entry.map_err(read_failed)?;
            match entry.file_name().into_string() {
                Ok(name) if is_png_name_strict(&name) => names.push(name),
                Ok(name) => log::debug!("skipping {}", name),
                Err(raw) => log::debug!("skipping non UTF-8 name {:?}", raw),
            }
        }
        Ok(names)
    }

    /// Renames the file, falling back to copy and delete when the two paths
    /// live on different filesystems.
    fn move_file(original_path: &Path, new_path: &Path) -> OrganizeResult<()> {
        let move_failed = |e| OrganizeError::FileMoveFailure {
            source: original_path.to_path_buf(),
            destination: new_path.to_path_buf(),
            source_error: e,
        };

        match fs::rename(original_path, new_path) {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => {
                log::debug!(
                    "{} is on another filesystem, copying instead",
                    new_path.display()
                );
                copy_then_remove(original_path, new_path).map_err(move_failed)
            }
            Err(e) => Err(move_failed(e)),
        }
    }

    /// Removes `source_dir` if it has no entries left. Returns whether it was removed.
    fn remove_if_drained(&self, source_dir: &Path) -> bool {
        let is_empty = match fs::read_dir(source_dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) => {
                log::warn!("could not re-read {}: {}", source_dir.display(), e);
                false
            }
        };
        if !is_empty {
            return false;
        }

        match fs::remove_dir(source_dir) {
            Ok(()) => {
                OutputFormatter::plain(&format!(
                    "Removed empty '{}' directory.",
                    self.settings.source_dir
                ));
                true
            }
            Err(e) => {
                let err = OrganizeError::DirectoryRemovalFailed {
                    path: source_dir.to_path_buf(),
                    source: e,
                };
                OutputFormatter::warning(&err.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_destination_name_adds_prefix() {
        assert_eq!(destination_name("a.png", "lalahs-"), "lalahs-a.png");
    }

    #[test]
    fn test_destination_name_keeps_existing_prefix() {
        assert_eq!(destination_name("lalahs-b.png", "lalahs-"), "lalahs-b.png");
    }

    #[test]
    fn test_destination_name_prefix_is_case_sensitive() {
        assert_eq!(destination_name("Lalahs-c.png", "lalahs-"), "lalahs-Lalahs-c.png");
    }

    #[test]
    fn test_is_png_name_strict() {
        assert!(is_png_name_strict("a.png"));
        assert!(!is_png_name_strict("A.PNG"));
        assert!(!is_png_name_strict("a.Png"));
        assert!(!is_png_name_strict("notes.txt"));
    }

    #[test]
    fn test_organize_creates_destination_without_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let settings = OrganizerSettings::default();

        let report = ImageOrganizer::new(&settings, false)
            .organize(temp_dir.path())
            .expect("organize should succeed");

        assert!(report.source_missing);
        assert!(report.moved.is_empty());
        assert!(temp_dir.path().join("lalahs").is_dir());
    }

    #[test]
    fn test_organize_leaves_uppercase_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("other");
        fs::create_dir(&source).expect("Failed to create source directory");
        fs::write(source.join("SHOUT.PNG"), b"").expect("Failed to write test file");

        let settings = OrganizerSettings::default();
        let report = ImageOrganizer::new(&settings, false)
            .organize(temp_dir.path())
            .expect("organize should succeed");

        assert!(report.moved.is_empty());
        assert!(!report.source_removed);
        assert!(source.join("SHOUT.PNG").exists());
    }

    #[test]
    fn test_move_failure_is_recorded_and_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("other");
        let destination = temp_dir.path().join("lalahs");
        fs::create_dir(&source).expect("Failed to create source directory");
        fs::create_dir(&destination).expect("Failed to create destination directory");

        fs::write(source.join("a.png"), b"a").expect("Failed to write test file");
        fs::write(source.join("b.png"), b"b").expect("Failed to write test file");
        // A non-empty directory in the way makes the rename of a.png fail.
        let blocker = destination.join("lalahs-a.png");
        fs::create_dir(&blocker).expect("Failed to create blocker");
        fs::write(blocker.join("keep"), b"").expect("Failed to write blocker file");

        let settings = OrganizerSettings::default();
        let report = ImageOrganizer::new(&settings, false)
            .organize(temp_dir.path())
            .expect("organize should succeed despite a failed move");

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, source.join("a.png"));
        assert!(!report.is_complete_success());
        assert_eq!(report.moved.len(), 1);
        assert!(destination.join("lalahs-b.png").is_file());
        assert!(source.join("a.png").is_file());
        assert!(!report.source_removed);
    }

    #[test]
    fn test_cross_device_error_is_recognized() {
        let exdev = std::io::Error::from_raw_os_error(CROSS_DEVICE_OS_ERROR);
        assert!(is_cross_device(&exdev));

        let kind_only = std::io::Error::new(std::io::ErrorKind::CrossesDevices, "other fs");
        assert!(is_cross_device(&kind_only));

        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!is_cross_device(&not_found));
    }

    #[test]
    fn test_copy_then_remove_moves_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let original = temp_dir.path().join("x.png");
        let target = temp_dir.path().join("lalahs-x.png");
        fs::write(&original, b"pixels").expect("Failed to write test file");

        copy_then_remove(&original, &target).expect("copy fallback should succeed");

        assert!(!original.exists());
        assert_eq!(fs::read(&target).expect("Failed to read target"), b"pixels");
    }

    #[test]
    fn test_copy_then_remove_missing_source_leaves_no_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let original = temp_dir.path().join("gone.png");
        let target = temp_dir.path().join("lalahs-gone.png");

        assert!(copy_then_remove(&original, &target).is_err());
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("other");
        fs::create_dir(&source).expect("Failed to create source directory");
        let raw_name = OsStr::from_bytes(b"bad-\xff.png");
        fs::write(source.join(raw_name), b"").expect("Failed to write test file");
        fs::write(source.join("good.png"), b"").expect("Failed to write test file");

        let settings = OrganizerSettings::default();
        let report = ImageOrganizer::new(&settings, false)
            .organize(temp_dir.path())
            .expect("organize should succeed");

        assert_eq!(report.moved.len(), 1);
        assert!(report.failed.is_empty());
        assert!(source.join(raw_name).exists());
        assert!(temp_dir.path().join("lalahs").join("lalahs-good.png").exists());
        assert!(!report.source_removed);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("other");
        fs::create_dir(&source).expect("Failed to create source directory");
        fs::write(source.join("x.png"), b"").expect("Failed to write test file");

        let settings = OrganizerSettings::default();
        let report = ImageOrganizer::new(&settings, true)
            .organize(temp_dir.path())
            .expect("dry run should succeed");

        assert_eq!(
            report.moved,
            vec![Move {
                original_path: source.join("x.png"),
                new_path: temp_dir.path().join("lalahs").join("lalahs-x.png"),
            }]
        );
        assert!(source.join("x.png").exists());
        assert!(!temp_dir.path().join("lalahs").exists());
        assert!(!report.source_removed);
    }
}
