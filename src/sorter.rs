/// Classify-and-move engine for the watched folder.
///
/// This module owns the side-effecting half of the sorter: bootstrapping the
/// six destination folders and moving a single file into the folder chosen by
/// its extension category. Each file is handled independently and
/// fire-and-forget; no state is retained across calls.
use crate::config::CompiledIgnores;
use crate::file_category::{Category, ExtensionMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// What happened to a single file handed to the sorter.
///
/// The original design swallowed every failure silently; here the non-move
/// cases are explicit so callers can log them, while remaining non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// The file was moved into its category folder.
    Moved {
        category: Category,
        destination: PathBuf,
    },
    /// The file no longer existed when the sorter got to it (transient temp
    /// artifact, renamed away, or already processed). No-op.
    SourceMissing,
    /// The extension is not in the table; the file is left in place.
    Unrecognized,
    /// The file matched an ignore rule; left in place.
    Ignored,
}

/// Errors that can occur while bootstrapping or moving files.
#[derive(Debug)]
pub enum SortError {
    /// The watched folder path does not exist or is not a directory.
    InvalidWatchFolder { path: PathBuf },
    /// Failed to create a destination folder.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file into its destination folder.
    FileMoveFailure {
        source_path: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for SortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWatchFolder { path } => {
                write!(f, "Invalid watch folder: {}", path.display())
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create destination folder {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for SortError {}

/// Result type for sorter operations.
pub type SortResult<T> = Result<T, SortError>;

/// Moves files into category folders under a single watched folder.
///
/// Owns the extension table, the settling delay, and the compiled ignore
/// rules. Safe to use from the watcher's worker thread; nothing here assumes
/// a particular calling context.
pub struct DownloadSorter {
    folder: PathBuf,
    map: ExtensionMap,
    settle_delay: Duration,
    ignores: CompiledIgnores,
}

impl DownloadSorter {
    /// Creates a sorter for `folder`.
    ///
    /// # Errors
    ///
    /// Returns `SortError::InvalidWatchFolder` if the path does not exist or
    /// is not a directory.
    pub fn new(
        folder: &Path,
        settle_delay: Duration,
        ignores: CompiledIgnores,
    ) -> SortResult<Self> {
        if !folder.is_dir() {
            return Err(SortError::InvalidWatchFolder {
                path: folder.to_path_buf(),
            });
        }
        Ok(Self {
            folder: folder.to_path_buf(),
            map: ExtensionMap::new(),
            settle_delay,
            ignores,
        })
    }

    /// The watched folder this sorter moves files within.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The destination folder for a category, as an immediate child of the
    /// watched folder.
    pub fn destination_for(&self, category: Category) -> PathBuf {
        self.folder.join(category.folder_name())
    }

    /// Creates all six destination folders if absent.
    ///
    /// Called once before any event is processed; folders are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `SortError::DirectoryCreationFailed` for the first folder that
    /// cannot be created.
    pub fn ensure_destination_folders(&self) -> SortResult<()> {
        for category in Category::ALL {
            let path = self.destination_for(category);
            fs::create_dir_all(&path).map_err(|e| SortError::DirectoryCreationFailed {
                path: path.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Classifies a path against the fixed extension table.
    pub fn classify(&self, path: &Path) -> Option<Category> {
        self.map.classify_path(path)
    }

    /// Sorts a single file: guard, settle, classify, move.
    ///
    /// Lifecycle of an event: the source is checked for existence (a no-op if
    /// it vanished), the settling delay lets an in-progress download finish
    /// writing, existence is re-checked, and the file is moved into its
    /// category folder with the filename preserved. Unrecognized extensions
    /// leave the file in place.
    ///
    /// # Errors
    ///
    /// Returns `SortError::FileMoveFailure` if the move itself fails for a
    /// reason other than the source disappearing. Callers treat this as
    /// non-fatal: log and continue.
    pub fn sort_file(&self, path: &Path) -> SortResult<SortOutcome> {
        if !path.exists() {
            return Ok(SortOutcome::SourceMissing);
        }
        if self.ignores.is_ignored(path) {
            return Ok(SortOutcome::Ignored);
        }

        // Let an in-progress download finish writing before touching it.
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        if !path.exists() {
            return Ok(SortOutcome::SourceMissing);
        }

        let Some(category) = self.classify(path) else {
            return Ok(SortOutcome::Unrecognized);
        };

        let Some(file_name) = path.file_name() else {
            return Ok(SortOutcome::Unrecognized);
        };
        let destination = self.destination_for(category).join(file_name);

        match fs::rename(path, &destination) {
            Ok(()) => Ok(SortOutcome::Moved {
                category,
                destination,
            }),
            // Disappeared mid-move: same no-op as the pre-move guard.
            Err(_) if !path.exists() => Ok(SortOutcome::SourceMissing),
            Err(e) => Err(SortError::FileMoveFailure {
                source_path: path.to_path_buf(),
                destination,
                source: e,
            }),
        }
    }
}
