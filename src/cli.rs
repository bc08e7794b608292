//! Command-line interface module for downsort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing and validation
//! - The long-running watch session
//! - The one-shot sort sweep and its dry-run twin

use crate::config::{CompiledIgnores, SorterConfig};
use crate::output::OutputFormatter;
use crate::sorter::{DownloadSorter, SortOutcome};
use crate::watcher::WatchSession;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Watch a downloads folder and sort incoming files into category subfolders.
#[derive(Debug, Parser)]
#[command(name = "downsort", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// The commands downsort can execute.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch a folder and sort new files as they arrive.
    Watch {
        /// Folder to watch. Defaults to $HOME/Downloads.
        folder: Option<PathBuf>,

        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Sort the files already present in a folder, once.
    Sort {
        /// Folder to sort. Defaults to $HOME/Downloads.
        folder: Option<PathBuf>,

        /// Show what would be moved without touching anything.
        #[arg(long)]
        dry_run: bool,

        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Runs the parsed CLI command.
///
/// This is the main entry point for CLI operations.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use downsort::cli::{Cli, run};
///
/// let cli = Cli::parse_from(["downsort", "sort", "/tmp/downloads", "--dry-run"]);
/// if let Err(e) = run(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Watch { folder, config } => {
            let folder = resolve_folder(folder)?;
            let config = load_config(config.as_deref())?;
            run_watch(&folder, config)
        }
        Command::Sort {
            folder,
            dry_run,
            config,
        } => {
            let folder = resolve_folder(folder)?;
            let config = load_config(config.as_deref())?;
            if dry_run {
                sort_folder_dry_run(&folder, &config)
            } else {
                sort_folder(&folder, &config)
            }
        }
    }
}

/// Resolves the target folder, defaulting to `$HOME/Downloads`.
fn resolve_folder(folder: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(folder) = folder {
        return Ok(folder);
    }
    let home = std::env::var("HOME")
        .map_err(|_| "No folder given and $HOME is not set".to_string())?;
    Ok(PathBuf::from(home).join("Downloads"))
}

fn load_config(config_path: Option<&Path>) -> Result<SorterConfig, String> {
    SorterConfig::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))
}

/// Starts a watch session and blocks until interrupted.
fn run_watch(folder: &Path, config: SorterConfig) -> Result<(), String> {
    let mut session = WatchSession::new(folder, config);

    session.start().map_err(|e| e.to_string())?;

    OutputFormatter::notice(
        "Download Sorter Started",
        &format!("Now monitoring {}", folder.display()),
    );
    OutputFormatter::info("Press Ctrl-C to stop.");

    // Blocks until the watcher goes away; Ctrl-C terminates the process.
    session.wait();

    OutputFormatter::notice(
        "Download Sorter Stopped",
        &format!("No longer monitoring {}", folder.display()),
    );
    Ok(())
}

/// Lists the sortable files of a folder: non-directories that pass the
/// ignore rules.
fn collect_files(folder: &Path, ignores: &CompiledIgnores) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(folder)
        .map_err(|e| format!("Error reading directory {}: {}", folder.display(), e))?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            let path = entry.path();
            if !ignores.is_ignored(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Sorts every file currently in the folder into its category subfolder.
///
/// The sweep uses a zero settling delay: files already present are not
/// in-progress downloads.
pub fn sort_folder(folder: &Path, config: &SorterConfig) -> Result<(), String> {
    OutputFormatter::info(&format!("Sorting contents of: {}", folder.display()));

    let ignores = config
        .compile_ignores()
        .map_err(|e| format!("Error compiling ignore rules: {}", e))?;
    let files = collect_files(folder, &ignores)?;
    let sorter =
        DownloadSorter::new(folder, Duration::ZERO, ignores).map_err(|e| e.to_string())?;
    sorter
        .ensure_destination_folders()
        .map_err(|e| e.to_string())?;

    if files.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(files.len() as u64);
    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut moved = 0usize;
    let mut left_in_place = 0usize;

    for path in &files {
        match sorter.sort_file(path) {
            Ok(SortOutcome::Moved { category, .. }) => {
                *category_counts
                    .entry(category.folder_name().to_string())
                    .or_insert(0) += 1;
                moved += 1;
            }
            Ok(_) => left_in_place += 1,
            Err(e) => {
                pb.suspend(|| OutputFormatter::error(&e.to_string()));
                left_in_place += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    OutputFormatter::summary_table(&category_counts, moved);
    if left_in_place > 0 {
        OutputFormatter::plain(&format!("Left in place: {}", left_in_place));
    }
    OutputFormatter::success("Sort complete!");
    Ok(())
}

/// Simulates the sweep without making any changes: no folders are created and
/// no files are moved.
pub fn sort_folder_dry_run(folder: &Path, config: &SorterConfig) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", folder.display()));

    if !folder.is_dir() {
        return Err(format!("Invalid folder: {}", folder.display()));
    }

    let ignores = config
        .compile_ignores()
        .map_err(|e| format!("Error compiling ignore rules: {}", e))?;
    let files = collect_files(folder, &ignores)?;
    if files.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return Ok(());
    }

    let sorter =
        DownloadSorter::new(folder, Duration::ZERO, ignores).map_err(|e| e.to_string())?;

    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut would_move = 0usize;

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match sorter.classify(path) {
            Some(category) => {
                OutputFormatter::plain(&format!(
                    " - {} → would move to {}/",
                    name,
                    category.folder_name()
                ));
                *category_counts
                    .entry(category.folder_name().to_string())
                    .or_insert(0) += 1;
                would_move += 1;
            }
            None => {
                OutputFormatter::plain(&format!(" - {} → left in place", name));
            }
        }
    }

    OutputFormatter::summary_table(&category_counts, would_move);
    OutputFormatter::success("Dry run complete. No files were modified.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_watch_with_folder() {
        let cli = Cli::parse_from(["downsort", "watch", "/tmp/dl"]);
        match cli.command {
            Command::Watch { folder, config } => {
                assert_eq!(folder, Some(PathBuf::from("/tmp/dl")));
                assert!(config.is_none());
            }
            _ => panic!("expected watch command"),
        }
    }

    #[test]
    fn test_parse_sort_dry_run() {
        let cli = Cli::parse_from(["downsort", "sort", "/tmp/dl", "--dry-run"]);
        match cli.command {
            Command::Sort {
                folder, dry_run, ..
            } => {
                assert_eq!(folder, Some(PathBuf::from("/tmp/dl")));
                assert!(dry_run);
            }
            _ => panic!("expected sort command"),
        }
    }

    #[test]
    fn test_resolve_folder_explicit_wins() {
        let folder = resolve_folder(Some(PathBuf::from("/data/incoming"))).unwrap();
        assert_eq!(folder, PathBuf::from("/data/incoming"));
    }

    #[test]
    fn test_resolve_folder_defaults_to_downloads() {
        if let Ok(home) = std::env::var("HOME") {
            let folder = resolve_folder(None).unwrap();
            assert_eq!(folder, PathBuf::from(home).join("Downloads"));
        }
    }
}
