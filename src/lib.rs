//! downsort - automatic downloads-folder sorting
//!
//! This library watches a single folder for new files and moves each into a
//! subfolder chosen by file-extension category (images, videos, documents,
//! music, applications, archives). It also provides a one-shot sweep for
//! files already present, TOML-configurable ignore rules, and a settling
//! delay that lets in-progress downloads finish before they are moved.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod output;
pub mod sorter;
pub mod watcher;

pub use config::{CompiledIgnores, ConfigError, SorterConfig};
pub use file_category::{Category, ExtensionMap};
pub use sorter::{DownloadSorter, SortError, SortOutcome, SortResult};
pub use watcher::{WatchError, WatchSession};

pub use cli::{Cli, Command, run};
