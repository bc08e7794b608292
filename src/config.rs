//! Watch-session configuration and ignore rules.
//!
//! Configuration is loaded from TOML and controls the settling delay plus the
//! rules for files the sorter should never touch:
//! - Exact filename matching
//! - File extension matching
//! - Glob pattern matching
//! - Regex pattern matching
//!
//! # Configuration File Format
//!
//! ```toml
//! [watch]
//! settle_delay_secs = 1
//!
//! [watch.ignore]
//! filenames = [".DS_Store"]
//! extensions = ["crdownload", "part", "partial", "download"]
//! patterns = ["*.tmp"]
//! regex = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level sorter configuration, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub watch: WatchRules,
}

/// Watch-session tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRules {
    /// Seconds to wait after an event before moving the file, letting
    /// in-progress downloads finish writing. Defaults to 1.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Rules for files the sorter must leave untouched.
    #[serde(default)]
    pub ignore: IgnoreRules,
}

fn default_settle_delay_secs() -> u64 {
    1
}

impl Default for WatchRules {
    fn default() -> Self {
        Self {
            settle_delay_secs: default_settle_delay_secs(),
            ignore: IgnoreRules::default(),
        }
    }
}

/// Rules for excluding files from sorting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreRules {
    /// Exact filenames to ignore (e.g., ".DS_Store").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// File extensions to ignore. Defaults to in-progress browser download
    /// suffixes; those extensions are unknown to the classifier anyway, so
    /// the defaults never change which files get moved.
    #[serde(default = "default_ignore_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns to ignore (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the filename (for advanced users).
    #[serde(default)]
    pub regex: Vec<String>,
}

fn default_ignore_extensions() -> Vec<String> {
    ["crdownload", "part", "partial", "download"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            filenames: Vec::new(),
            extensions: default_ignore_extensions(),
            patterns: Vec::new(),
            regex: Vec::new(),
        }
    }
}

impl SorterConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.downsortrc.toml` in the current directory
    /// 3. Look for `~/.config/downsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".downsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("downsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// The settling delay as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.watch.settle_delay_secs)
    }

    /// Compile the ignore rules into optimized matching structures.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn compile_ignores(&self) -> Result<CompiledIgnores, ConfigError> {
        CompiledIgnores::new(&self.watch.ignore)
    }
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            watch: WatchRules::default(),
        }
    }
}

/// Pre-compiled ignore rules for efficient per-file matching.
///
/// Glob and regex patterns are validated and compiled once so that matching
/// does not reparse patterns on each event.
#[derive(Debug, Clone)]
pub struct CompiledIgnores {
    filenames: HashSet<String>,
    extensions: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledIgnores {
    fn new(rules: &IgnoreRules) -> Result<Self, ConfigError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            filenames: rules.filenames.iter().cloned().collect(),
            extensions: rules
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            patterns,
            regexes,
        })
    }

    /// Check if a file must be left untouched by the sorter.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Exact filename match
    /// 2. File extension match (case-insensitive)
    /// 3. Glob pattern match
    /// 4. Regex pattern match on the filename
    pub fn is_ignored(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.filenames.contains(file_name.as_ref()) {
            return true;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.extensions.contains(&ext_lower) {
                return true;
            }
        }

        if self
            .patterns
            .iter()
            .any(|pattern| pattern.matches(file_name.as_ref()))
        {
            return true;
        }

        self.regexes
            .iter()
            .any(|regex| regex.is_match(file_name.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settle_delay_is_one_second() {
        let config = SorterConfig::default();
        assert_eq!(config.settle_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_default_ignores_browser_partials() {
        let config = SorterConfig::default();
        let ignores = config.compile_ignores().unwrap();

        assert!(ignores.is_ignored(Path::new("movie.mp4.crdownload")));
        assert!(ignores.is_ignored(Path::new("album.zip.part")));
        assert!(ignores.is_ignored(Path::new("setup.exe.download")));
        assert!(!ignores.is_ignored(Path::new("movie.mp4")));
    }

    #[test]
    fn test_default_does_not_ignore_hidden_files() {
        // Hidden files are classified like any other file; only explicit
        // rules exclude them.
        let config = SorterConfig::default();
        let ignores = config.compile_ignores().unwrap();

        assert!(!ignores.is_ignored(Path::new(".hidden.png")));
    }

    #[test]
    fn test_ignore_exact_filename() {
        let config = SorterConfig {
            watch: WatchRules {
                ignore: IgnoreRules {
                    filenames: vec![".DS_Store".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        let ignores = config.compile_ignores().unwrap();

        assert!(ignores.is_ignored(Path::new(".DS_Store")));
        assert!(!ignores.is_ignored(Path::new("image.jpg")));
    }

    #[test]
    fn test_ignore_extensions_case_insensitive() {
        let config = SorterConfig {
            watch: WatchRules {
                ignore: IgnoreRules {
                    extensions: vec!["tmp".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        let ignores = config.compile_ignores().unwrap();

        assert!(ignores.is_ignored(Path::new("file.tmp")));
        assert!(ignores.is_ignored(Path::new("file.TMP")));
        assert!(!ignores.is_ignored(Path::new("file.txt")));
    }

    #[test]
    fn test_ignore_glob_patterns() {
        let config = SorterConfig {
            watch: WatchRules {
                ignore: IgnoreRules {
                    patterns: vec!["~$*".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        let ignores = config.compile_ignores().unwrap();

        assert!(ignores.is_ignored(Path::new("~$report.docx")));
        assert!(!ignores.is_ignored(Path::new("report.docx")));
    }

    #[test]
    fn test_ignore_regex() {
        let config = SorterConfig {
            watch: WatchRules {
                ignore: IgnoreRules {
                    regex: vec![r"^unconfirmed.*".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        let ignores = config.compile_ignores().unwrap();

        assert!(ignores.is_ignored(Path::new("unconfirmed 12345.zip")));
        assert!(!ignores.is_ignored(Path::new("confirmed.zip")));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let config = SorterConfig {
            watch: WatchRules {
                ignore: IgnoreRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };

        assert!(config.compile_ignores().is_err());
    }

    #[test]
    fn test_invalid_glob_returns_error() {
        let config = SorterConfig {
            watch: WatchRules {
                ignore: IgnoreRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };

        assert!(config.compile_ignores().is_err());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_src = r#"
            [watch]
            settle_delay_secs = 3

            [watch.ignore]
            filenames = ["Thumbs.db"]
            extensions = ["bak"]
            patterns = ["*.swp"]
            regex = []
        "#;

        let config: SorterConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.settle_delay(), Duration::from_secs(3));
        assert_eq!(config.watch.ignore.filenames, vec!["Thumbs.db"]);
        assert_eq!(config.watch.ignore.extensions, vec!["bak"]);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: SorterConfig = toml::from_str("").unwrap();
        assert_eq!(config.watch.settle_delay_secs, 1);
        assert!(
            config
                .watch
                .ignore
                .extensions
                .contains(&"crdownload".to_string())
        );
    }

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let result = SorterConfig::load(Some(Path::new("/no/such/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}
