//! Configuration for scanning filters and category overrides.
//!
//! Configuration is read from TOML. It controls two things:
//! - which entries of the target directory the scanner hands on
//!   (hidden files, exact names, extensions, globs, regexes, include overrides)
//! - how the default extension table is extended or replaced
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [categories]
//! replace_defaults = false
//! other_folder = "Other"
//!
//! [[categories.custom]]
//! label = "Ebooks"
//! folder = "ebooks"
//! extensions = ["epub", "mobi"]
//! ```

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".dirsortrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// A category folder name that is not a single plain path component.
    #[error("Invalid category '{label}': {reason}")]
    InvalidCategory { label: String, reason: String },

    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub filters: FilterRules,

    #[serde(default)]
    pub categories: CategoryRules,
}

/// Rules deciding which directory entries are organized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterRules {
    /// Whether dot-prefixed files are organized. Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Include rules win over every exclude rule, the hidden rule included.
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the leading dot, case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Overrides for the extension table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRules {
    /// Drop the built-in categories and use only `custom`.
    #[serde(default)]
    pub replace_defaults: bool,

    /// Folder name for the catch-all category.
    #[serde(default)]
    pub other_folder: Option<String>,

    /// Custom categories, checked before the built-in ones in the given order.
    #[serde(default)]
    pub custom: Vec<CustomCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomCategory {
    pub label: String,
    /// Folder name; defaults to the label.
    #[serde(default)]
    pub folder: Option<String>,
    pub extensions: Vec<String>,
}

impl OrganizerConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given
    /// 2. `.dirsortrc.toml` in the current directory
    /// 3. `~/.config/dirsort/config.toml`
    /// 4. built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing or unreadable,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml(&content)
    }

    /// Parse a configuration document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Compile the filter section into matchers.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

/// Pre-compiled filter rules, matched against bare file names.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
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
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Check whether a file with this name should be organized.
    ///
    /// Checks run in order and stop at the first decision:
    /// 1. include patterns: always include
    /// 2. hidden files, unless enabled: exclude
    /// 3. exact filename: exclude
    /// 4. extension: exclude
    /// 5. glob pattern: exclude
    /// 6. regex: exclude
    /// 7. otherwise include
    pub fn should_include(&self, file_name: &str) -> bool {
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if let Some(ext) = Path::new(file_name).extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(rules: FilterRules) -> CompiledFilters {
        OrganizerConfig {
            filters: rules,
            ..Default::default()
        }
        .compile_filters()
        .unwrap()
    }

    #[test]
    fn test_default_config_hides_hidden_files() {
        let compiled = CompiledFilters::default();
        assert!(!compiled.should_include(".DS_Store"));
        assert!(!compiled.should_include(".gitignore"));
        assert!(compiled.should_include("photo.jpg"));
    }

    #[test]
    fn test_hidden_file_included_when_enabled() {
        let compiled = filters(FilterRules {
            enable_hidden_files: true,
            ..Default::default()
        });
        assert!(compiled.should_include(".DS_Store"));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters(FilterRules {
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include("Thumbs.db"));
        assert!(compiled.should_include("image.jpg"));
    }

    #[test]
    fn test_exclude_extensions_case_insensitive() {
        let compiled = filters(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["bak".to_string(), ".tmp".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include("file.bak"));
        assert!(!compiled.should_include("file.BAK"));
        assert!(!compiled.should_include("file.tmp"));
        assert!(compiled.should_include("file.txt"));
    }

    #[test]
    fn test_exclude_glob_and_regex() {
        let compiled = filters(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["*.part".to_string(), "[0-9]*.log".to_string()],
                regex: vec![r"^~\$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!compiled.should_include("movie.mkv.part"));
        assert!(!compiled.should_include("1debug.log"));
        assert!(compiled.should_include("debug.log"));
        assert!(!compiled.should_include("~$report.docx"));
        assert!(compiled.should_include("report.docx"));
    }

    #[test]
    fn test_include_overrides_hidden_rule() {
        let compiled = filters(FilterRules {
            include: IncludeRules {
                patterns: vec![".important".to_string()],
            },
            ..Default::default()
        });

        assert!(compiled.should_include(".important"));
        assert!(!compiled.should_include(".other"));
    }

    #[test]
    fn test_invalid_patterns_return_error() {
        let bad_regex = OrganizerConfig {
            filters: FilterRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_regex.compile_filters(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let bad_glob = OrganizerConfig {
            filters: FilterRules {
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_glob.compile_filters(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }

    #[test]
    fn test_parse_full_document() {
        let config = OrganizerConfig::from_toml(
            r#"
            [filters]
            enable_hidden_files = true

            [filters.exclude]
            extensions = ["tmp"]

            [categories]
            other_folder = "misc"

            [[categories.custom]]
            label = "Ebooks"
            extensions = ["epub", "mobi"]
            "#,
        )
        .unwrap();

        assert!(config.filters.enable_hidden_files);
        assert_eq!(config.filters.exclude.extensions, vec!["tmp"]);
        assert_eq!(config.categories.other_folder.as_deref(), Some("misc"));
        assert_eq!(config.categories.custom.len(), 1);
        assert_eq!(config.categories.custom[0].folder, None);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = OrganizerConfig::from_toml("").unwrap();
        assert!(!config.filters.enable_hidden_files);
        assert!(config.categories.custom.is_empty());
        assert!(!config.categories.replace_defaults);
    }

    #[test]
    fn test_malformed_toml_is_invalid() {
        let result = OrganizerConfig::from_toml("[filters\nenable_hidden_files = yes");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = OrganizerConfig::load(Some(Path::new("/non/existent/dirsort.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
