/// Extension-based file categorization.
///
/// A [`CategoryTable`] is an ordered list of `(extension set, Category)` pairs
/// plus one catch-all category. It is built once at startup and then only
/// read; [`CategoryTable::classify`] is a total function.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::CategoryTable;
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify_extension("PNG").folder_name, "images");
/// assert_eq!(table.classify_extension(".md").folder_name, "documents");
/// assert_eq!(table.classify_extension("").label, "Other");
/// ```
use crate::config::{CategoryRules, ConfigError};
use crate::scanner::FileEntry;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path};

/// Label and folder name of the catch-all category.
pub const OTHER_LABEL: &str = "Other";

/// A classification bucket with its destination subfolder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    pub label: String,
    pub folder_name: String,
}

impl Category {
    pub fn new(label: impl Into<String>, folder_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            folder_name: folder_name.into(),
        }
    }
}

/// Built-in categories in priority order.
const DEFAULT_CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "Images",
        "images",
        &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"],
    ),
    (
        "Documents",
        "documents",
        &["pdf", "doc", "docx", "txt", "md", "xlsx", "pptx", "odt"],
    ),
    (
        "Videos",
        "videos",
        &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"],
    ),
    ("Audio", "audio", &["mp3", "wav", "flac", "aac", "ogg", "wma"]),
    (
        "Archives",
        "archives",
        &["zip", "tar", "gz", "rar", "7z", "bz2"],
    ),
    (
        "Code",
        "code",
        &[
            "py", "js", "ts", "c", "cpp", "h", "java", "go", "rs", "html", "css",
        ],
    ),
    (
        "Executables",
        "executables",
        &["exe", "msi", "apk", "app", "deb", "rpm"],
    ),
];

/// Immutable, priority-ordered extension table.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<(HashSet<String>, Category)>,
    other: Category,
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Folder names must stay inside the target directory.
fn validate_folder(label: &str, folder: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(folder).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !folder.starts_with('.') => Ok(()),
        _ => Err(ConfigError::InvalidCategory {
            label: label.to_string(),
            reason: format!("'{}' is not a plain folder name", folder),
        }),
    }
}

impl CategoryTable {
    /// Creates an empty table that sends everything to `other`.
    pub fn with_other(other: Category) -> Self {
        Self {
            rules: Vec::new(),
            other,
        }
    }

    /// Appends a category with the lowest priority so far.
    pub fn push<I, S>(&mut self, category: Category, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self.rules.push((set, category));
    }

    /// Builds the table from the built-in defaults and configured overrides.
    ///
    /// Custom categories are checked before the built-in ones.
    pub fn from_rules(rules: &CategoryRules) -> Result<Self, ConfigError> {
        let other_folder = rules.other_folder.as_deref().unwrap_or(OTHER_LABEL);
        validate_folder(OTHER_LABEL, other_folder)?;

        let mut table = Self::with_other(Category::new(OTHER_LABEL, other_folder));

        for custom in &rules.custom {
            let folder = custom.folder.as_deref().unwrap_or(&custom.label);
            validate_folder(&custom.label, folder)?;
            table.push(Category::new(&custom.label, folder), &custom.extensions);
        }

        if !rules.replace_defaults {
            table.extend_defaults();
        }

        Ok(table)
    }

    fn extend_defaults(&mut self) {
        for (label, folder, extensions) in DEFAULT_CATEGORIES {
            self.push(Category::new(*label, *folder), extensions.iter());
        }
    }

    /// Maps an extension to its category; the first matching set wins.
    pub fn classify_extension(&self, ext: &str) -> &Category {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return &self.other;
        }

        self.rules
            .iter()
            .find(|(set, _)| set.contains(&ext))
            .map(|(_, category)| category)
            .unwrap_or(&self.other)
    }

    /// Classifies a scanned file by its extension.
    pub fn classify(&self, entry: &FileEntry) -> &Category {
        self.classify_extension(&entry.extension)
    }

    /// The catch-all category.
    pub fn other(&self) -> &Category {
        &self.other
    }

    /// All categories in priority order, catch-all last.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.rules
            .iter()
            .map(|(_, category)| category)
            .chain(std::iter::once(&self.other))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut table = Self::with_other(Category::new(OTHER_LABEL, OTHER_LABEL));
        table.extend_defaults();
        table
    }
}
