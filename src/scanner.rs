//! Non-recursive listing of the files to organize.

use crate::config::CompiledFilters;
use crate::error::{OrganizeError, OrganizeResult};
use std::fs::{self, ReadDir};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A regular file found directly inside the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file name, lossily converted for display.
    pub name: String,
    /// Lower-cased extension without the dot; empty when there is none.
    pub extension: String,
    /// Full path to the file.
    pub source_path: PathBuf,
}

impl FileEntry {
    /// Builds an entry from a path inside the target directory.
    pub fn from_path(source_path: PathBuf) -> Self {
        let name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = source_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Self {
            name,
            extension,
            source_path,
        }
    }
}

/// Lazy, one-shot iterator over the regular files of a directory.
///
/// Subdirectories, symlinks and anything the filters reject are skipped.
pub struct Scan<'a> {
    entries: ReadDir,
    filters: &'a CompiledFilters,
}

impl Iterator for Scan<'_> {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            // file_type() does not follow symlinks
            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => {
                    debug!(path = %path.display(), "skipping non-regular entry");
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), "skipping entry: {}", e);
                    continue;
                }
            }

            let file_name = entry.file_name();
            if !self.filters.should_include(&file_name.to_string_lossy()) {
                debug!(path = %path.display(), "excluded by filters");
                continue;
            }

            return Some(FileEntry::from_path(path));
        }
        None
    }
}

/// Lists the files directly inside `target_dir`.
///
/// # Errors
///
/// Returns `NotFound` if the directory does not exist, `NotADirectory` if it
/// is something else, and `ReadDir` if it cannot be listed.
pub fn scan<'a>(target_dir: &Path, filters: &'a CompiledFilters) -> OrganizeResult<Scan<'a>> {
    let metadata = fs::metadata(target_dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => OrganizeError::NotFound(target_dir.to_path_buf()),
        _ => OrganizeError::ReadDir {
            path: target_dir.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(OrganizeError::NotADirectory(target_dir.to_path_buf()));
    }

    let entries = fs::read_dir(target_dir).map_err(|e| OrganizeError::ReadDir {
        path: target_dir.to_path_buf(),
        source: e,
    })?;

    Ok(Scan { entries, filters })
}
