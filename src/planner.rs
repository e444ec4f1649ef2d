//! Turns classified files into a collision-free move plan.
//!
//! The planner only computes paths. It reads metadata to see which names are
//! already taken on disk but never creates, moves or deletes anything.

use crate::file_category::Category;
use crate::scanner::FileEntry;
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file relocation: where it is, where it goes, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

impl PlannedMove {
    /// The folder the destination lives in.
    pub fn destination_folder(&self) -> &Path {
        self.destination.parent().unwrap_or(&self.destination)
    }

    /// True when the destination name differs from the source name.
    pub fn is_renamed(&self) -> bool {
        self.source.file_name() != self.destination.file_name()
    }
}

/// Builds `stem (n).ext`, or `name (n)` when there is no extension.
fn suffixed_name(original: &Path, n: usize) -> OsString {
    let stem = original
        .file_stem()
        .or_else(|| original.file_name())
        .unwrap_or_default();

    let mut name = stem.to_os_string();
    name.push(format!(" ({})", n));
    if let Some(ext) = original.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

fn exists_on_disk(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Plans a move for every classified entry, in input order.
///
/// Each destination is `target_dir/<folder_name>/<file name>`. A name that is
/// already allocated in this plan, or already present on disk, gets the
/// lowest free ` (n)` suffix. Destinations are pairwise distinct.
pub fn plan<I>(classified: I, target_dir: &Path) -> Vec<PlannedMove>
where
    I: IntoIterator<Item = (FileEntry, Category)>,
{
    let mut allocated: HashSet<PathBuf> = HashSet::new();
    let mut moves = Vec::new();

    for (entry, category) in classified {
        let folder = target_dir.join(&category.folder_name);
        let Some(file_name) = entry.source_path.file_name() else {
            continue;
        };

        let mut destination = folder.join(file_name);
        let mut n = 0;
        while allocated.contains(&destination) || exists_on_disk(&destination) {
            n += 1;
            destination = folder.join(suffixed_name(Path::new(file_name), n));
        }
        if n > 0 {
            debug!(
                source = %entry.source_path.display(),
                destination = %destination.display(),
                "resolved name collision"
            );
        }

        allocated.insert(destination.clone());
        moves.push(PlannedMove {
            source: entry.source_path,
            destination,
            category,
        });
    }

    moves
}
