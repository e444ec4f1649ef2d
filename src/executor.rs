/// Execution of a move plan.
///
/// The executor walks the plan in order, creating category folders as needed
/// and moving each file. One failing move never stops the batch: every
/// outcome lands in the returned [`ExecutionReport`].
use crate::error::MoveError;
use crate::planner::PlannedMove;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Moves a file without ever replacing an existing destination.
pub type MoveFn = fn(&Path, &Path) -> io::Result<()>;

/// A move that did not happen, and why.
#[derive(Debug)]
pub struct FailedMove {
    pub planned: PlannedMove,
    pub error: MoveError,
}

/// Outcome of executing a plan.
///
/// In dry-run mode `moved` lists what would have been moved.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub dry_run: bool,
    pub moved: Vec<PlannedMove>,
    pub failed: Vec<FailedMove>,
}

impl ExecutionReport {
    /// Total number of planned moves processed.
    pub fn total(&self) -> usize {
        self.moved.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Final one-line summary, e.g. "3 files organized."
    pub fn summary_line(&self) -> String {
        let count = self.moved.len();
        let noun = if count == 1 { "file" } else { "files" };
        if self.dry_run {
            format!("{} {} would be organized.", count, noun)
        } else {
            format!("{} {} organized.", count, noun)
        }
    }
}

/// Outcome of a single move, handed to the progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    WouldMove,
    Failed,
}

/// Executes move plans against the filesystem.
#[derive(Debug)]
pub struct Executor {
    created_folders: HashSet<PathBuf>,
    failed_folders: HashMap<PathBuf, String>,
    /// Root files moved aside because they occupy a category folder name.
    set_aside: HashMap<PathBuf, PathBuf>,
    move_file: MoveFn,
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            created_folders: HashSet::new(),
            failed_folders: HashMap::new(),
            set_aside: HashMap::new(),
            move_file: rename_no_replace,
        }
    }
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the same-filesystem move primitive.
    pub fn with_move_fn(mut self, move_file: MoveFn) -> Self {
        self.move_file = move_file;
        self
    }

    /// Executes `plan`, or only reports it when `dry_run` is set.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::executor::Executor;
    ///
    /// let report = Executor::new().execute(Vec::new(), true);
    /// assert_eq!(report.summary_line(), "0 files would be organized.");
    /// ```
    pub fn execute(&mut self, plan: Vec<PlannedMove>, dry_run: bool) -> ExecutionReport {
        self.execute_with_observer(plan, dry_run, |_, _| {})
    }

    /// Like [`Executor::execute`], calling `observer` after each move.
    pub fn execute_with_observer<F>(
        &mut self,
        plan: Vec<PlannedMove>,
        dry_run: bool,
        mut observer: F,
    ) -> ExecutionReport
    where
        F: FnMut(&PlannedMove, MoveOutcome),
    {
        let mut report = ExecutionReport {
            dry_run,
            ..Default::default()
        };

        if !dry_run {
            self.clear_folder_squatters(&plan);
        }

        for planned in plan {
            if dry_run {
                observer(&planned, MoveOutcome::WouldMove);
                report.moved.push(planned);
                continue;
            }

            match self.move_one(&planned) {
                Ok(()) => {
                    info!(
                        source = %planned.source.display(),
                        destination = %planned.destination.display(),
                        "moved"
                    );
                    observer(&planned, MoveOutcome::Moved);
                    report.moved.push(planned);
                }
                Err(error) => {
                    warn!(source = %planned.source.display(), "move failed: {}", error);
                    observer(&planned, MoveOutcome::Failed);
                    report.failed.push(FailedMove { planned, error });
                }
            }
        }

        report
    }

    /// Moves planned sources that sit on a destination folder path out of
    /// the way, so the folder can be created whatever the plan order.
    fn clear_folder_squatters(&mut self, plan: &[PlannedMove]) {
        let folders: HashSet<&Path> = plan.iter().map(|m| m.destination_folder()).collect();

        for planned in plan {
            if !folders.contains(planned.source.as_path()) {
                continue;
            }
            match set_aside(&planned.source, self.move_file) {
                Ok(temp) => {
                    debug!(
                        source = %planned.source.display(),
                        temp = %temp.display(),
                        "moved folder squatter aside"
                    );
                    self.set_aside.insert(planned.source.clone(), temp);
                }
                Err(e) => {
                    // The folder create below fails and reports it per move.
                    warn!(source = %planned.source.display(), "cannot move squatter aside: {}", e);
                }
            }
        }
    }

    fn move_one(&mut self, planned: &PlannedMove) -> Result<(), MoveError> {
        let Some(temp) = self.set_aside.remove(&planned.source) else {
            return self.move_from(&planned.source, planned);
        };

        let result = self.move_from(&temp, planned);
        if result.is_err() {
            // The original name may now be the category folder itself.
            if let Err(e) = (self.move_file)(&temp, &planned.source) {
                return Err(MoveError::Stranded {
                    temp,
                    reason: e.to_string(),
                });
            }
        }
        result
    }

    fn move_from(&mut self, current: &Path, planned: &PlannedMove) -> Result<(), MoveError> {
        if fs::symlink_metadata(current).is_err() {
            return Err(MoveError::SourceMissing(planned.source.clone()));
        }

        self.ensure_folder(planned.destination_folder())?;

        match (self.move_file)(current, &planned.destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(MoveError::DestinationExists(planned.destination.clone()))
            }
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                copy_then_remove(current, &planned.destination)
                    .map_err(|source| MoveError::CopyFallback { source })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(MoveError::SourceMissing(planned.source.clone()))
            }
            Err(source) => Err(MoveError::Move { source }),
        }
    }

    /// Creates `folder` once; a failure is remembered for later moves.
    fn ensure_folder(&mut self, folder: &Path) -> Result<(), MoveError> {
        if self.created_folders.contains(folder) {
            return Ok(());
        }
        if let Some(reason) = self.failed_folders.get(folder) {
            return Err(MoveError::FolderCreate {
                folder: folder.to_path_buf(),
                reason: reason.clone(),
            });
        }

        match fs::create_dir_all(folder) {
            Ok(()) => {
                self.created_folders.insert(folder.to_path_buf());
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(folder = %folder.display(), "cannot create folder: {}", reason);
                self.failed_folders
                    .insert(folder.to_path_buf(), reason.clone());
                Err(MoveError::FolderCreate {
                    folder: folder.to_path_buf(),
                    reason,
                })
            }
        }
    }
}

/// Same-filesystem move that fails with `AlreadyExists` instead of replacing.
///
/// A hard link claims the destination atomically, then the source name is
/// dropped. Filesystems without hard links fall back to check-then-rename.
pub fn rename_no_replace(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::AlreadyExists | ErrorKind::CrossesDevices | ErrorKind::NotFound
            ) =>
        {
            Err(e)
        }
        Err(_) => {
            if fs::symlink_metadata(destination).is_ok() {
                return Err(io::Error::from(ErrorKind::AlreadyExists));
            }
            // Only holds without concurrent writers: rename replaces silently.
            fs::rename(source, destination)
        }
    }
}

/// Renames `source` to a free hidden name next to it and returns that path.
fn set_aside(source: &Path, move_file: MoveFn) -> io::Result<PathBuf> {
    let parent = source.parent().unwrap_or(Path::new("."));
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut n = 0;
    loop {
        let temp = parent.join(format!(".{}.dirsort-{}", name, n));
        match move_file(source, &temp) {
            Ok(()) => return Ok(temp),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Cross-filesystem move. On any failure the source stays and no copy remains.
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    // From here on the destination is ours to clean up.
    let copied = io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.sync_all())
        .and_then(|()| fs::metadata(source))
        .and_then(|metadata| fs::set_permissions(destination, metadata.permissions()));
    drop(writer);

    if let Err(e) = copied {
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    Ok(())
}
