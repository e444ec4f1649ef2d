//! dirsort - sort the loose files of a directory into category folders
//!
//! The pipeline runs in one direction: [`scanner`] lists the regular files of
//! the target directory, [`file_category`] classifies them by extension,
//! [`planner`] computes collision-free destinations and [`executor`] performs
//! (or, in dry-run mode, only reports) the moves.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod file_category;
pub mod output;
pub mod planner;
pub mod scanner;

pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use error::{MoveError, OrganizeError, OrganizeResult};
pub use executor::{ExecutionReport, Executor, FailedMove};
pub use file_category::{Category, CategoryTable};
pub use planner::{PlannedMove, plan};
pub use scanner::{FileEntry, scan};

pub use cli::{OrganizeOptions, OutputFormat, RunOutcome, build_plan, run_cli};
