//! Mass rename module for renaming directory entries with a regex pattern and replacement template.
//!
//! Each directory is planned on its own: entries are matched in name order,
//! destination collisions are resolved so that nothing gets overwritten,
//! and the approved renames are executed before moving on to subdirectories.

mod config;
mod matcher;
pub mod plan;
mod rename;

pub use config::{MassRenameConfig, RenameRequest};
pub use matcher::Matcher;
pub use plan::{Candidate, DirectoryPlan, PlannedRename, RejectReason, Rejection};
pub use rename::{MassRename, RenameStats};
