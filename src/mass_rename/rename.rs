//! Mass rename implementation: traversal, confirmation and execution.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use anyhow::Result;
use colored::Colorize;

use crate::mass_rename::plan::{self, DirectoryPlan, PlannedRename, RejectReason, Rejection};
use crate::mass_rename::{Matcher, RenameRequest};
use crate::prompt::Prompt;
use crate::{print_error, print_warning};

const TEMP_EXTENSION: &str = "massrename.tmp";

/// Counts for one run over the requested scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameStats {
    /// Directories that were read and planned.
    pub directories: usize,
    /// Accepted renames across all directories.
    pub planned: usize,
    pub renamed: usize,
    /// Matched entries left in place by collision resolution.
    pub rejected: usize,
    pub declined: usize,
    pub failed: usize,
}

/// Mass rename handler for one request.
#[derive(Debug)]
pub struct MassRename {
    root: PathBuf,
    request: RenameRequest,
    matcher: Matcher,
}

/// A rename being executed, tracking where the source currently is.
#[derive(Debug)]
struct PendingRename {
    rename: PlannedRename,
    current: PathBuf,
}

impl MassRename {
    /// Validate the request and compile the pattern.
    ///
    /// # Errors
    /// Returns an error if the pattern or replacement is invalid,
    /// or the directory does not exist.
    pub fn new(request: RenameRequest) -> Result<Self> {
        let matcher = Matcher::new(&request.pattern, &request.replacement, request.ignorecase)?;
        let root = crate::resolve_directory(&request.directory)?;
        Ok(Self { root, request, matcher })
    }

    /// Run renaming with confirmation prompts on the terminal.
    ///
    /// # Errors
    /// Returns an error if the root directory cannot be read or the prompt fails.
    pub fn run(&self) -> Result<RenameStats> {
        self.run_with_prompt(&mut Prompt::stdio())
    }

    /// Run renaming, reading confirmations from the given prompt.
    ///
    /// Individual rename failures are reported and counted, they do not stop the run.
    ///
    /// # Errors
    /// Returns an error if the root directory cannot be read or the prompt fails.
    pub fn run_with_prompt<R: BufRead, W: Write>(&self, prompt: &mut Prompt<R, W>) -> Result<RenameStats> {
        if self.request.verbose {
            println!("{self}");
        }

        let mut stats = RenameStats::default();
        let mut directories = vec![self.root.clone()];

        while let Some(directory) = directories.pop() {
            let plan = match plan::plan_directory(&directory, &self.matcher) {
                Ok(plan) => plan,
                Err(error) if directory != self.root => {
                    print_error!("{error:#}");
                    stats.failed += 1;
                    continue;
                }
                Err(error) => return Err(error),
            };
            stats.directories += 1;
            self.process_plan(plan, prompt, &mut stats)?;

            if self.request.recursive {
                // Listed after renaming so renamed subdirectories are visited under their new name.
                match plan::list_subdirectories(&directory) {
                    Ok(subdirectories) => directories.extend(subdirectories.into_iter().rev()),
                    Err(error) => {
                        print_error!("{error:#}");
                        stats.failed += 1;
                    }
                }
            }
        }

        self.print_summary(&stats);
        Ok(stats)
    }

    /// Confirm and execute the renames of one directory.
    fn process_plan<R: BufRead, W: Write>(
        &self,
        plan: DirectoryPlan,
        prompt: &mut Prompt<R, W>,
        stats: &mut RenameStats,
    ) -> Result<()> {
        if self.request.verbose {
            println!(
                "{}",
                format!("Processing {}", self.display_directory(&plan.directory)).bold()
            );
            for path in &plan.skipped {
                print_warning!("Skipping {}: name is not valid Unicode", self.display_path(path));
            }
            for rejection in &plan.rejections {
                self.print_rejection(rejection);
            }
            if plan.is_empty() {
                println!("No entries to rename");
            }
        }

        stats.rejected += plan.rejections.len();
        stats.planned += plan.renames.len();
        if plan.is_empty() {
            return Ok(());
        }

        if self.request.dryrun {
            self.print_renames(&plan.renames, "Dryrun");
            return Ok(());
        }

        let approved = if self.request.force {
            self.print_renames(&plan.renames, "Rename");
            plan.renames
        } else if self.request.verbose {
            let mut approved = Vec::with_capacity(plan.renames.len());
            for rename in plan.renames {
                let (old, new) = self.display_names(&rename);
                crate::show_diff(&old, &new);
                if prompt.confirm("Rename?", false)? {
                    approved.push(rename);
                } else {
                    println!("Skipped");
                    stats.declined += 1;
                }
            }
            approved
        } else {
            self.print_renames(&plan.renames, "Rename");
            let question = format!(
                "Rename {} in {}?",
                pluralize(plan.renames.len()),
                self.display_directory(&plan.directory)
            );
            if prompt.confirm(&question, false)? {
                plan.renames
            } else {
                println!("Skipped");
                stats.declined += plan.renames.len();
                Vec::new()
            }
        };

        self.execute(approved, stats);
        Ok(())
    }

    /// Execute approved renames without ever overwriting an existing entry.
    ///
    /// Renames whose destination is still in use wait for it to be renamed away.
    /// Cycles are broken by moving one source to a temporary name first.
    fn execute(&self, renames: Vec<PlannedRename>, stats: &mut RenameStats) {
        let mut pending: Vec<PendingRename> = renames
            .into_iter()
            .map(|rename| PendingRename {
                current: rename.source.clone(),
                rename,
            })
            .collect();

        while !pending.is_empty() {
            let count = pending.len();
            pending.retain(|item| {
                if destination_in_use(&item.current, &item.rename.destination) {
                    return true;
                }
                self.apply(item, stats);
                false
            });

            if pending.len() < count {
                continue;
            }

            // No destination became free this round.
            if let Some(index) = find_cycle(&pending) {
                let item = &mut pending[index];
                match Self::move_to_temp(&item.current) {
                    Ok(temp) => {
                        if self.request.verbose {
                            println!("Moved {} to temporary name", self.display_path(&item.current));
                        }
                        item.current = temp;
                    }
                    Err(error) => {
                        let (old, _) = self.display_names(&item.rename);
                        print_error!("Failed to rename {old}: {error}");
                        stats.failed += 1;
                        pending.remove(index);
                    }
                }
                continue;
            }

            for item in pending.drain(..) {
                let (old, new) = self.display_names(&item.rename);
                print_warning!("Skipping rename {old} -> {new}: destination already exists");
                self.restore(&item);
                stats.failed += 1;
            }
        }
    }

    /// Rename one entry and record the outcome.
    fn apply(&self, item: &PendingRename, stats: &mut RenameStats) {
        let destination = &item.rename.destination;
        let result = if is_same_entry(&item.current, destination) {
            // Case-only change on a case-insensitive file system.
            Self::rename_with_temp_file(&item.current, destination)
        } else {
            fs::rename(&item.current, destination)
        };

        match result {
            Ok(()) => stats.renamed += 1,
            Err(error) => {
                let (old, new) = self.display_names(&item.rename);
                print_error!("Failed to rename {old} -> {new}: {error}");
                self.restore(item);
                stats.failed += 1;
            }
        }
    }

    /// Move a staged entry back to its original name if possible.
    fn restore(&self, item: &PendingRename) {
        if item.current == item.rename.source {
            return;
        }
        if item.rename.source.symlink_metadata().is_ok() {
            print_warning!(
                "Left {} under temporary name {}",
                self.display_path(&item.rename.source),
                self.display_path(&item.current)
            );
        } else if let Err(error) = fs::rename(&item.current, &item.rename.source) {
            print_error!(
                "Failed to restore {} from {}: {error}",
                self.display_path(&item.rename.source),
                self.display_path(&item.current)
            );
        }
    }

    /// Move the entry to a free temporary name in the same directory.
    fn move_to_temp(path: &Path) -> io::Result<PathBuf> {
        let mut temp = crate::append_extension_to_path(path.to_path_buf(), TEMP_EXTENSION);
        let mut index = 2;
        while temp.symlink_metadata().is_ok() {
            temp = crate::append_extension_to_path(path.to_path_buf(), format!("{index}.{TEMP_EXTENSION}"));
            index += 1;
        }
        fs::rename(path, &temp)?;
        Ok(temp)
    }

    /// Rename a file with an intermediate temp file to work around case-insensitive file systems.
    fn rename_with_temp_file(path: &Path, new_path: &Path) -> io::Result<()> {
        let temp = Self::move_to_temp(path)?;
        fs::rename(&temp, new_path).inspect_err(|_| {
            let _ = fs::rename(&temp, path);
        })
    }

    fn print_renames(&self, renames: &[PlannedRename], heading: &str) {
        let max_items = renames.len();
        let max_chars = max_items.checked_ilog10().map_or(1, |d| d as usize + 1);
        for (index, rename) in renames.iter().enumerate() {
            let (old, new) = self.display_names(rename);
            let number = format!("{:>max_chars$} / {max_items}", index + 1);
            let title = format!("{heading} {number}:");
            if self.request.dryrun {
                println!("{}", title.bold().cyan());
            } else {
                println!("{}", title.bold().magenta());
            }
            crate::show_diff(&old, &new);
        }
    }

    fn print_rejection(&self, rejection: &Rejection) {
        let name = self.display_path(&rejection.candidate.path);
        match &rejection.reason {
            RejectReason::ClaimedBy(winner) => print_warning!(
                "Skipping {name}: {} is already claimed by {}",
                rejection.destination,
                self.display_path(winner)
            ),
            RejectReason::Occupied => {
                print_warning!("Skipping {name}: {} already exists", rejection.destination);
            }
            RejectReason::InvalidName => {
                print_warning!("Skipping {name}: invalid new name '{}'", rejection.destination);
            }
        }
    }

    fn print_summary(&self, stats: &RenameStats) {
        if self.request.dryrun {
            println!("Dryrun: would have renamed {}", pluralize(stats.planned));
            return;
        }
        if stats.renamed > 0 || self.request.verbose {
            println!("{}", format!("Renamed {}", pluralize(stats.renamed)).green());
        }
        if stats.failed > 0 {
            print_warning!("Failed to rename {}", pluralize(stats.failed));
        }
    }

    fn display_names(&self, rename: &PlannedRename) -> (String, String) {
        (self.display_path(&rename.source), self.display_path(&rename.destination))
    }

    fn display_path(&self, path: &Path) -> String {
        crate::get_relative_path_or_filename(path, &self.root)
    }

    fn display_directory(&self, directory: &Path) -> String {
        if directory == self.root {
            directory.display().to_string()
        } else {
            self.display_path(directory)
        }
    }
}

impl fmt::Display for MassRename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Root: {}", self.root.display())?;
        write!(f, "{}", self.request)
    }
}

/// Check if something other than the entry itself occupies the destination.
fn destination_in_use(current: &Path, destination: &Path) -> bool {
    destination.symlink_metadata().is_ok() && !is_same_entry(current, destination)
}

/// Check if both paths name the same directory entry.
///
/// True for names that only differ by case on a case-insensitive file system.
/// Hard links under different names are separate entries.
fn is_same_entry(path: &Path, other: &Path) -> bool {
    if !names_equal_ignoring_case(path, other) {
        return false;
    }
    match (path.symlink_metadata(), other.symlink_metadata()) {
        (Ok(a), Ok(b)) => same_file_id(path, other, &a, &b),
        _ => false,
    }
}

fn names_equal_ignoring_case(path: &Path, other: &Path) -> bool {
    match (path.file_name(), other.file_name()) {
        (Some(a), Some(b)) => a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase(),
        _ => false,
    }
}

#[cfg(unix)]
fn same_file_id(_path: &Path, _other: &Path, a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file_id(path: &Path, other: &Path, _a: &fs::Metadata, _b: &fs::Metadata) -> bool {
    matches!(
        (dunce::canonicalize(path), dunce::canonicalize(other)),
        (Ok(a), Ok(b)) if a == b
    )
}

/// Find a pending rename that is part of a cycle of renames blocking each other.
fn find_cycle(pending: &[PendingRename]) -> Option<usize> {
    let by_location: HashMap<&Path, usize> = pending
        .iter()
        .enumerate()
        .map(|(index, item)| (item.current.as_path(), index))
        .collect();

    (0..pending.len()).find(|&start| {
        let mut index = start;
        for _ in 0..pending.len() {
            match by_location.get(pending[index].rename.destination.as_path()) {
                Some(&next) if next == start => return true,
                Some(&next) => index = next,
                None => return false,
            }
        }
        false
    })
}

fn pluralize(count: usize) -> String {
    if count == 1 {
        format!("{count} entry")
    } else {
        format!("{count} entries")
    }
}
