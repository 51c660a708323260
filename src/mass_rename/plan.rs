//! Rename planning for a single directory.
//!
//! Entries are matched and given a destination name,
//! then collisions are resolved so that no two renames share a destination
//! and no rename lands on an entry that stays in place.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::mass_rename::Matcher;

/// A single directory entry considered for renaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub name: String,
}

/// An accepted rename within one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRename {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Why a matched candidate is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// An earlier entry in the directory claimed the same destination.
    ClaimedBy(PathBuf),
    /// The destination is an entry that is not renamed away.
    Occupied,
    /// The computed name is not a valid single path component.
    InvalidName,
}

/// A matched candidate that will not be renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub candidate: Candidate,
    pub destination: String,
    pub reason: RejectReason,
}

/// Collision-free renames for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryPlan {
    pub directory: PathBuf,
    /// Accepted renames in directory enumeration order.
    pub renames: Vec<PlannedRename>,
    pub rejections: Vec<Rejection>,
    /// Number of entries the pattern did not match.
    pub unmatched: usize,
    /// Number of matched entries whose new name equals the current name.
    pub unchanged: usize,
    /// Entries left alone because their name is not valid Unicode.
    pub skipped: Vec<PathBuf>,
}

impl Candidate {
    /// Create a candidate from a directory entry path.
    ///
    /// # Errors
    /// Gives the path back if it has no file name or the name is not valid Unicode.
    pub fn from_path(path: PathBuf) -> Result<Self, PathBuf> {
        match crate::normalized_file_name(&path) {
            Some(name) => Ok(Self { path, name }),
            None => Err(path),
        }
    }
}

impl DirectoryPlan {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

/// List the direct children of a directory, sorted by name.
///
/// # Errors
/// Returns an error if the directory or one of its entries cannot be read.
pub fn list_directory(directory: &Path) -> Result<Vec<PathBuf>> {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            entry
                .map(walkdir::DirEntry::into_path)
                .with_context(|| format!("Failed to read directory: {}", directory.display()))
        })
        .collect()
}

/// List the subdirectories of a directory, sorted by name.
///
/// Symlinks to directories are not included.
///
/// # Errors
/// Returns an error if the directory or one of its entries cannot be read.
pub fn list_subdirectories(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirectories = Vec::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", directory.display()))?;
        if entry.file_type().is_dir() {
            subdirectories.push(entry.into_path());
        }
    }
    Ok(subdirectories)
}

/// Read the directory and plan renames for its direct children.
///
/// Entries with a name that is not valid Unicode are never matched,
/// they are listed in `skipped` instead.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn plan_directory(directory: &Path, matcher: &Matcher) -> Result<DirectoryPlan> {
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();
    for path in list_directory(directory)? {
        match Candidate::from_path(path) {
            Ok(candidate) => candidates.push(candidate),
            Err(path) => skipped.push(path),
        }
    }
    let mut plan = plan_entries(directory, candidates, matcher);
    plan.skipped = skipped;
    Ok(plan)
}

/// Plan renames for the given entries of one directory.
///
/// Entries are processed in name order.
/// When several entries compute the same destination, the first one gets it and the rest stay.
/// A destination that is an existing entry is only allowed when that entry is itself renamed away.
#[must_use]
pub fn plan_entries(directory: &Path, mut entries: Vec<Candidate>, matcher: &Matcher) -> DirectoryPlan {
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let mut plan = DirectoryPlan {
        directory: directory.to_path_buf(),
        ..Default::default()
    };

    let existing: HashSet<String> = entries.iter().map(|entry| entry.name.clone()).collect();

    let mut matched: Vec<(Candidate, String)> = Vec::new();
    for candidate in entries {
        match matcher.destination(&candidate.name) {
            None => plan.unmatched += 1,
            Some(destination) if destination == candidate.name => plan.unchanged += 1,
            Some(destination) if !is_valid_name(&destination) => plan.rejections.push(Rejection {
                candidate,
                destination,
                reason: RejectReason::InvalidName,
            }),
            Some(destination) => matched.push((candidate, destination)),
        }
    }

    // Destination registry: first claim in name order wins.
    let mut status: Vec<Option<RejectReason>> = vec![None; matched.len()];
    let mut registry: HashMap<&str, usize> = HashMap::new();
    for (index, (_, destination)) in matched.iter().enumerate() {
        match registry.entry(destination.as_str()) {
            Entry::Occupied(winner) => {
                status[index] = Some(RejectReason::ClaimedBy(matched[*winner.get()].0.path.clone()));
            }
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }

    // Rejected entries stay in place, which can occupy another destination in turn.
    loop {
        let sources: HashSet<&str> = matched
            .iter()
            .zip(&status)
            .filter(|(_, status)| status.is_none())
            .map(|((candidate, _), _)| candidate.name.as_str())
            .collect();

        let occupied: Vec<usize> = matched
            .iter()
            .enumerate()
            .filter(|(index, (_, destination))| {
                status[*index].is_none()
                    && existing.contains(destination.as_str())
                    && !sources.contains(destination.as_str())
            })
            .map(|(index, _)| index)
            .collect();

        if occupied.is_empty() {
            break;
        }
        for index in occupied {
            status[index] = Some(RejectReason::Occupied);
        }
    }

    for ((candidate, destination), status) in matched.into_iter().zip(status) {
        match status {
            None => plan.renames.push(PlannedRename {
                destination: directory.join(&destination),
                source: candidate.path,
            }),
            Some(reason) => plan.rejections.push(Rejection {
                candidate,
                destination,
                reason,
            }),
        }
    }

    plan.rejections.sort_by(|a, b| a.candidate.path.cmp(&b.candidate.path));
    plan
}

/// Check that a computed name is a single, regular path component.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.chars().any(|c| std::path::is_separator(c) || c == '\0')
}
