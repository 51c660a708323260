pub mod config;
pub mod mass_rename;
pub mod prompt;

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use colored::{ColoredString, Colorize};
use difference::{Changeset, Difference};
use unicode_normalization::UnicodeNormalization;

pub use config::config_path;

/// Append an extension to `PathBuf`, which is missing from the standard lib :(
pub fn append_extension_to_path(path: PathBuf, extension: impl AsRef<OsStr>) -> PathBuf {
    let mut os_string: OsString = path.into();
    os_string.push(".");
    os_string.push(extension);
    os_string.into()
}

/// Format bool value as a coloured string.
#[must_use]
pub fn colorize_bool(value: bool) -> ColoredString {
    if value { "true".green() } else { "false".red() }
}

/// Get the file name of an entry with special characters retained instead of decomposed.
///
/// Returns `None` for paths without a file name, like `/` or `..`,
/// and for names that are not valid Unicode.
#[must_use]
pub fn normalized_file_name(path: &Path) -> Option<String> {
    // macOS hands out names in Unicode NFD,
    // which turns "å" into "a\u{30a}" and breaks matching against user patterns.
    // Compose back to NFC so patterns see the name the way it was typed.
    path.file_name()?.to_str().map(|name| name.nfc().collect())
}

/// Resolves the given directory to an absolute path.
///
/// The path is used exactly as given: it must exist and be a directory.
///
/// ```rust
/// use std::path::Path;
/// use mass_rename::resolve_directory;
///
/// let absolute_path = resolve_directory(Path::new("src")).unwrap();
/// assert!(absolute_path.is_absolute());
/// ```
pub fn resolve_directory(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("Directory must not be empty");
    }
    if !path.exists() {
        anyhow::bail!("Directory does not exist or is not accessible: '{}'", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("Not a directory: '{}'", path.display());
    }

    let absolute_path =
        dunce::canonicalize(path).with_context(|| format!("Failed to resolve directory: '{}'", path.display()))?;

    // Canonicalize fails for network drives on Windows :(
    let verbatim = |path: &Path| path.as_os_str().to_string_lossy().starts_with(r"\\?");
    if verbatim(&absolute_path) && !verbatim(path) {
        Ok(path.to_path_buf())
    } else {
        Ok(absolute_path)
    }
}

/// Gets the relative path or filename from a full path based on a root directory.
///
/// If the full path is within the root directory, the function returns the relative path.
/// Otherwise, it returns just the filename. If the filename cannot be determined, the
/// full path is returned.
///
/// ```rust
/// use std::path::Path;
/// use mass_rename::get_relative_path_or_filename;
///
/// let root = Path::new("/root/dir");
/// let full_path = root.join("subdir/file.txt");
/// let relative_path = get_relative_path_or_filename(&full_path, root);
/// assert_eq!(relative_path, "subdir/file.txt");
///
/// let outside_path = Path::new("/other/another.txt");
/// let relative_or_filename = get_relative_path_or_filename(&outside_path, root);
/// assert_eq!(relative_or_filename, "another.txt");
/// ```
#[must_use]
pub fn get_relative_path_or_filename(full_path: &Path, root: &Path) -> String {
    if full_path == root {
        return full_path.file_name().unwrap_or_default().to_string_lossy().to_string();
    }
    full_path.strip_prefix(root).map_or_else(
        |_| {
            full_path.file_name().map_or_else(
                || full_path.display().to_string(),
                |name| name.to_string_lossy().to_string(),
            )
        },
        |relative_path| relative_path.display().to_string(),
    )
}

#[inline]
pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {message}").red());
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::print_error(&format!($($arg)*))
    };
}

#[inline]
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        $crate::print_warning(&format!($($arg)*))
    };
}

/// Create a coloured diff of an old and new name.
///
/// Removed text is red in the old name and added text green in the new name.
/// With `aligned`, the shorter side is padded so the first longer common run
/// lines up when the two names are printed on top of each other:
///
/// ```text
/// IMG_2019_holiday.jpg
///     2019_holiday.jpg
/// ```
pub fn color_diff(old: &str, new: &str, aligned: bool) -> (String, String) {
    let changeset = Changeset::new(old, new, "");
    let (old_pad, new_pad) = if aligned {
        alignment_padding(&changeset.diffs, old, new)
    } else {
        (0, 0)
    };

    let mut old_diff = " ".repeat(old_pad);
    let mut new_diff = " ".repeat(new_pad);
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(text) => {
                old_diff.push_str(text);
                new_diff.push_str(text);
            }
            Difference::Add(text) => new_diff.push_str(&highlight(text, true).to_string()),
            Difference::Rem(text) => old_diff.push_str(&highlight(text, false).to_string()),
        }
    }

    (old_diff, new_diff)
}

/// Leading spaces for the old and new name so their first common run starts at the same column.
fn alignment_padding(diffs: &[Difference], old: &str, new: &str) -> (usize, usize) {
    diffs
        .iter()
        .filter_map(|diff| match diff {
            Difference::Same(text) if text.chars().count() >= 3 && !text.trim().is_empty() => Some(text),
            _ => None,
        })
        .find_map(|text| Some((old.find(text.as_str())?, new.find(text.as_str())?)))
        .map_or((0, 0), |(old_index, new_index)| {
            (new_index.saturating_sub(old_index), old_index.saturating_sub(new_index))
        })
}

/// Colour changed text, using a background colour for whitespace so it stays visible.
fn highlight(text: &str, added: bool) -> ColoredString {
    let whitespace = text.chars().all(char::is_whitespace);
    match (added, whitespace) {
        (true, true) => text.on_green(),
        (true, false) => text.green(),
        (false, true) => text.on_red(),
        (false, false) => text.red(),
    }
}

/// Print an aligned diff of a rename.
pub fn show_diff(old: &str, new: &str) {
    let (old_diff, new_diff) = color_diff(old, new, true);
    println!("{old_diff}");
    if old_diff != new_diff {
        println!("{new_diff}");
    }
}

/// Generate a shell completion script for the given shell.
///
/// With `install`, the script is written to the shell's completion directory,
/// otherwise it is printed to stdout.
pub fn generate_shell_completion(shell: Shell, mut command: Command, install: bool, command_name: &str) -> Result<()> {
    if install {
        let out_dir = get_shell_completion_dir(shell, command_name)?;
        let path = clap_complete::generate_to(shell, &mut command, command_name, out_dir)?;
        println!("Completion file generated to: {}", path.display());
    } else {
        clap_complete::generate(shell, &mut command, command_name, &mut std::io::stdout());
    }
    Ok(())
}

/// Pick the directory for an installed completion script.
///
/// Uses an existing per-user directory, then an existing system directory,
/// and otherwise creates the per-user directory.
fn get_shell_completion_dir(shell: Shell, name: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to get home directory")?;

    // oh-my-zsh loads completions from a custom plugin, enabled in .zshrc
    let omz_plugins = home.join(".oh-my-zsh/custom/plugins");
    if shell == Shell::Zsh && omz_plugins.exists() {
        let plugin_dir = omz_plugins.join(name);
        std::fs::create_dir_all(&plugin_dir)
            .with_context(|| format!("Failed to create directory: {}", plugin_dir.display()))?;
        return Ok(plugin_dir);
    }

    let (user_dir, system_dir) = completion_dirs(shell, &home)?;
    if user_dir.exists() {
        return Ok(user_dir);
    }
    if let Some(system_dir) = system_dir.filter(|dir| dir.exists()) {
        return Ok(system_dir);
    }

    std::fs::create_dir_all(&user_dir)
        .with_context(|| format!("Failed to create directory: {}", user_dir.display()))?;
    Ok(user_dir)
}

/// Per-user and system-wide completion directories for a shell.
fn completion_dirs(shell: Shell, home: &Path) -> Result<(PathBuf, Option<PathBuf>)> {
    let dirs = match shell {
        Shell::Bash => (
            home.join(".bash_completion.d"),
            Some(PathBuf::from("/etc/bash_completion.d")),
        ),
        Shell::Fish => (
            home.join(".config/fish/completions"),
            Some(PathBuf::from("/usr/share/fish/completions")),
        ),
        Shell::Zsh => (
            home.join(".zsh/completions"),
            Some(PathBuf::from("/usr/share/zsh/site-functions")),
        ),
        Shell::Elvish => (home.join(".elvish"), None),
        Shell::PowerShell if cfg!(windows) => (home.join(r"Documents\PowerShell\completions"), None),
        Shell::PowerShell => (home.join(".config/powershell/completions"), None),
        _ => anyhow::bail!("Unsupported shell: {shell}"),
    };
    Ok(dirs)
}
