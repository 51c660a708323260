//! Configuration for mass rename operations.

use std::path::PathBuf;
use std::{fmt, fs};

use anyhow::Context;
use serde::Deserialize;

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct MassRenameConfig {
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub ignorecase: bool,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    massrename: MassRenameConfig,
}

/// A complete rename request.
///
/// Built once from CLI arguments and the user config file, never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameRequest {
    pub directory: PathBuf,
    pub pattern: String,
    pub replacement: String,
    pub recursive: bool,
    pub ignorecase: bool,
    pub force: bool,
    pub verbose: bool,
    pub dryrun: bool,
}

impl MassRenameConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = crate::config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.massrename)
            .context("Failed to parse massrename config TOML")
    }
}

impl fmt::Display for RenameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  directory:   {}", self.directory.display())?;
        writeln!(f, "  pattern:     \"{}\"", self.pattern)?;
        writeln!(f, "  replacement: \"{}\"", self.replacement)?;
        writeln!(f, "  dryrun:      {}", crate::colorize_bool(self.dryrun))?;
        writeln!(f, "  force:       {}", crate::colorize_bool(self.force))?;
        writeln!(f, "  ignorecase:  {}", crate::colorize_bool(self.ignorecase))?;
        writeln!(f, "  recursive:   {}", crate::colorize_bool(self.recursive))?;
        write!(f, "  verbose:     {}", crate::colorize_bool(self.verbose))
    }
}

#[cfg(test)]
mod mass_rename_config_tests {
    use super::*;

    #[test]
    fn from_toml_str_parses_empty_config() {
        let config = MassRenameConfig::from_toml_str("").unwrap();
        assert!(!config.dryrun);
        assert!(!config.force);
        assert!(!config.ignorecase);
        assert!(!config.recursive);
        assert!(!config.verbose);
    }

    #[test]
    fn from_toml_str_parses_massrename_section() {
        let toml = r"
[massrename]
force = true
ignorecase = true
recursive = true
";
        let config = MassRenameConfig::from_toml_str(toml).unwrap();
        assert!(config.force);
        assert!(config.ignorecase);
        assert!(config.recursive);
        assert!(!config.verbose);
        assert!(!config.dryrun);
    }

    #[test]
    fn from_toml_str_ignores_other_sections() {
        let toml = r"
[dots]
verbose = false

[massrename]
verbose = true
";
        let config = MassRenameConfig::from_toml_str(toml).unwrap();
        assert!(config.verbose);
        assert!(!config.force);
    }

    #[test]
    fn from_toml_str_invalid_toml_returns_error() {
        let result = MassRenameConfig::from_toml_str("this is not valid toml {{{");
        assert!(result.is_err());
    }

    #[test]
    fn from_toml_str_wrong_type_returns_error() {
        let toml = r#"
[massrename]
force = "yes"
"#;
        assert!(MassRenameConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn rename_request_display_lists_pattern() {
        let request = RenameRequest {
            directory: PathBuf::from("/tmp/files"),
            pattern: r"(.*)\.txt".to_string(),
            replacement: r"\1.bak".to_string(),
            ..Default::default()
        };
        let output = request.to_string();
        assert!(output.contains(r#"pattern:     "(.*)\.txt""#));
        assert!(output.contains(r#"replacement: "\1.bak""#));
    }
}
