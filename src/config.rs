use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/mass-rename.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Get the user config file path if the home directory is known.
#[must_use]
pub fn config_path() -> Option<&'static Path> {
    CONFIG_PATH.as_deref()
}
