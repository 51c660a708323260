mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use mass_rename::mass_rename::MassRename;

use crate::config::Config;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename files and directories matching a regex pattern"
)]
pub struct Args {
    /// Directory containing the entries to rename
    #[arg(value_hint = clap::ValueHint::DirPath, required_unless_present = "completion")]
    directory: Option<PathBuf>,

    /// Regex pattern matched against the start of each name
    #[arg(required_unless_present = "completion")]
    pattern: Option<String>,

    /// Replacement template, use \1 or \g<name> for captured groups
    #[arg(required_unless_present = "completion")]
    replacement: Option<String>,

    /// Rename without asking for confirmation
    #[arg(short, long)]
    force: bool,

    /// Match case-insensitively
    #[arg(short, long)]
    ignorecase: bool,

    /// Only print changes without renaming
    #[arg(short, long)]
    print: bool,

    /// Recurse into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output and confirm each rename separately
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(shell) = args.completion {
        mass_rename::generate_shell_completion(shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        let request = Config::from_args(args)?.into_request();
        MassRename::new(request)?.run()?;
        Ok(())
    }
}
