use anyhow::Context;

use mass_rename::mass_rename::{MassRenameConfig, RenameRequest};

use crate::Args;

/// Final config created from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    request: RenameRequest,
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing,
    /// or the config file cannot be read or parsed.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let user_config = MassRenameConfig::get_user_config()?;
        Self::from_args_and_user_config(args, user_config)
    }

    fn from_args_and_user_config(args: Args, user_config: MassRenameConfig) -> anyhow::Result<Self> {
        let request = RenameRequest {
            directory: args.directory.context("Missing directory argument")?,
            pattern: args.pattern.context("Missing pattern argument")?,
            replacement: args.replacement.context("Missing replacement argument")?,
            recursive: args.recursive || user_config.recursive,
            ignorecase: args.ignorecase || user_config.ignorecase,
            force: args.force || user_config.force,
            verbose: args.verbose || user_config.verbose,
            dryrun: args.print || user_config.dryrun,
        };
        Ok(Self { request })
    }

    pub fn into_request(self) -> RenameRequest {
        self.request
    }
}
