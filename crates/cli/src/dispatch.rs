//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;

pub(crate) fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge { sources, output } => commands::merge::run(&sources, output),
        Commands::EnvKey { paths, prefix } => commands::env_key::run(&paths, &prefix),
    }
}
