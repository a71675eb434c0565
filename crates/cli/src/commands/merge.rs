//! Merged tree command.
//!
//! Responsibilities:
//! - Resolve the configured sources into one tree and print it.
//!
//! Does NOT handle:
//! - Decoding into records or applying environment overlays; those need a
//!   record type and happen in `ConfigLoader::load`.
//!
//! Invariants:
//! - Output is always written to stdout.

use anyhow::Result;
use tracing::debug;

use crate::args::{OutputFormat, SourceArgs};
use crate::formatters;

pub fn run(sources: &SourceArgs, output: OutputFormat) -> Result<()> {
    let loader = sources.loader()?;
    debug!(
        file = loader.filename(),
        dirs = loader.dirs().len(),
        "resolving configuration tree"
    );

    let tree = loader.resolve_tree()?;
    print!("{}", formatters::format_tree(&tree, output)?);
    Ok(())
}
