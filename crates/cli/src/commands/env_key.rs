//! Environment key command.

use anyhow::Result;
use confucius::format_env_key;

/// Print one key per path, in argument order.
pub fn run(paths: &[String], prefix: &str) -> Result<()> {
    for path in paths {
        println!("{}", format_env_key(path, prefix));
    }
    Ok(())
}
