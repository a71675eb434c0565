//! Output formatters for CLI commands.

use anyhow::Result;
use confucius::Tree;

use crate::args::OutputFormat;

/// Render a tree, terminated by a newline.
pub fn format_tree(tree: &Tree, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(tree)?;
            out.push('\n');
            out
        }
        // serde_yaml already terminates the document.
        OutputFormat::Yaml => serde_yaml::to_string(tree)?,
    };
    Ok(rendered)
}
