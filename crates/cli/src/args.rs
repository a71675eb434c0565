//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Translate source options into a `ConfigLoader`.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use confucius::{ConfigLoader, Format};

#[derive(Parser)]
#[command(name = "confucius")]
#[command(about = "Inspect layered configuration files, profiles and environment keys", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  confucius merge --file server.yaml --dir config --profile test\n  confucius merge --literal base.json --output yaml\n  confucius env-key logger.log_level spec.containers[0].image --prefix app\n"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the merged configuration tree with references expanded
    Merge {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Print the environment variable keys for field paths
    EnvKey {
        /// Field paths such as `logger.log_level` or `spec.containers[0].image`
        #[arg(required = true)]
        paths: Vec<String>,

        /// Prefix prepended to every key (empty for bare keys)
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
}

/// Where the merged configuration comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Primary configuration file name; its extension selects the format
    #[arg(short, long, env = "CONFUCIUS_FILE", default_value = "config.yaml")]
    pub file: String,

    /// Directory searched for the file and its profiles (repeatable, in order)
    #[arg(short, long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Profile overlaid on the primary file (repeatable, in order)
    #[arg(long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Profile file name layout
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<String>,

    /// Document merged beneath the primary file, which becomes optional
    #[arg(long, value_name = "FILE")]
    pub literal: Option<PathBuf>,

    /// Format of the literal document when its extension does not say
    #[arg(long, value_name = "FORMAT", requires = "literal")]
    pub literal_format: Option<Format>,
}

impl SourceArgs {
    /// Build the loader these options describe.
    pub fn loader(&self) -> Result<ConfigLoader> {
        let mut loader = ConfigLoader::new().with_file(self.file.clone());

        if !self.dirs.is_empty() {
            loader = loader.with_dirs(self.dirs.iter().cloned());
        }
        if !self.profiles.is_empty() {
            loader = loader.with_profiles(self.profiles.iter().cloned());
        }
        if let Some(layout) = &self.layout {
            loader = loader.with_profile_layout(layout.clone());
        }
        if let Some(path) = &self.literal {
            let format = match self.literal_format {
                Some(format) => format,
                None => Format::from_path(path)?,
            };
            let file = File::open(path)
                .with_context(|| format!("Failed to open literal {}", path.display()))?;
            loader = loader.from_reader(file, format)?;
        }

        Ok(loader)
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}
