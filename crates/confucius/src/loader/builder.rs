//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` describing where configuration
//!   comes from.
//! - Run a load: find files, merge trees, substitute references, decode, and
//!   resolve policies.
//!
//! Does NOT handle:
//! - Document parsing (delegated to source.rs).
//! - Profile file naming (delegated to profile.rs).
//! - Per-field policies (delegated to `policy.rs`).
//!
//! Invariants / Assumptions:
//! - A loader holds no state between loads; every `load` reads the
//!   filesystem and the environment afresh.
//! - When a literal is supplied, the primary file is optional and its values
//!   win over the literal's.
//! - A missing profile overlay is always an error.

use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use super::Tree;
use super::decode::decode_record;
use super::error::ConfigError;
use super::merge::merge_into;
use super::profile::find_profile_file;
use super::source::{Format, find_file, read_file};
use crate::coerce::{Coercer, TimeLayout};
use crate::constants::{
    DEFAULT_DIR, DEFAULT_FILENAME, DEFAULT_PROFILE_LAYOUT, DEFAULT_TAG, DOTENV_DISABLED_VAR,
};
use crate::env::expand_tree;
use crate::field::{Config, walk};
use crate::policy::Resolver;

/// In-memory document merged beneath the primary file.
#[derive(Debug, Clone)]
struct Literal {
    text: String,
    format: Format,
}

/// Loads layered configuration into `#[derive(Config)]` records.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    filename: String,
    dirs: Vec<PathBuf>,
    tag: String,
    time_layout: TimeLayout,
    env_prefix: Option<String>,
    literal: Option<Literal>,
    profiles: Vec<String>,
    profile_layout: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader for `config.yaml` in the working directory.
    pub fn new() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            dirs: vec![PathBuf::from(DEFAULT_DIR)],
            tag: DEFAULT_TAG.to_string(),
            time_layout: TimeLayout::default(),
            env_prefix: None,
            literal: None,
            profiles: Vec::new(),
            profile_layout: DEFAULT_PROFILE_LAYOUT.to_string(),
        }
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                debug!(path = %path.display(), "loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Set the primary file name; its extension selects the format.
    pub fn with_file(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the directories searched, in order, for the primary and profile files.
    pub fn with_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the tag key whose alt names are used for keys and paths.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the layout used to parse timestamp fields.
    pub fn with_time_layout(mut self, layout: TimeLayout) -> Self {
        self.time_layout = layout;
        self
    }

    /// Overlay environment variables, keyed `PREFIX_FIELD_PATH`.
    ///
    /// An empty prefix keys variables by the bare field path.
    pub fn with_env(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Supply an in-memory document.
    ///
    /// The primary file becomes optional. When both exist, the file is merged
    /// over the literal, so file values win.
    pub fn with_literal(mut self, text: impl Into<String>, format: Format) -> Self {
        self.literal = Some(Literal {
            text: text.into(),
            format,
        });
        self
    }

    /// Supply an in-memory document read from `reader`.
    ///
    /// See [`ConfigLoader::with_literal`].
    pub fn from_reader<R: Read>(self, mut reader: R, format: Format) -> Result<Self, ConfigError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(ConfigError::ReaderRead)?;
        Ok(self.with_literal(text, format))
    }

    /// Set the profiles overlaid, in order, on the primary file.
    pub fn with_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the profile file name layout (default `config.test.yaml`).
    pub fn with_profile_layout(mut self, layout: impl Into<String>) -> Self {
        self.profile_layout = layout.into();
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Merge every configured source into one tree with references expanded.
    ///
    /// This is the tree `load` decodes; environment overlays and policies are
    /// not part of it.
    pub fn resolve_tree(&self) -> Result<Tree, ConfigError> {
        let mut tree = match find_file(&self.filename, &self.dirs) {
            Ok(path) => {
                debug!(path = %path.display(), "reading configuration file");
                read_file(&path)?
            }
            Err(err) if self.literal.is_some() && err.is_file_not_found() => {
                debug!(file = %self.filename, "configuration file not found, using literal only");
                Tree::new()
            }
            Err(err) => return Err(err),
        };

        if let Some(literal) = &self.literal {
            let mut base = literal.format.parse(&literal.text, "configuration literal")?;
            merge_into(&mut base, tree)?;
            tree = base;
        }

        for profile in &self.profiles {
            let path = find_profile_file(&self.profile_layout, &self.filename, profile, &self.dirs)?;
            debug!(profile = %profile, path = %path.display(), "applying profile");
            let overlay = read_file(&path)?;
            merge_into(&mut tree, overlay)?;
        }

        expand_tree(&mut tree)?;
        Ok(tree)
    }

    /// Load configuration into `cfg`.
    ///
    /// Fields absent from every source keep their current values, so `cfg`
    /// may carry programmatic defaults. Policy failures are collected for all
    /// fields and returned together as [`ConfigError::Fields`].
    pub fn load<T: Config>(&self, cfg: &mut T) -> Result<(), ConfigError> {
        let tree = self.resolve_tree()?;
        let coercer = Coercer::new(self.time_layout.clone());
        decode_record(&tree, cfg, &self.tag, &coercer)?;

        let leaves = walk(cfg, &self.tag);
        debug!(leaves = leaves.len(), "resolving field policies");

        let resolver = match &self.env_prefix {
            Some(prefix) => Resolver::new(&coercer).with_env(prefix),
            None => Resolver::new(&coercer),
        };
        resolver.resolve_all(leaves)?;
        Ok(())
    }
}
