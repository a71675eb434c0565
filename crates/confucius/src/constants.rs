//! Centralized constants for the confucius loader.
//!
//! This module contains the default values a `ConfigLoader` starts from so the
//! builder, the CLI and the tests agree on them.

// =============================================================================
// File Lookup Defaults
// =============================================================================

/// Default filename of the configuration file searched for.
pub const DEFAULT_FILENAME: &str = "config.yaml";

/// Default directory searched for the configuration file.
pub const DEFAULT_DIR: &str = ".";

// =============================================================================
// Field Metadata Defaults
// =============================================================================

/// Default tag key whose alt names are used for field paths.
///
/// Alt names for this key are declared with `#[conf(name = "...")]`.
pub const DEFAULT_TAG: &str = "conf";

// =============================================================================
// Profiles
// =============================================================================

/// Default profile filename layout.
///
/// `config` is replaced by the primary file's stem, `test` by the profile name
/// and `yaml` by the primary file's extension, e.g. `server.prod.json`.
pub const DEFAULT_PROFILE_LAYOUT: &str = "config.test.yaml";

/// Layout token standing for the primary file's stem.
pub const PROFILE_TOKEN_BASE: &str = "config";

/// Layout token standing for the profile name.
pub const PROFILE_TOKEN_PROFILE: &str = "test";

/// Layout token standing for the primary file's extension.
pub const PROFILE_TOKEN_EXTENSION: &str = "yaml";

// =============================================================================
// Environment
// =============================================================================

/// Environment variable that disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";
