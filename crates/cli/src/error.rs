//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `ConfigError` variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 2 is left to clap for usage errors.

use confucius::ConfigError;

/// Structured exit codes for the `confucius` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// A configuration or profile file was not found in any directory.
    NotFound = 4,

    /// A source could not be parsed, merged, substituted or validated.
    ///
    /// Scripts should fix the input and not retry.
    ValidationError = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::FileNotFound { .. } => ExitCode::NotFound,

            ConfigError::UnsupportedFormat { .. }
            | ConfigError::Parse { .. }
            | ConfigError::Merge(_)
            | ConfigError::Substitution(_)
            | ConfigError::Decode(_)
            | ConfigError::Fields(_)
            | ConfigError::DotenvParse { .. } => ExitCode::ValidationError,

            ConfigError::ConfigFileRead { .. }
            | ConfigError::ReaderRead(_)
            | ConfigError::DotenvIo { .. }
            | ConfigError::DotenvUnknown => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no `ConfigError` is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        self.chain()
            .find_map(|cause| cause.downcast_ref::<ConfigError>())
            .map_or(ExitCode::GeneralError, ExitCode::from)
    }
}
