//! Command implementations.

pub mod env_key;
pub mod merge;
