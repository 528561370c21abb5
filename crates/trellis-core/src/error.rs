//! # Trellis Core Errors
//!
//! Defines [`Error`], the top-level enum aggregating the typed errors of
//! each subsystem, and the crate-wide [`Result`] alias. Subsystem errors
//! convert into it with `?`; callers that care about a specific failure
//! match on the wrapped variant.

use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::hooks::error::HookError;
use crate::lifecycle::error::LifecycleError;
use crate::version::VersionError;

/// Top-level error type for the Trellis plugin engine
#[derive(Debug, ThisError)]
pub enum Error {
    /// Version parsing or constraint error
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Hook dispatch error
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    /// Lifecycle engine error
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Manifest (de)serialization error
    #[error("Manifest serialization error: {0}")]
    ManifestFormat(#[from] serde_json::Error),

    /// Anything that does not fit the categories above
    #[error("{0}")]
    Other(String),
}

/// Result type alias using the top-level [`Error`]
pub type Result<T> = StdResult<T, Error>;
