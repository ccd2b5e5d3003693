use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all diamond operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DiamondError {
    /// Invalid or unreadable resolver configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.diamond/config.toml for syntax errors"))]
    Config { message: String },

    /// Malformed package metadata (registration tree).
    #[error("Metadata error: {message}")]
    Metadata { message: String },

    /// Conflict resolution did not reach a consistent package set.
    #[error("Unresolved dependency conflict: {message}")]
    #[diagnostic(help(
        "Pin the conflicting packages to compatible versions or raise `resolve.patience`"
    ))]
    Resolution { message: String },

    /// Exhaustive search could not produce a solution.
    #[error("Search failed: {message}")]
    Search { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type DiamondResult<T> = miette::Result<T>;
