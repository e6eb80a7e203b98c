//! Error types for the clustering core.

use thiserror::Error;

/// Errors surfaced to the orchestrating caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A mutating call reached an instance after `destroy()`.
    #[error("map instance has been destroyed")]
    Destroyed,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The property list is longer than the ingestion cap; nothing was replaced.
    #[error("property list of {count} exceeds the cap of {cap}")]
    CapsExceeded { count: usize, cap: usize },
}

/// A map engine query that could not be answered. Always recovered locally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    /// The engine has not initialized the requested state yet.
    #[error("{0} is not available yet")]
    Unavailable(&'static str),

    #[error("{0} returned an unusable value")]
    InvalidValue(&'static str),

    /// The native call itself failed.
    #[error("engine call failed: {0}")]
    Engine(String),

    #[error("adapter has been destroyed")]
    Destroyed,
}

/// A native marker operation rejected by the engine. Logged, never propagated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarkerError {
    #[error("failed to create marker: {0}")]
    Create(String),

    #[error("failed to remove marker: {0}")]
    Remove(String),

    #[error("failed to move marker: {0}")]
    Update(String),

    #[error("failed to restyle marker: {0}")]
    Restyle(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("threshold table '{0}' is empty")]
    EmptyTable(&'static str),

    /// Breakpoints must be listed by strictly increasing zoom.
    #[error("threshold table '{table}' is not ordered at entry {index}")]
    UnorderedTable { table: &'static str, index: usize },

    /// Pixel values must be finite, positive and never grow with zoom.
    #[error("threshold table '{table}' has an invalid pixel value at entry {index}")]
    InvalidPixels { table: &'static str, index: usize },

    #[error("radius override '{0}' must be finite and positive")]
    InvalidRadius(&'static str),

    #[error("minimum threshold must be finite and positive")]
    InvalidFloor,

    #[error("malformed configuration document: {0}")]
    Json(String),
}
