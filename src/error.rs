//! Error types for Hello Project
//!
//! This module defines all error types used throughout the crate.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for Hello Project operations.
#[derive(Error, Debug)]
pub enum HelloError {
    /// Configuration-related errors (bad environment values, plugins whose
    /// self-validation fails, unreadable plugin directories, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The merged configuration does not fit the settings schema
    /// (unknown field, wrong type).
    #[error("Configuration validation failed: {0}")]
    Validation(String),

    /// A config file with an extension other than `.yaml`, `.yml` or `.json`.
    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),

    /// A located config file could not be read or parsed.
    #[error("Failed to load config file {}: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },

    /// Plugin construction or execution errors.
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for Hello Project operations.
pub type Result<T> = std::result::Result<T, HelloError>;
