// src/error.rs

//! Crate-level error type
//!
//! Module-scoped conversion problems live in [`crate::convert::ConversionError`];
//! this type covers loading graphs and options and reporting a failed batch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid module graph: {0}")]
    InvalidGraph(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Conversion failed for {count} module(s)")]
    ConversionFailed { count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
