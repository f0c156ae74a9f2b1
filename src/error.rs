//! Error types for the poster renderer

use thiserror::Error;

/// Result type alias for render and export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or exporting a poster
#[derive(Error, Debug)]
pub enum Error {
    /// The physical pixel buffer could not be allocated
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// A font face or font source could not be loaded
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    /// Export was requested before any render completed
    #[error("Nothing to export: no poster has been rendered yet")]
    ExportWithoutRender,

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodeError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem error while writing an export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
