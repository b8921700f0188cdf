//! Error types for the recaller application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during note management and review operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the recaller application.
#[derive(Error, Debug)]
pub enum RecallError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to zip operations.
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// A required note field was empty or whitespace-only.
    #[error("Validation failed: {field} must not be empty")]
    Validation { field: &'static str },

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// A session method was called in a state that forbids it.
    #[error("Invalid session action: {message}")]
    SessionViolation { message: String },

    /// Errors related to backup operations.
    #[error("Backup failed: {message}")]
    BackupFailed { message: String },

    /// Error when attempting to restore from backup.
    #[error("Restore failed: {message}")]
    RestoreFailed { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },
}
