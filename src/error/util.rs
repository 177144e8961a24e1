//! Utility functions for error handling
//!
//! Helpers that check paths up front so that a missing input file or an
//! unwritable output directory fails with a message naming both the path and
//! what it was needed for.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{BiomarkerError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(BiomarkerError::io_error("File not found")
            .with_path(path)
            .context(format!("Needed for: {purpose}")));
    }

    if !path.is_file() {
        return Err(BiomarkerError::io_error("Path is not a file")
            .with_path(path)
            .context(format!("Expected a file for: {purpose}")));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            _ => format!("Failed to open file for: {purpose}"),
        };
        BiomarkerError::io_error_with_source(context, e).with_path(path)
    })
}

/// Check that a directory exists and is readable
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(BiomarkerError::io_error("Directory not found")
            .with_path(path)
            .context(format!("Needed for: {purpose}")));
    }

    if !path.is_dir() {
        return Err(BiomarkerError::io_error("Path is not a directory")
            .with_path(path)
            .context(format!("Expected a directory for: {purpose}")));
    }

    match fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    "Permission denied - check directory permissions".to_string()
                }
                _ => format!("Failed to access directory for: {purpose}"),
            };
            Err(BiomarkerError::io_error_with_source(context, e).with_path(path))
        }
    }
}

/// Create a directory (and parents) for output, with rich error information
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        BiomarkerError::io_error_with_source(
            format!("Failed to create directory for: {purpose}"),
            e,
        )
        .with_path(path)
    })
}
