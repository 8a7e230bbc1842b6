//! Error types for spectra-oxide
//!
//! Numeric and geometric edge cases are resolved locally with fallback values
//! (zero intensity, empty curve). The variants here cover what callers can
//! actually act on: malformed curve data, degenerate transforms and I/O.

use thiserror::Error;

/// Main error type for spectra-oxide operations
#[derive(Error, Debug)]
pub enum SpectraError {
    /// Malformed sample lists handed to a curve constructor
    #[error("Invalid curve data: {reason}")]
    InvalidCurveData { reason: String },

    /// Zero-extent (or non-finite) domain or viewport rectangle
    #[error("Degenerate transform: {axis} extent is {extent}")]
    DegenerateTransform { axis: &'static str, extent: f64 },

    /// Identifier not known to the spectrum library
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// Polars data processing error
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Column not found in a spectrum file
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Unsupported file format
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for spectra-oxide operations
pub type Result<T> = std::result::Result<T, SpectraError>;

impl SpectraError {
    /// Shorthand for building an [`SpectraError::InvalidCurveData`]
    pub fn invalid_curve(reason: impl Into<String>) -> Self {
        SpectraError::InvalidCurveData {
            reason: reason.into(),
        }
    }

    /// Get a user-friendly error message suitable for displaying in UI
    pub fn user_message(&self) -> String {
        match self {
            SpectraError::InvalidCurveData { reason } => format!("Curve data error: {}", reason),
            SpectraError::DegenerateTransform { axis, .. } => {
                format!("Plot range on the {} axis is empty", axis)
            }
            SpectraError::UnknownIdentifier(id) => format!("Unknown fluorophore '{}'", id),
            SpectraError::FileIo(e) => format!("File error: {}", e),
            SpectraError::Polars(e) => format!("Data error: {}", e),
            SpectraError::Config(msg) => format!("Config error: {}", msg),
            SpectraError::ColumnNotFound { column } => {
                format!("Column '{}' not found", column)
            }
            SpectraError::UnsupportedFormat { extension } => {
                format!("Unsupported file format: '.{}'", extension)
            }
            SpectraError::Json(e) => format!("JSON error: {}", e),
        }
    }

    /// Get a short title for the error (for toast notifications)
    pub fn title(&self) -> &'static str {
        match self {
            SpectraError::InvalidCurveData { .. } => "Invalid Curve",
            SpectraError::DegenerateTransform { .. } => "Empty Plot Range",
            SpectraError::UnknownIdentifier(_) => "Unknown Fluorophore",
            SpectraError::FileIo(_) => "File Error",
            SpectraError::Polars(_) => "Data Error",
            SpectraError::Config(_) => "Configuration Error",
            SpectraError::ColumnNotFound { .. } => "Column Not Found",
            SpectraError::UnsupportedFormat { .. } => "Unsupported Format",
            SpectraError::Json(_) => "JSON Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SpectraError::ColumnNotFound {
            column: "wavelength".to_string(),
        };
        assert_eq!(err.user_message(), "Column 'wavelength' not found");
        assert_eq!(err.title(), "Column Not Found");

        let err = SpectraError::DegenerateTransform {
            axis: "x",
            extent: 0.0,
        };
        assert_eq!(err.user_message(), "Plot range on the x axis is empty");
        assert_eq!(err.to_string(), "Degenerate transform: x extent is 0");

        let err = SpectraError::invalid_curve("2 wavelengths but 3 intensities");
        assert_eq!(
            err.to_string(),
            "Invalid curve data: 2 wavelengths but 3 intensities"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SpectraError = io_err.into();
        assert!(matches!(err, SpectraError::FileIo(_)));
    }
}
