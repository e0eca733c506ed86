//! Error types for loading crash data and dashboard configuration.
//!
//! Row-level problems (unparsable numbers, unknown months, missing columns)
//! never surface here; the cleaning pipeline degrades them to absent values.

use thiserror::Error;

/// Errors while reading the source table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to open or read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader could not produce a header row.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row.
    #[error("CSV file has no header row")]
    NoHeaders,

    /// Only CSV input is supported.
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

/// Errors while reading the optional JSON configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_names_the_extension() {
        let err = LoadError::UnsupportedExtension("xlsx".into());
        assert_eq!(err.to_string(), "Unsupported file extension: .xlsx");
    }

    #[test]
    fn json_error_converts_into_config_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(err.to_string().starts_with("Invalid config JSON"));
    }
}
