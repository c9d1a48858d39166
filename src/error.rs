use std::fmt;
use serde::{Deserialize, Serialize};

/// Error types for parser construction and timestamp resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseError {
    /// Invalid parser configuration, raised once at construction time
    ConfigurationError {
        parameter: String,
        error_message: String,
    },
    /// Timestamp parsing failed
    TimestampParseError {
        input: String,
        attempted_formats: Vec<String>,
    },
    /// I/O error while reading input or configuration
    IoError {
        operation: String,
        error_message: String,
    },
}

impl ParseError {
    pub fn config(parameter: &str, error_message: impl Into<String>) -> Self {
        ParseError::ConfigurationError {
            parameter: parameter.to_string(),
            error_message: error_message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ConfigurationError { parameter, error_message } => {
                write!(f, "Configuration error for '{}': {}", parameter, error_message)
            }
            ParseError::TimestampParseError { input, attempted_formats } => {
                write!(f, "Failed to parse timestamp '{}', tried formats: {:?}", input, attempted_formats)
            }
            ParseError::IoError { operation, error_message } => {
                write!(f, "I/O error during {}: {}", operation, error_message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::IoError {
            operation: "read".to_string(),
            error_message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_configuration_error() {
        let err = ParseError::config("delimiter", "must be a single character. '::' is not.");
        assert_eq!(
            err.to_string(),
            "Configuration error for 'delimiter': must be a single character. '::' is not."
        );
    }

    #[test]
    fn test_display_timestamp_error_lists_formats() {
        let err = ParseError::TimestampParseError {
            input: "yesterday".to_string(),
            attempted_formats: vec!["RFC3339".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("yesterday"));
        assert!(text.contains("RFC3339"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        match ParseError::from(io) {
            ParseError::IoError { error_message, .. } => assert_eq!(error_message, "missing"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
