//! Error taxonomy for the extraction engine.
//!
//! Two groups:
//! - fatal for a file: the file produces no report
//!   (`MalformedEncoding`, `UnsupportedLanguage`)
//! - non-fatal: recorded as diagnostics on the report while the scan moves
//!   on to the next statement (`MalformedImport`, `MalformedFunctionHeader`)

use thiserror::Error;

/// Errors raised while analyzing a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The byte stream is not valid UTF-8.
    #[error("invalid UTF-8 at byte offset {offset}")]
    MalformedEncoding { offset: usize },

    /// No grammar is registered for the declared language tag.
    #[error("no grammar registered for language '{0}'")]
    UnsupportedLanguage(String),

    /// An import statement could not be resolved to a module identifier.
    #[error("line {line}: malformed import: {message}")]
    MalformedImport { line: usize, message: String },

    /// A function declaration header could not be parsed.
    #[error("line {line}: malformed function header: {message}")]
    MalformedFunctionHeader { line: usize, message: String },
}

impl ScanError {
    /// Whether this error prevents a report from being produced.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::MalformedEncoding { .. } | ScanError::UnsupportedLanguage(_)
        )
    }
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ScanError::MalformedEncoding { offset: 3 }.is_fatal());
        assert!(ScanError::UnsupportedLanguage("cobol".to_string()).is_fatal());
        assert!(!ScanError::MalformedImport {
            line: 1,
            message: "missing path".to_string()
        }
        .is_fatal());
        assert!(!ScanError::MalformedFunctionHeader {
            line: 2,
            message: "missing name".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_display() {
        let err = ScanError::UnsupportedLanguage("cobol".to_string());
        assert_eq!(err.to_string(), "no grammar registered for language 'cobol'");

        let err = ScanError::MalformedImport {
            line: 7,
            message: "missing path".to_string(),
        };
        assert_eq!(err.to_string(), "line 7: malformed import: missing path");
    }
}
