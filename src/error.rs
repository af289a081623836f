use std::io;
use thiserror::Error;

/// Error type for CSV reading, writing, and dialect inference.
///
/// Every variant maps to a stable numeric code (see [`CsvError::code`]) and
/// carries a human-readable reason. Row and field indices are zero-based and
/// exclude a captured header row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// The reader or writer was configured with conflicting options: a
    /// delimiter that is a prefix of another, an escape scalar colliding with
    /// a delimiter or the trim set, an empty delimiter, or empty inference
    /// candidate lists.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The input violates the configured dialect: a row width mismatch, a
    /// raw delimiter inside a field while escaping is disabled, or a
    /// malformed escaped field.
    #[error("invalid input at row {row}, field {field}: {reason}")]
    InvalidInput { reason: String, row: u64, field: u64 },

    /// No candidate dialect produced a positive pattern score.
    #[error("dialect inference failed: {reason}")]
    InferenceFailure { reason: String },

    /// The underlying reader or sink reported a failure, or the input was
    /// not valid UTF-8.
    #[error("stream failure: {message}")]
    Stream { message: String },

    /// The writer was driven out of protocol: too many fields in a row,
    /// ending an empty row before the width is known, or touching a closed
    /// writer.
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },
}

impl CsvError {
    /// Stable numeric code for this error kind.
    pub const fn code(&self) -> u16 {
        match self {
            CsvError::InvalidConfiguration { .. } => 1,
            CsvError::InvalidInput { .. } => 2,
            CsvError::InferenceFailure { .. } => 3,
            CsvError::Stream { .. } => 4,
            CsvError::InvalidOperation { .. } => 5,
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        CsvError::InvalidConfiguration { reason: reason.into() }
    }

    pub(crate) fn input(reason: impl Into<String>, row: u64, field: u64) -> Self {
        CsvError::InvalidInput { reason: reason.into(), row, field }
    }

    pub(crate) fn operation(reason: impl Into<String>) -> Self {
        CsvError::InvalidOperation { reason: reason.into() }
    }
}

impl From<io::Error> for CsvError {
    fn from(err: io::Error) -> Self {
        CsvError::Stream { message: err.to_string() }
    }
}

/// Result type alias for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, CsvError>;
