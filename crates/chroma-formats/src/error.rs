//! Error types for LUT file handling.

use std::fmt;
use std::io;

use chroma_lut::LutError;
use chroma_ops::OpError;
use thiserror::Error;

/// Result type for file format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// A malformed line or header in a LUT file.
///
/// Carries the file it came from and, when the failure is tied to one line,
/// the 1-based line number and the raw line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Format label, e.g. `.itx`.
    pub format: String,
    /// File name or other label of the input.
    pub source_name: String,
    /// 1-based line number of the offending line.
    pub line: Option<usize>,
    /// Raw text of the offending line.
    pub line_text: String,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    /// Creates an error not tied to a line.
    pub fn new(
        format: impl Into<String>,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            format: format.into(),
            source_name: source_name.into(),
            line: None,
            line_text: String::new(),
            message: message.into(),
        }
    }

    /// Attaches the offending line.
    pub fn at_line(mut self, line: usize, text: impl Into<String>) -> Self {
        self.line = Some(line);
        self.line_text = text.into();
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error parsing {} file ({}).  ", self.format, self.source_name)?;
        if let Some(line) = self.line {
            write!(f, "At line ({line}): '{}'.  ", self.line_text)?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while reading, building or baking LUT files.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Malformed input text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Declared LUT size disagrees with the number of samples in the file.
    #[error(
        "Incorrect number of LUT entries in '{source_name}': found {found}, expected {expected}."
    )]
    ShapeMismatch {
        /// File name or other label of the input.
        source_name: String,
        /// Entries the declared size requires.
        expected: usize,
        /// Entries actually present.
        found: usize,
    },

    /// No registered format matches the name or extension.
    #[error("unknown LUT file format: {0}")]
    UnknownFormat(String),

    /// The format does not support the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Op construction or rendering failed.
    #[error(transparent)]
    Op(#[from] OpError),

    /// LUT construction failed.
    #[error(transparent)]
    Lut(#[from] LutError),

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A pipeline config could not be deserialized.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}
