//! Configuration surfaces shared by readers and writers.

use crate::delimiter::{Delimiter, RowDelimiterSet};

/// Default number of scalars pre-buffered for dialect inference.
pub const DEFAULT_SAMPLE_SCALARS: usize = 500;

/// Field delimiter configuration: a concrete delimiter, or a candidate list
/// handed to the inferrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDelimiter {
    /// Use this delimiter as-is.
    Use(Delimiter),
    /// Infer the delimiter from the listed candidates.
    Infer(Vec<Delimiter>),
}

impl FieldDelimiter {
    /// A concrete comma delimiter.
    pub fn comma() -> Self {
        FieldDelimiter::Use(Delimiter::from_scalar(','))
    }

    /// Infer among the common candidates: comma, semicolon, tab.
    pub fn infer_default() -> Self {
        FieldDelimiter::Infer(vec![
            Delimiter::from_scalar(','),
            Delimiter::from_scalar(';'),
            Delimiter::from_scalar('\t'),
        ])
    }
}

impl Default for FieldDelimiter {
    fn default() -> Self {
        FieldDelimiter::comma()
    }
}

/// Row delimiter configuration: a concrete set of alternatives, or a
/// candidate list handed to the inferrer (each candidate is treated as a
/// one-element set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDelimiter {
    /// Use this set as-is; multiple alternatives allow mixed line endings.
    Use(RowDelimiterSet),
    /// Infer the row delimiter from the listed candidates.
    Infer(Vec<Delimiter>),
}

impl RowDelimiter {
    /// The conventional newline set `{"\n", "\r\n"}`.
    pub fn standard() -> Self {
        RowDelimiter::Use(RowDelimiterSet::standard())
    }

    /// Infer between `"\n"` and `"\r\n"`.
    pub fn infer_default() -> Self {
        RowDelimiter::Infer(vec![
            Delimiter::from_scalar('\n'),
            Delimiter::from_scalars(vec!['\r', '\n']),
        ])
    }
}

impl Default for RowDelimiter {
    fn default() -> Self {
        RowDelimiter::standard()
    }
}

/// Field escaping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escape {
    /// No escaping; fields cannot contain delimiter sequences.
    None,
    /// The conventional double quote.
    #[default]
    DoubleQuote,
    /// A custom escape scalar.
    Scalar(char),
}

impl Escape {
    /// The configured escape scalar, if any.
    pub const fn scalar(&self) -> Option<char> {
        match self {
            Escape::None => None,
            Escape::DoubleQuote => Some('"'),
            Escape::Scalar(scalar) => Some(*scalar),
        }
    }
}

/// Header strategy for readers and writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Header {
    /// No header row.
    #[default]
    None,
    /// The first row is a header; it is captured separately and excluded
    /// from row indexing.
    FirstLine,
}

/// Scalars stripped from the edges of unescaped fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Trim {
    /// No trimming.
    #[default]
    None,
    /// Trim spaces and tabs.
    Whitespace,
    /// Trim a custom scalar set.
    Scalars(Vec<char>),
}

const WHITESPACE_SCALARS: &[char] = &[' ', '\t'];

impl Trim {
    /// The scalar set this strategy strips.
    pub fn scalars(&self) -> &[char] {
        match self {
            Trim::None => &[],
            Trim::Whitespace => WHITESPACE_SCALARS,
            Trim::Scalars(scalars) => scalars,
        }
    }
}

/// Byte order mark policy for writer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BomPolicy {
    /// Follow the encoding convention; UTF-8 output carries no mark.
    #[default]
    Convention,
    /// Always emit a mark.
    Always,
    /// Never emit a mark.
    Never,
}
