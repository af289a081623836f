//! Delimiter values, validated delimiter pairs, and concrete dialects.

use std::fmt;

use crate::error::{CsvError, Result};

/// A non-empty ordered sequence of Unicode scalars recognized atomically.
///
/// Equality and hashing are by scalar sequence. Delimiters are created at
/// configuration time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiter {
    scalars: Vec<char>,
}

impl Delimiter {
    /// Create a delimiter from a string of scalars. Empty input is an
    /// invalid configuration.
    pub fn new<S: AsRef<str>>(scalars: S) -> Result<Self> {
        let scalars: Vec<char> = scalars.as_ref().chars().collect();
        if scalars.is_empty() {
            return Err(CsvError::config("a delimiter must contain at least one scalar"));
        }
        Ok(Self { scalars })
    }

    /// Create a single-scalar delimiter.
    pub fn from_scalar(scalar: char) -> Self {
        Self { scalars: vec![scalar] }
    }

    /// Internal infallible constructor for known non-empty sequences.
    pub(crate) fn from_scalars(scalars: Vec<char>) -> Self {
        debug_assert!(!scalars.is_empty());
        Self { scalars }
    }

    pub fn scalars(&self) -> &[char] {
        &self.scalars
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `self` is a prefix of `other` (a delimiter is a prefix of
    /// itself).
    pub fn is_prefix_of(&self, other: &Delimiter) -> bool {
        other.scalars.starts_with(&self.scalars)
    }

    pub fn contains_scalar(&self, scalar: char) -> bool {
        self.scalars.contains(&scalar)
    }

    /// The delimiter as owned text, useful for substring checks on output.
    pub fn as_string(&self) -> String {
        self.scalars.iter().collect()
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scalar in &self.scalars {
            match scalar {
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                '\t' => write!(f, "\\t")?,
                s => write!(f, "{s}")?,
            }
        }
        Ok(())
    }
}

impl From<char> for Delimiter {
    fn from(scalar: char) -> Self {
        Delimiter::from_scalar(scalar)
    }
}

impl TryFrom<&str> for Delimiter {
    type Error = CsvError;

    fn try_from(scalars: &str) -> Result<Self> {
        Delimiter::new(scalars)
    }
}

/// A non-empty set of delimiters recognized as row terminators.
///
/// Elements are deduplicated and held longest-first so that matching tries
/// the most specific candidate first and set equality ignores input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowDelimiterSet {
    delimiters: Vec<Delimiter>,
}

impl RowDelimiterSet {
    pub fn new(delimiters: Vec<Delimiter>) -> Result<Self> {
        if delimiters.is_empty() {
            return Err(CsvError::config("a row delimiter set must contain at least one delimiter"));
        }
        let mut delimiters = delimiters;
        delimiters.sort_by(|a, b| {
            b.len().cmp(&a.len()).then_with(|| a.scalars().cmp(b.scalars()))
        });
        delimiters.dedup();
        Ok(Self { delimiters })
    }

    /// A set wrapping a single delimiter.
    pub fn single(delimiter: Delimiter) -> Self {
        Self { delimiters: vec![delimiter] }
    }

    /// The conventional newline set `{"\n", "\r\n"}`.
    pub fn standard() -> Self {
        Self {
            delimiters: vec![
                Delimiter::from_scalars(vec!['\r', '\n']),
                Delimiter::from_scalar('\n'),
            ],
        }
    }

    /// Member delimiters, longest first.
    pub fn delimiters(&self) -> &[Delimiter] {
        &self.delimiters
    }

    pub fn len(&self) -> usize {
        self.delimiters.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains_scalar(&self, scalar: char) -> bool {
        self.delimiters.iter().any(|d| d.contains_scalar(scalar))
    }

    pub(crate) fn total_scalar_len(&self) -> usize {
        self.delimiters.iter().map(Delimiter::len).sum()
    }
}

impl fmt::Display for RowDelimiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, delimiter) in self.delimiters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{delimiter}")?;
        }
        write!(f, "}}")
    }
}

/// The validated field/row delimiter pair used by the tokenizer.
///
/// Neither the field delimiter nor any row delimiter may be a prefix of the
/// other, in either direction; otherwise matching would be ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    field: Delimiter,
    rows: RowDelimiterSet,
}

impl Delimiters {
    pub fn new(field: Delimiter, rows: RowDelimiterSet) -> Result<Self> {
        for row in rows.delimiters() {
            if field.is_prefix_of(row) || row.is_prefix_of(&field) {
                return Err(CsvError::config(format!(
                    "field delimiter {field:?} and row delimiter {row:?} are ambiguous: one is a prefix of the other",
                    field = field.as_string(),
                    row = row.as_string(),
                )));
            }
        }
        Ok(Self { field, rows })
    }

    pub fn field(&self) -> &Delimiter {
        &self.field
    }

    pub fn rows(&self) -> &RowDelimiterSet {
        &self.rows
    }
}

/// A concrete dialect: field delimiter, row delimiter set, and escape scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dialect {
    delimiters: Delimiters,
    escape: Option<char>,
}

impl Dialect {
    /// Combine a validated delimiter pair with an escape scalar, rejecting
    /// an escape that appears inside any delimiter.
    pub fn new(delimiters: Delimiters, escape: Option<char>) -> Result<Self> {
        if let Some(escape) = escape {
            if delimiters.field().contains_scalar(escape) || delimiters.rows().contains_scalar(escape) {
                return Err(CsvError::config(format!(
                    "escape scalar {escape:?} collides with a configured delimiter"
                )));
            }
        }
        Ok(Self { delimiters, escape })
    }

    /// Check that the trim set is disjoint from every delimiter scalar and
    /// from the escape scalar.
    pub(crate) fn validate_trim(&self, trim: &[char]) -> Result<()> {
        for &scalar in trim {
            if self.delimiters.field().contains_scalar(scalar)
                || self.delimiters.rows().contains_scalar(scalar)
            {
                return Err(CsvError::config(format!(
                    "trim scalar {scalar:?} collides with a configured delimiter"
                )));
            }
            if self.escape == Some(scalar) {
                return Err(CsvError::config(format!(
                    "trim scalar {scalar:?} collides with the escape scalar"
                )));
            }
        }
        Ok(())
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn field(&self) -> &Delimiter {
        self.delimiters.field()
    }

    pub fn rows(&self) -> &RowDelimiterSet {
        self.delimiters.rows()
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    pub(crate) fn total_scalar_len(&self) -> usize {
        self.delimiters.field().len() + self.delimiters.rows().total_scalar_len()
    }

    pub(crate) fn into_delimiters(self) -> Delimiters {
        self.delimiters
    }
}
