//! Row-oriented CSV reading.
//!
//! [`Reader`] assembles rows of string fields from a lazy scalar source. The
//! per-field state machine dispatches on the configured delimiters through
//! the matcher primitives, handles escaped fields with doubled-escape
//! semantics, and trims unescaped fields. When a delimiter is marked for
//! inference the builder samples the leading scalars, scores the candidate
//! dialects, and restores the sample before normal reading begins.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::buffer::ScalarBuffer;
use crate::config::{DEFAULT_SAMPLE_SCALARS, Escape, FieldDelimiter, Header, RowDelimiter, Trim};
use crate::delimiter::{Dialect, Delimiters, RowDelimiterSet};
use crate::error::{CsvError, Result};
use crate::infer;
use crate::matcher;
use crate::source::{ScalarSource, StrSource, Utf8Source};

/// Builds a CSV reader.
///
/// Validation, dialect inference, and header capture all happen when one of
/// the `from_` constructors runs, so they return `Result`.
///
/// # Example
///
/// ```
/// use unicsv::ReaderBuilder;
///
/// let mut reader = ReaderBuilder::new().from_str("a,b\nc,d\n").unwrap();
/// assert_eq!(reader.read_row().unwrap().unwrap(), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    field: FieldDelimiter,
    row: RowDelimiter,
    escape: Escape,
    header: Header,
    trim: Trim,
    sample_scalars: usize,
    strict_escapes: bool,
    flexible: bool,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            field: FieldDelimiter::default(),
            row: RowDelimiter::default(),
            escape: Escape::default(),
            header: Header::default(),
            trim: Trim::default(),
            sample_scalars: DEFAULT_SAMPLE_SCALARS,
            strict_escapes: false,
            flexible: false,
        }
    }
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter, concrete or inferred.
    pub fn field_delimiter(&mut self, field: FieldDelimiter) -> &mut Self {
        self.field = field;
        self
    }

    /// Set the row delimiter, concrete or inferred.
    pub fn row_delimiter(&mut self, row: RowDelimiter) -> &mut Self {
        self.row = row;
        self
    }

    /// Set the escape strategy. The default is a double quote.
    pub fn escape(&mut self, escape: Escape) -> &mut Self {
        self.escape = escape;
        self
    }

    /// Set the header strategy. The default captures no header.
    pub fn header(&mut self, header: Header) -> &mut Self {
        self.header = header;
        self
    }

    /// Set the trim strategy for unescaped fields.
    pub fn trim(&mut self, trim: Trim) -> &mut Self {
        self.trim = trim;
        self
    }

    /// Number of scalars sampled for dialect inference.
    pub fn sample_scalars(&mut self, scalars: usize) -> &mut Self {
        self.sample_scalars = scalars;
        self
    }

    /// Fail on trailing content after a closed escaped field instead of
    /// concatenating it.
    pub fn strict_escapes(&mut self, strict: bool) -> &mut Self {
        self.strict_escapes = strict;
        self
    }

    /// Allow rows of differing widths. Used for speculative tokenization
    /// during inference, where ragged output is the signal being measured.
    pub(crate) fn flexible(&mut self, flexible: bool) -> &mut Self {
        self.flexible = flexible;
        self
    }

    /// Build a reader over an `io::Read`, decoding UTF-8 incrementally.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Reader<Utf8Source<R>>> {
        self.build(Utf8Source::new(reader))
    }

    /// Build a reader over the file at `path`.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<Utf8Source<File>>> {
        let file = File::open(path.as_ref()).map_err(CsvError::from)?;
        self.from_reader(file)
    }

    /// Build a reader over borrowed text.
    pub fn from_str<'a>(&self, data: &'a str) -> Result<Reader<StrSource<'a>>> {
        self.build(StrSource::new(data))
    }

    /// Build a reader over borrowed bytes, validating them as UTF-8 first.
    pub fn from_bytes<'a>(&self, data: &'a [u8]) -> Result<Reader<StrSource<'a>>> {
        let text = simdutf8::compat::from_utf8(data).map_err(|_| CsvError::Stream {
            message: "input is not valid UTF-8".into(),
        })?;
        self.from_str(text)
    }

    /// Build a reader over any scalar source.
    pub fn from_source<S: ScalarSource>(&self, source: S) -> Result<Reader<S>> {
        self.build(source)
    }

    fn build<S: ScalarSource>(&self, mut source: S) -> Result<Reader<S>> {
        let escape = self.escape.scalar();
        let mut buffer = ScalarBuffer::new();

        let delimiters = match (&self.field, &self.row) {
            (FieldDelimiter::Use(field), RowDelimiter::Use(rows)) => {
                Delimiters::new(field.clone(), rows.clone())?
            }
            (field, row) => {
                let field_candidates = match field {
                    FieldDelimiter::Use(delimiter) => vec![delimiter.clone()],
                    FieldDelimiter::Infer(candidates) => candidates.clone(),
                };
                let row_candidates = match row {
                    RowDelimiter::Use(rows) => vec![rows.clone()],
                    RowDelimiter::Infer(candidates) => candidates
                        .iter()
                        .map(|delimiter| RowDelimiterSet::single(delimiter.clone()))
                        .collect(),
                };

                let mut sample = String::new();
                let mut sampled = 0;
                while sampled < self.sample_scalars {
                    match source.next_scalar()? {
                        Some(scalar) => {
                            sample.push(scalar);
                            sampled += 1;
                        }
                        None => break,
                    }
                }

                let dialect = infer::infer_dialect(
                    &sample,
                    &field_candidates,
                    &row_candidates,
                    self.escape,
                    &self.trim,
                )?;
                // Hand the sampled scalars back so reading starts at the top.
                buffer.push_all(sample.chars());
                dialect.into_delimiters()
            }
        };

        let dialect = Dialect::new(delimiters, escape)?;
        dialect.validate_trim(self.trim.scalars())?;

        let mut reader = Reader {
            source,
            buffer,
            dialect,
            trim: self.trim.scalars().to_vec(),
            strict_escapes: self.strict_escapes,
            flexible: self.flexible,
            headers: Vec::new(),
            expected_fields: 0,
            row_index: 0,
            field_index: 0,
            status: ReaderStatus::Active,
            error_yielded: false,
        };

        if self.header == Header::FirstLine {
            if let Some(row) = reader.parse_row()? {
                reader.headers = row;
            }
            // Row indexing starts after the header.
            reader.row_index = 0;
        }

        Ok(reader)
    }
}

/// Lifecycle state of a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderStatus {
    /// Rows may still be produced.
    Active,
    /// End of stream was reached at a clean row boundary.
    Finished,
    /// An error occurred; it is latched and re-surfaced by every subsequent
    /// read.
    Failed(CsvError),
}

/// How the scalar that closed a field classified.
enum FieldEnd {
    /// A field delimiter; the row continues.
    Field,
    /// A row delimiter; the row is complete.
    Row,
    /// End of stream; the row is complete.
    Stream,
}

/// A CSV reader over a scalar source.
#[derive(Debug)]
pub struct Reader<S> {
    source: S,
    buffer: ScalarBuffer,
    dialect: Dialect,
    trim: Vec<char>,
    strict_escapes: bool,
    flexible: bool,
    headers: Vec<String>,
    expected_fields: usize,
    row_index: u64,
    field_index: u64,
    status: ReaderStatus,
    error_yielded: bool,
}

impl<S> Reader<S> {
    /// The captured header row; empty unless the builder asked for one.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Current lifecycle state.
    pub fn status(&self) -> &ReaderStatus {
        &self.status
    }

    /// The concrete dialect in use, inferred or configured.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The row width fixed by the first complete row, or 0 before then.
    pub fn expected_fields(&self) -> usize {
        self.expected_fields
    }
}

impl<S: ScalarSource> Reader<S> {
    /// Read the next row.
    ///
    /// Returns `None` once the stream is exhausted. Errors are sticky: after
    /// any failure every subsequent call returns the same error.
    pub fn read_row(&mut self) -> Option<Result<Vec<String>>> {
        match &self.status {
            ReaderStatus::Failed(err) => Some(Err(err.clone())),
            ReaderStatus::Finished => None,
            ReaderStatus::Active => match self.parse_row() {
                Ok(Some(row)) => Some(Ok(row)),
                Ok(None) => {
                    self.status = ReaderStatus::Finished;
                    None
                }
                Err(err) => {
                    self.status = ReaderStatus::Failed(err.clone());
                    Some(Err(err))
                }
            },
        }
    }

    fn pull(&mut self) -> Result<Option<char>> {
        matcher::pull(&mut self.buffer, &mut self.source)
    }

    fn is_trim(&self, scalar: char) -> bool {
        self.trim.contains(&scalar)
    }

    fn field_delimiter_at(&mut self, scalar: char) -> Result<bool> {
        matcher::delimiter_starts_at(
            scalar,
            self.dialect.delimiters().field(),
            &mut self.buffer,
            &mut self.source,
        )
    }

    fn row_delimiter_at(&mut self, scalar: char) -> Result<bool> {
        matcher::row_delimiter_starts_at(
            scalar,
            self.dialect.delimiters().rows(),
            &mut self.buffer,
            &mut self.source,
        )
    }

    /// Parse one row, or `None` on end of stream at a row boundary.
    fn parse_row(&mut self) -> Result<Option<Vec<String>>> {
        let mut row: Vec<String> = Vec::with_capacity(self.expected_fields);
        self.field_index = 0;
        loop {
            // Field start: leading trim scalars are skipped before the
            // escaped/unescaped decision.
            let first = loop {
                match self.pull()? {
                    Some(scalar) if self.is_trim(scalar) => {}
                    other => break other,
                }
            };

            let Some(first) = first else {
                if row.is_empty() {
                    return Ok(None);
                }
                // The stream ended right after a field delimiter. A row that
                // already holds the expected width keeps it; otherwise the
                // dangling delimiter produces one trailing empty field.
                if self.expected_fields == 0 || row.len() < self.expected_fields {
                    row.push(String::new());
                }
                return self.finish_row(row).map(Some);
            };

            let end = if self.dialect.escape() == Some(first) {
                let (field, end) = self.parse_escaped_field(first)?;
                row.push(field);
                end
            } else if self.field_delimiter_at(first)? {
                row.push(String::new());
                FieldEnd::Field
            } else if self.row_delimiter_at(first)? {
                row.push(String::new());
                FieldEnd::Row
            } else {
                let (field, end) = self.parse_unescaped_field(first)?;
                row.push(field);
                end
            };

            match end {
                FieldEnd::Field => self.field_index += 1,
                FieldEnd::Row | FieldEnd::Stream => return self.finish_row(row).map(Some),
            }
        }
    }

    /// Accumulate an unescaped field starting with `first`.
    ///
    /// An escape scalar seen mid-field is ordinary content; an escape only
    /// opens a field when it appears at field start.
    fn parse_unescaped_field(&mut self, first: char) -> Result<(String, FieldEnd)> {
        let mut content = String::new();
        content.push(first);
        loop {
            let Some(scalar) = self.pull()? else {
                self.trim_trailing(&mut content);
                return Ok((content, FieldEnd::Stream));
            };
            if self.field_delimiter_at(scalar)? {
                self.trim_trailing(&mut content);
                return Ok((content, FieldEnd::Field));
            }
            if self.row_delimiter_at(scalar)? {
                self.trim_trailing(&mut content);
                return Ok((content, FieldEnd::Row));
            }
            content.push(scalar);
        }
    }

    /// Accumulate an escaped field whose opening escape scalar was consumed.
    ///
    /// Inside the field the delimiter matchers are inert; a doubled escape
    /// scalar is a literal one and a lone escape scalar closes the field.
    /// After the close, only trim scalars and a delimiter may follow; other
    /// scalars are concatenated (lenient) or rejected (strict).
    fn parse_escaped_field(&mut self, escape: char) -> Result<(String, FieldEnd)> {
        let mut content = String::new();
        loop {
            let Some(scalar) = self.pull()? else {
                return Err(CsvError::input(
                    format!("unbalanced escape scalar {escape:?} at end of stream"),
                    self.row_index,
                    self.field_index,
                ));
            };
            if scalar == escape {
                match self.pull()? {
                    Some(next) if next == escape => content.push(escape),
                    Some(next) => {
                        self.buffer.push(next);
                        break;
                    }
                    None => break,
                }
            } else {
                content.push(scalar);
            }
        }

        loop {
            let Some(scalar) = self.pull()? else {
                return Ok((content, FieldEnd::Stream));
            };
            if self.is_trim(scalar) {
                continue;
            }
            if self.field_delimiter_at(scalar)? {
                return Ok((content, FieldEnd::Field));
            }
            if self.row_delimiter_at(scalar)? {
                return Ok((content, FieldEnd::Row));
            }
            if self.strict_escapes {
                return Err(CsvError::input(
                    format!("unexpected scalar {scalar:?} after a closed escaped field"),
                    self.row_index,
                    self.field_index,
                ));
            }
            content.push(scalar);
        }
    }

    fn trim_trailing(&self, content: &mut String) {
        if self.trim.is_empty() {
            return;
        }
        while let Some(last) = content.chars().last() {
            if self.trim.contains(&last) {
                content.pop();
            } else {
                break;
            }
        }
    }

    /// Enforce the row-width invariant and advance the row index.
    fn finish_row(&mut self, row: Vec<String>) -> Result<Vec<String>> {
        if !self.flexible {
            if self.expected_fields == 0 {
                self.expected_fields = row.len();
            } else if row.len() != self.expected_fields {
                return Err(CsvError::input(
                    format!(
                        "expected {} fields per row, found {}",
                        self.expected_fields,
                        row.len()
                    ),
                    self.row_index,
                    row.len() as u64,
                ));
            }
        }
        self.row_index += 1;
        Ok(row)
    }
}

impl<S: ScalarSource> Iterator for Reader<S> {
    type Item = Result<Vec<String>>;

    /// Yields rows; a latched error is yielded once and then iteration ends,
    /// while [`Reader::read_row`] keeps returning it.
    fn next(&mut self) -> Option<Self::Item> {
        if self.error_yielded {
            return None;
        }
        let item = self.read_row();
        if matches!(item, Some(Err(_))) {
            self.error_yielded = true;
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::Delimiter;

    fn read_all(data: &str) -> Vec<Vec<String>> {
        let reader = ReaderBuilder::new().from_str(data).unwrap();
        reader.collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_read_simple_rows() {
        assert_eq!(
            read_all("a,b,c\nd,e,f\n"),
            vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]
        );
    }

    #[test]
    fn test_missing_final_row_delimiter() {
        assert_eq!(read_all("a,b\nc,d"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(read_all("a,,c\n"), vec![vec!["a", "", "c"]]);
        assert_eq!(read_all(",\n,\n"), vec![vec!["", ""], vec!["", ""]]);
    }

    #[test]
    fn test_escaped_field_with_delimiter() {
        assert_eq!(read_all("a,\"b,c\",d\n"), vec![vec!["a", "b,c", "d"]]);
    }

    #[test]
    fn test_doubled_escape_scalar() {
        assert_eq!(
            read_all("a,\"he said \"\"hi\"\"\",b\n"),
            vec![vec!["a", "he said \"hi\"", "b"]]
        );
    }

    #[test]
    fn test_escape_scalar_mid_field_is_content() {
        assert_eq!(read_all("a,b\"c,d\n"), vec![vec!["a", "b\"c", "d"]]);
    }

    #[test]
    fn test_escaped_field_spans_row_delimiter() {
        assert_eq!(
            read_all("a,\"line one\nline two\"\n"),
            vec![vec!["a", "line one\nline two"]]
        );
    }

    #[test]
    fn test_row_width_mismatch_is_invalid_input() {
        let mut reader = ReaderBuilder::new().from_str("a,b\nc\n").unwrap();
        assert_eq!(reader.read_row().unwrap().unwrap(), vec!["a", "b"]);
        let err = reader.read_row().unwrap().unwrap_err();
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn test_errors_are_sticky() {
        let mut reader = ReaderBuilder::new().from_str("a,b\nc\nd,e\n").unwrap();
        assert!(reader.read_row().unwrap().is_ok());
        let first = reader.read_row().unwrap().unwrap_err();
        let second = reader.read_row().unwrap().unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(reader.status(), ReaderStatus::Failed(_)));
    }

    #[test]
    fn test_iterator_yields_latched_error_once() {
        let reader = ReaderBuilder::new().from_str("a,b\nc\nd,e\n").unwrap();
        let items: Vec<_> = reader.collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn test_status_finishes_at_clean_boundary() {
        let mut reader = ReaderBuilder::new().from_str("a,b\n").unwrap();
        assert!(reader.read_row().unwrap().is_ok());
        assert!(reader.read_row().is_none());
        assert_eq!(*reader.status(), ReaderStatus::Finished);
    }

    #[test]
    fn test_trailing_field_delimiter_before_eof() {
        // Width not yet fixed: the dangling delimiter yields an empty field.
        assert_eq!(read_all("a,b,"), vec![vec!["a", "b", ""]]);
        // Width fixed at 2: the dangling delimiter is tolerated.
        assert_eq!(read_all("a,b\nc,d,"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_header_capture() {
        let mut reader = ReaderBuilder::new()
            .header(Header::FirstLine)
            .from_str("name,age\nAlice,30\n")
            .unwrap();
        assert_eq!(reader.headers(), &["name", "age"]);
        assert_eq!(reader.read_row().unwrap().unwrap(), vec!["Alice", "30"]);
    }

    #[test]
    fn test_header_fixes_row_width() {
        let mut reader = ReaderBuilder::new()
            .header(Header::FirstLine)
            .from_str("name,age\nAlice\n")
            .unwrap();
        let err = reader.read_row().unwrap().unwrap_err();
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn test_trim_whitespace() {
        let rows = {
            let reader = ReaderBuilder::new()
                .trim(Trim::Whitespace)
                .from_str(" a , b \nc, d\n")
                .unwrap();
            reader.collect::<Result<Vec<_>>>().unwrap()
        };
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_trim_keeps_interior_whitespace() {
        let reader = ReaderBuilder::new()
            .trim(Trim::Whitespace)
            .from_str("a b , c\n")
            .unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![vec!["a b", "c"]]);
    }

    #[test]
    fn test_escaped_field_is_not_trimmed_inside() {
        let reader = ReaderBuilder::new()
            .trim(Trim::Whitespace)
            .from_str(" \" a \" ,b\n")
            .unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![vec![" a ", "b"]]);
    }

    #[test]
    fn test_multi_scalar_field_delimiter() {
        let mut builder = ReaderBuilder::new();
        builder.field_delimiter(FieldDelimiter::Use(Delimiter::new("<->").unwrap()));
        let reader = builder.from_str("a<->b<->c\nd<->e<->f\n").unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
    }

    #[test]
    fn test_partial_delimiter_match_is_content() {
        let mut builder = ReaderBuilder::new();
        builder.field_delimiter(FieldDelimiter::Use(Delimiter::new("||").unwrap()));
        let reader = builder.from_str("a|b||c\n").unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        // The lone pipe failed to match "||"; the scalar after it came back
        // from the buffer in input order.
        assert_eq!(rows, vec![vec!["a|b", "c"]]);
    }

    #[test]
    fn test_mixed_line_endings_with_standard_set() {
        assert_eq!(
            read_all("a,b\r\nc,d\ne,f\r\n"),
            vec![vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]
        );
    }

    #[test]
    fn test_unbalanced_escape_is_invalid_input() {
        let mut reader = ReaderBuilder::new().from_str("a,\"unterminated\n").unwrap();
        let err = reader.read_row().unwrap().unwrap_err();
        assert_eq!(err.code(), 2);
        assert!(err.to_string().contains("unbalanced"));
    }

    #[test]
    fn test_lenient_trailing_content_after_escape() {
        assert_eq!(read_all("\"ab\"x,c\n"), vec![vec!["abx", "c"]]);
    }

    #[test]
    fn test_strict_trailing_content_after_escape() {
        let mut reader = ReaderBuilder::new()
            .strict_escapes(true)
            .from_str("\"ab\"x,c\n")
            .unwrap();
        let err = reader.read_row().unwrap().unwrap_err();
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn test_escape_disabled_treats_quotes_as_content() {
        let reader = ReaderBuilder::new()
            .escape(Escape::None)
            .from_str("\"a\",b\n")
            .unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![vec!["\"a\"", "b"]]);
    }

    #[test]
    fn test_custom_escape_scalar() {
        let reader = ReaderBuilder::new()
            .escape(Escape::Scalar('~'))
            .from_str("~a,b~,c\n")
            .unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![vec!["a,b", "c"]]);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        let mut reader = ReaderBuilder::new().from_str("").unwrap();
        assert!(reader.read_row().is_none());
        assert_eq!(*reader.status(), ReaderStatus::Finished);
    }

    #[test]
    fn test_dialect_accessor() {
        let reader = ReaderBuilder::new().from_str("a,b\n").unwrap();
        assert_eq!(reader.dialect().field().as_string(), ",");
        assert_eq!(reader.dialect().escape(), Some('"'));
    }
}
