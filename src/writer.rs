//! Row-by-row CSV writing with symmetric field escaping.
//!
//! The writer mirrors the reader's dialect rules: a field containing a
//! delimiter sequence or the escape scalar is surrounded by escape scalars
//! and internal escapes are doubled, so reading the output back with the
//! same configuration is the identity.

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::config::{BomPolicy, Escape};
use crate::delimiter::{Delimiter, Dialect, Delimiters, RowDelimiterSet};
use crate::error::{CsvError, Result};

/// Builds a CSV writer.
///
/// # Example
///
/// ```
/// use unicsv::WriterBuilder;
///
/// let mut writer = WriterBuilder::new().from_writer(Vec::new()).unwrap();
/// writer.write_row(["a", "b", "c"]).unwrap();
/// writer.write_row(["x", "y", "z"]).unwrap();
/// writer.end_file().unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "a,b,c\nx,y,z\n");
/// ```
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    field: Delimiter,
    row: Delimiter,
    escape: Escape,
    headers: Vec<String>,
    bom: BomPolicy,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self {
            field: Delimiter::from_scalar(','),
            row: Delimiter::from_scalar('\n'),
            escape: Escape::default(),
            headers: Vec::new(),
            bom: BomPolicy::default(),
        }
    }
}

impl WriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter. The default is a comma.
    pub fn field_delimiter(&mut self, field: Delimiter) -> &mut Self {
        self.field = field;
        self
    }

    /// Set the row delimiter emitted at every `end_row`. The default is a
    /// line feed; the writer emits exactly one delimiter per row.
    pub fn row_delimiter(&mut self, row: Delimiter) -> &mut Self {
        self.row = row;
        self
    }

    /// Set the escape strategy. The default is a double quote.
    pub fn escape(&mut self, escape: Escape) -> &mut Self {
        self.escape = escape;
        self
    }

    /// Write this header row at construction. The header does not fix the
    /// row width; the first regular row does.
    pub fn headers<I>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the byte order mark policy. The default follows the UTF-8
    /// convention and writes none.
    pub fn bom(&mut self, bom: BomPolicy) -> &mut Self {
        self.bom = bom;
        self
    }

    /// Build a writer emitting to `sink`.
    pub fn from_writer<W: Write>(&self, sink: W) -> Result<Writer<W>> {
        self.build(sink)
    }

    /// Build a writer emitting to the file at `path`, truncating it.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        let file = File::create(path.as_ref()).map_err(CsvError::from)?;
        self.build(file)
    }

    fn build<W: Write>(&self, mut sink: W) -> Result<Writer<W>> {
        let delimiters = Delimiters::new(
            self.field.clone(),
            RowDelimiterSet::single(self.row.clone()),
        )?;
        let dialect = Dialect::new(delimiters, self.escape.scalar())?;

        if self.bom == BomPolicy::Always {
            sink.write_all(b"\xEF\xBB\xBF").map_err(CsvError::from)?;
        }

        let mut writer = Writer {
            sink,
            field_str: self.field.as_string(),
            row_str: self.row.as_string(),
            escape: dialect.escape(),
            expected_fields: 0,
            row_index: 0,
            field_index: 0,
            closed: false,
        };

        if !self.headers.is_empty() {
            let headers = self.headers.clone();
            writer.write_header_row(&headers)?;
        }

        Ok(writer)
    }
}

/// A CSV writer over a byte sink.
#[derive(Debug)]
pub struct Writer<W: Write> {
    sink: W,
    field_str: String,
    row_str: String,
    escape: Option<char>,
    expected_fields: usize,
    row_index: u64,
    field_index: usize,
    closed: bool,
}

impl<W: Write> Writer<W> {
    /// Append one field to the current row.
    ///
    /// Fails once the row already holds the expected number of fields.
    pub fn write_field<T: AsRef<str>>(&mut self, field: T) -> Result<()> {
        self.ensure_open()?;
        if self.expected_fields > 0 && self.field_index >= self.expected_fields {
            return Err(CsvError::operation(format!(
                "row {} already holds the expected {} fields",
                self.row_index, self.expected_fields
            )));
        }
        self.emit_field(field.as_ref())
    }

    /// Append every field of `fields` to the current row.
    pub fn write_fields<I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for field in fields {
            self.write_field(field)?;
        }
        Ok(())
    }

    /// Close the current row.
    ///
    /// The first row to close fixes the expected width; later rows are
    /// padded with trailing empty fields up to it, never truncated.
    pub fn end_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.field_index == 0 && self.expected_fields == 0 {
            return Err(CsvError::operation(
                "cannot end an empty row before the row width is known",
            ));
        }
        if self.expected_fields == 0 {
            self.expected_fields = self.field_index;
        } else {
            while self.field_index < self.expected_fields {
                self.emit_field("")?;
            }
        }
        self.sink.write_all(self.row_str.as_bytes()).map_err(CsvError::from)?;
        self.row_index += 1;
        self.field_index = 0;
        Ok(())
    }

    /// Write a complete row: its fields, then the row delimiter.
    pub fn write_row<I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.write_fields(fields)?;
        self.end_row()
    }

    /// Write a row consisting solely of empty fields.
    ///
    /// Fails while the row width is still unknown.
    pub fn write_empty_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.expected_fields == 0 {
            return Err(CsvError::operation(
                "cannot write an empty row before the row width is known",
            ));
        }
        if self.field_index != 0 {
            return Err(CsvError::operation("a row is already in progress"));
        }
        self.end_row()
    }

    /// Close the stream: finish a dangling row, flush the sink, and refuse
    /// further writes. Idempotent.
    pub fn end_file(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.field_index > 0 {
            self.end_row()?;
        }
        self.sink.flush().map_err(CsvError::from)?;
        self.closed = true;
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(CsvError::from)
    }

    /// Take back the sink. Fails until the stream was closed with
    /// [`Writer::end_file`].
    pub fn into_inner(self) -> Result<W> {
        if !self.closed {
            return Err(CsvError::operation(
                "the stream must be closed with end_file before taking the sink",
            ));
        }
        Ok(self.sink)
    }

    /// The row width fixed by the first complete row, or 0 before then.
    pub fn expected_fields(&self) -> usize {
        self.expected_fields
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Header rows bypass the width bookkeeping entirely.
    fn write_header_row(&mut self, headers: &[String]) -> Result<()> {
        for header in headers {
            self.emit_field(header)?;
        }
        self.sink.write_all(self.row_str.as_bytes()).map_err(CsvError::from)?;
        self.field_index = 0;
        Ok(())
    }

    fn emit_field(&mut self, field: &str) -> Result<()> {
        if self.field_index > 0 {
            self.sink.write_all(self.field_str.as_bytes()).map_err(CsvError::from)?;
        }
        let encoded = self.escape_field(field)?;
        self.sink.write_all(encoded.as_bytes()).map_err(CsvError::from)?;
        self.field_index += 1;
        Ok(())
    }

    /// Escape a field so the reader's unescaping restores it exactly.
    fn escape_field<'a>(&self, field: &'a str) -> Result<Cow<'a, str>> {
        match self.escape {
            Some(escape) => {
                let needs_escaping = field.contains(escape)
                    || field.contains(self.field_str.as_str())
                    || field.contains(self.row_str.as_str());
                if !needs_escaping {
                    return Ok(Cow::Borrowed(field));
                }
                let mut escaped = String::with_capacity(field.len() + 2);
                escaped.push(escape);
                for scalar in field.chars() {
                    if scalar == escape {
                        escaped.push(escape);
                    }
                    escaped.push(scalar);
                }
                escaped.push(escape);
                Ok(Cow::Owned(escaped))
            }
            None => {
                if field.contains(self.field_str.as_str()) || field.contains(self.row_str.as_str())
                {
                    return Err(CsvError::input(
                        "field contains a delimiter and no escape scalar is configured",
                        self.row_index,
                        self.field_index as u64,
                    ));
                }
                Ok(Cow::Borrowed(field))
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(CsvError::operation("the writer is closed"));
        }
        Ok(())
    }
}
