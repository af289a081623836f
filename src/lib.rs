//! unicsv: delimited-text reading and writing with dialect inference
//!
//! A CSV engine built around two coupled pieces: a streaming tokenizer that
//! consumes a lazy stream of Unicode scalars, and a dialect inferrer that
//! runs the tokenizer speculatively under candidate delimiters and keeps the
//! one whose output shape is most regular. Field and row delimiters may be
//! arbitrary multi-scalar sequences, row delimiters may be a set of
//! alternatives (mixed `\n`/`\r\n` input), and escaped fields use
//! doubled-escape semantics.
//!
//! # Quick Start
//!
//! ```
//! use unicsv::ReaderBuilder;
//!
//! let mut reader = ReaderBuilder::new().from_str("a,b,c\nd,e,f\n").unwrap();
//! assert_eq!(reader.read_row().unwrap().unwrap(), vec!["a", "b", "c"]);
//! assert_eq!(reader.read_row().unwrap().unwrap(), vec!["d", "e", "f"]);
//! ```
//!
//! # Inferring a dialect
//!
//! Mark either delimiter slot for inference and the reader samples the
//! leading scalars, scores the candidates, and proceeds with the winner:
//!
//! ```
//! use unicsv::{FieldDelimiter, ReaderBuilder, RowDelimiter};
//!
//! let mut builder = ReaderBuilder::new();
//! builder
//!     .field_delimiter(FieldDelimiter::infer_default())
//!     .row_delimiter(RowDelimiter::infer_default());
//!
//! let reader = builder.from_str("x;y;z\n1;2;3\n4;5;6\n").unwrap();
//! assert_eq!(reader.dialect().field().as_string(), ";");
//! ```
//!
//! # Writing
//!
//! The writer escapes symmetrically, so reading its output back with the
//! same configuration is the identity:
//!
//! ```
//! use unicsv::WriterBuilder;
//!
//! let mut writer = WriterBuilder::new().from_writer(Vec::new()).unwrap();
//! writer.write_row(["a", "b,with delimiter"]).unwrap();
//! writer.end_file().unwrap();
//!
//! let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(data, "a,\"b,with delimiter\"\n");
//! ```

mod buffer;
mod config;
mod delimiter;
mod error;
mod infer;
mod matcher;
mod reader;
mod source;
mod writer;

pub use config::{
    BomPolicy, DEFAULT_SAMPLE_SCALARS, Escape, FieldDelimiter, Header, RowDelimiter, Trim,
};
pub use delimiter::{Delimiter, Dialect, Delimiters, RowDelimiterSet};
pub use error::{CsvError, Result};
pub use reader::{Reader, ReaderBuilder, ReaderStatus};
pub use source::{ScalarSource, StrSource, Utf8Source};
pub use writer::{Writer, WriterBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api() {
        let _builder = ReaderBuilder::new();
        let _writer_builder = WriterBuilder::new();
        let _field = FieldDelimiter::infer_default();
        let _row = RowDelimiter::standard();
        let _escape = Escape::DoubleQuote;
        let _header = Header::FirstLine;
        let _trim = Trim::Whitespace;
        let _bom = BomPolicy::Convention;
    }

    #[test]
    fn test_read_simple_csv() {
        let mut reader = ReaderBuilder::new().from_str("a,b,c\n1,2,3\n").unwrap();
        assert_eq!(reader.read_row().unwrap().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(reader.read_row().unwrap().unwrap(), vec!["1", "2", "3"]);
        assert!(reader.read_row().is_none());
    }

    #[test]
    fn test_write_then_read_back() {
        let mut writer = WriterBuilder::new().from_writer(Vec::new()).unwrap();
        writer.write_row(["name", "city"]).unwrap();
        writer.write_row(["Alice", "New York"]).unwrap();
        writer.end_file().unwrap();

        let bytes = writer.into_inner().unwrap();
        let reader = ReaderBuilder::new().from_bytes(&bytes).unwrap();
        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![vec!["name", "city"], vec!["Alice", "New York"]]);
    }
}
