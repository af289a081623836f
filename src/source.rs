//! Lazy scalar sources over raw input.
//!
//! The tokenizer consumes Unicode scalars one at a time through the
//! [`ScalarSource`] trait. [`StrSource`] serves scalars from borrowed text;
//! [`Utf8Source`] decodes an `io::Read` incrementally, validating each chunk
//! with SIMD-accelerated UTF-8 checks. Both recognize and skip a single
//! leading byte order mark.

use std::io::Read;

use simdutf8::compat::from_utf8;

use crate::error::{CsvError, Result};

/// A lazy source of Unicode scalars.
pub trait ScalarSource {
    /// Returns the next scalar, or `None` at end of stream.
    fn next_scalar(&mut self) -> Result<Option<char>>;
}

/// Scalar source over borrowed, already-decoded text.
#[derive(Debug)]
pub struct StrSource<'a> {
    chars: std::str::Chars<'a>,
    bom_checked: bool,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.chars(), bom_checked: false }
    }
}

impl ScalarSource for StrSource<'_> {
    fn next_scalar(&mut self) -> Result<Option<char>> {
        if !self.bom_checked {
            self.bom_checked = true;
            return match self.chars.next() {
                Some('\u{feff}') => Ok(self.chars.next()),
                other => Ok(other),
            };
        }
        Ok(self.chars.next())
    }
}

/// Bytes decoded per refill of the internal chunk.
const CHUNK_BYTES: usize = 8 * 1024;

/// Incremental UTF-8 decoder over an `io::Read`.
///
/// Reads in chunks and validates each with `simdutf8`. A multi-byte sequence
/// split across a chunk boundary is carried into the next refill; invalid or
/// truncated UTF-8 surfaces as a stream failure.
#[derive(Debug)]
pub struct Utf8Source<R> {
    inner: R,
    decoded: String,
    pos: usize,
    carry: Vec<u8>,
    eof: bool,
    bom_checked: bool,
}

impl<R: Read> Utf8Source<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decoded: String::new(),
            pos: 0,
            carry: Vec::new(),
            eof: false,
            bom_checked: false,
        }
    }

    fn refill(&mut self) -> Result<()> {
        self.decoded.clear();
        self.pos = 0;

        let mut bytes = std::mem::take(&mut self.carry);
        let start = bytes.len();
        bytes.resize(start + CHUNK_BYTES, 0);
        let read = self.inner.read(&mut bytes[start..]).map_err(CsvError::from)?;
        if read == 0 {
            self.eof = true;
        }
        bytes.truncate(start + read);

        if bytes.is_empty() {
            return Ok(());
        }

        match from_utf8(&bytes) {
            Ok(valid) => {
                self.decoded.push_str(valid);
                Ok(())
            }
            Err(err) => {
                let valid_to = err.valid_up_to();
                if err.error_len().is_some() {
                    return Err(CsvError::Stream {
                        message: "input is not valid UTF-8".into(),
                    });
                }
                if self.eof {
                    return Err(CsvError::Stream {
                        message: "incomplete UTF-8 sequence at end of stream".into(),
                    });
                }
                // A multi-byte sequence straddles the chunk boundary.
                let valid = from_utf8(&bytes[..valid_to]).map_err(|_| CsvError::Stream {
                    message: "input is not valid UTF-8".into(),
                })?;
                self.decoded.push_str(valid);
                self.carry = bytes[valid_to..].to_vec();
                Ok(())
            }
        }
    }

    fn pull_decoded(&mut self) -> Result<Option<char>> {
        loop {
            if self.pos < self.decoded.len() {
                if let Some(scalar) = self.decoded[self.pos..].chars().next() {
                    self.pos += scalar.len_utf8();
                    return Ok(Some(scalar));
                }
            }
            if self.eof && self.carry.is_empty() {
                return Ok(None);
            }
            self.refill()?;
        }
    }
}

impl<R: Read> ScalarSource for Utf8Source<R> {
    fn next_scalar(&mut self) -> Result<Option<char>> {
        let scalar = self.pull_decoded()?;
        if !self.bom_checked {
            self.bom_checked = true;
            if scalar == Some('\u{feff}') {
                return self.pull_decoded();
            }
        }
        Ok(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain<S: ScalarSource>(mut source: S) -> Result<String> {
        let mut out = String::new();
        while let Some(scalar) = source.next_scalar()? {
            out.push(scalar);
        }
        Ok(out)
    }

    #[test]
    fn test_str_source_yields_all_scalars() {
        assert_eq!(drain(StrSource::new("a,b\u{00e9}")).unwrap(), "a,b\u{00e9}");
    }

    #[test]
    fn test_str_source_skips_bom() {
        assert_eq!(drain(StrSource::new("\u{feff}a,b")).unwrap(), "a,b");
    }

    #[test]
    fn test_utf8_source_decodes_multibyte() {
        let source = Utf8Source::new(Cursor::new("name,\u{3053}\u{3093}\n".as_bytes()));
        assert_eq!(drain(source).unwrap(), "name,\u{3053}\u{3093}\n");
    }

    #[test]
    fn test_utf8_source_skips_bom() {
        let source = Utf8Source::new(Cursor::new(b"\xEF\xBB\xBFa,b".to_vec()));
        assert_eq!(drain(source).unwrap(), "a,b");
    }

    #[test]
    fn test_invalid_utf8_is_stream_failure() {
        let source = Utf8Source::new(Cursor::new(vec![b'a', 0xFF, 0xFE]));
        let err = drain(source).unwrap_err();
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn test_truncated_sequence_at_eof_is_stream_failure() {
        // First two bytes of a three-byte sequence, then end of stream.
        let source = Utf8Source::new(Cursor::new(vec![0xE3, 0x81]));
        let err = drain(source).unwrap_err();
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn test_empty_input() {
        let source = Utf8Source::new(Cursor::new(Vec::new()));
        assert_eq!(drain(source).unwrap(), "");
    }
}
