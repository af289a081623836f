//! Delimiter matching over a pushback buffer and a scalar source.
//!
//! The predicates answer one question: does a delimiter begin at the scalar
//! the tokenizer just pulled? Matching a multi-scalar delimiter consumes
//! further scalars (buffer first, then decoder); on a mismatch every consumed
//! scalar is restored, so a `false` answer leaves the stream exactly as it
//! was. The starting scalar itself is never consumed here; the caller decides
//! what to do with it.

use crate::buffer::ScalarBuffer;
use crate::delimiter::{Delimiter, RowDelimiterSet};
use crate::error::Result;
use crate::source::ScalarSource;

/// Pull the next scalar, preferring the pushback buffer over the decoder.
pub(crate) fn pull<S: ScalarSource>(
    buffer: &mut ScalarBuffer,
    source: &mut S,
) -> Result<Option<char>> {
    if let Some(scalar) = buffer.next() {
        return Ok(Some(scalar));
    }
    source.next_scalar()
}

/// Whether `delimiter` begins at `first`.
///
/// On a match the delimiter's remaining scalars have been consumed; on a
/// mismatch the buffer holds them again in original order.
pub(crate) fn delimiter_starts_at<S: ScalarSource>(
    first: char,
    delimiter: &Delimiter,
    buffer: &mut ScalarBuffer,
    source: &mut S,
) -> Result<bool> {
    let scalars = delimiter.scalars();
    if first != scalars[0] {
        return Ok(false);
    }
    match scalars.len() {
        1 => Ok(true),
        2 => {
            let Some(second) = pull(buffer, source)? else {
                return Ok(false);
            };
            if second == scalars[1] {
                Ok(true)
            } else {
                buffer.push(second);
                Ok(false)
            }
        }
        _ => {
            let mut consumed = Vec::with_capacity(scalars.len() - 1);
            for &expected in &scalars[1..] {
                match pull(buffer, source)? {
                    Some(scalar) if scalar == expected => consumed.push(scalar),
                    Some(scalar) => {
                        consumed.push(scalar);
                        buffer.push_all(consumed);
                        return Ok(false);
                    }
                    None => {
                        buffer.push_all(consumed);
                        return Ok(false);
                    }
                }
            }
            Ok(true)
        }
    }
}

/// Whether any delimiter of `rows` begins at `first`.
///
/// Candidates sharing the stream position are tried longest first (the set
/// holds them in that order), so `"\r\n"` wins over `"\r"`. Each failed
/// candidate restores the stream before the next one is tried.
pub(crate) fn row_delimiter_starts_at<S: ScalarSource>(
    first: char,
    rows: &RowDelimiterSet,
    buffer: &mut ScalarBuffer,
    source: &mut S,
) -> Result<bool> {
    let delimiters = rows.delimiters();
    if delimiters.len() == 1 {
        return delimiter_starts_at(first, &delimiters[0], buffer, source);
    }
    for delimiter in delimiters {
        if delimiter_starts_at(first, delimiter, buffer, source)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;

    fn delim(scalars: &str) -> Delimiter {
        Delimiter::new(scalars).unwrap()
    }

    #[test]
    fn test_single_scalar_match() {
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("rest");
        assert!(delimiter_starts_at(',', &delim(","), &mut buffer, &mut source).unwrap());
        assert!(!delimiter_starts_at('x', &delim(","), &mut buffer, &mut source).unwrap());
        // Nothing was consumed beyond the starting scalar.
        assert_eq!(source.next_scalar().unwrap(), Some('r'));
    }

    #[test]
    fn test_two_scalar_match_consumes_second() {
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("-rest");
        assert!(delimiter_starts_at('<', &delim("<-"), &mut buffer, &mut source).unwrap());
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('r'));
    }

    #[test]
    fn test_two_scalar_mismatch_restores_buffer() {
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("xrest");
        assert!(!delimiter_starts_at('<', &delim("<-"), &mut buffer, &mut source).unwrap());
        assert_eq!(buffer.len(), 1);
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('x'));
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('r'));
    }

    #[test]
    fn test_long_delimiter_mismatch_restores_in_input_order() {
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("-=?rest");
        // "<-=>" fails on the fourth scalar; "-=?" must come back in order.
        assert!(!delimiter_starts_at('<', &delim("<-=>"), &mut buffer, &mut source).unwrap());
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('-'));
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('='));
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('?'));
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('r'));
    }

    #[test]
    fn test_end_of_stream_is_a_mismatch() {
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("");
        assert!(!delimiter_starts_at('<', &delim("<-"), &mut buffer, &mut source).unwrap());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_row_set_prefers_longest_candidate() {
        let rows = RowDelimiterSet::new(vec![delim("\r"), delim("\r\n")]).unwrap();
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("\nrest");
        assert!(row_delimiter_starts_at('\r', &rows, &mut buffer, &mut source).unwrap());
        // "\r\n" matched, so the newline is gone.
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('r'));
    }

    #[test]
    fn test_row_set_falls_back_to_shorter_candidate() {
        let rows = RowDelimiterSet::new(vec![delim("\r"), delim("\r\n")]).unwrap();
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("xrest");
        assert!(row_delimiter_starts_at('\r', &rows, &mut buffer, &mut source).unwrap());
        // "\r" alone matched; the lookahead scalar is back in the buffer.
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('x'));
    }

    #[test]
    fn test_row_set_overall_mismatch_restores_stream() {
        let rows = RowDelimiterSet::new(vec![delim("ab"), delim("ac")]).unwrap();
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("zrest");
        assert!(!row_delimiter_starts_at('a', &rows, &mut buffer, &mut source).unwrap());
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('z'));
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('r'));
    }

    #[test]
    fn test_row_set_second_candidate_matches() {
        let rows = RowDelimiterSet::new(vec![delim("ab"), delim("ac")]).unwrap();
        let mut buffer = ScalarBuffer::new();
        let mut source = StrSource::new("crest");
        assert!(row_delimiter_starts_at('a', &rows, &mut buffer, &mut source).unwrap());
        assert_eq!(pull(&mut buffer, &mut source).unwrap(), Some('r'));
    }
}
