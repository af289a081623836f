//! Row-pattern scoring for candidate dialects.
//!
//! Each candidate dialect speculatively tokenizes the sample with a
//! throw-away flexible reader; the resulting rows are abstracted and scored
//! by the regularity of their cell-count patterns. The correct dialect tends
//! to produce many rows of one pattern; wrong dialects shatter the sample
//! into many short singleton patterns.

use foldhash::{HashMap, HashMapExt};

use super::abstraction::{Abstraction, Symbol, cells_in};
use crate::config::{Escape, FieldDelimiter, RowDelimiter, Trim};
use crate::delimiter::Dialect;
use crate::reader::ReaderBuilder;

/// Floor contribution for single-cell patterns.
pub(crate) const PATTERN_EPSILON: f64 = 0.001;

/// Score of one candidate dialect against the sample.
#[derive(Debug, Clone)]
pub(crate) struct DialectScore {
    pub(crate) dialect: Dialect,
    pub(crate) pattern_score: f64,
    /// Rows the speculative parse produced.
    #[allow(dead_code)]
    pub(crate) num_rows: usize,
}

impl DialectScore {
    /// Strictly-better comparison: higher pattern score first, then fewer
    /// row delimiter alternatives, then longer total delimiter length.
    pub(crate) fn beats(&self, other: &DialectScore) -> bool {
        if self.pattern_score != other.pattern_score {
            return self.pattern_score > other.pattern_score;
        }
        let (a, b) = (self.dialect.rows().len(), other.dialect.rows().len());
        if a != b {
            return a < b;
        }
        self.dialect.total_scalar_len() > other.dialect.total_scalar_len()
    }
}

/// Speculatively tokenize the sample and score the output shape.
pub(crate) fn score_dialect(sample: &str, dialect: &Dialect, trim: &Trim) -> DialectScore {
    let rows = tokenize_sample(sample, dialect, trim);
    if rows.is_empty() {
        return DialectScore { dialect: dialect.clone(), pattern_score: 0.0, num_rows: 0 };
    }
    let abstraction = Abstraction::from_rows(&rows);
    let pattern_score = pattern_score(&abstraction) * type_alignment_score(&rows);
    DialectScore { dialect: dialect.clone(), pattern_score, num_rows: rows.len() }
}

/// Tokenize the sample with a throw-away reader configured for `dialect`.
///
/// The reader is flexible (ragged rows are the measurement, not an error)
/// and lenient about escapes. A mid-sample error keeps the rows parsed so
/// far, since a truncated sample can cut an escaped field short.
fn tokenize_sample(sample: &str, dialect: &Dialect, trim: &Trim) -> Vec<Vec<String>> {
    let mut builder = ReaderBuilder::new();
    builder
        .field_delimiter(FieldDelimiter::Use(dialect.field().clone()))
        .row_delimiter(RowDelimiter::Use(dialect.rows().clone()))
        .escape(match dialect.escape() {
            Some(scalar) => Escape::Scalar(scalar),
            None => Escape::None,
        })
        .trim(trim.clone())
        .flexible(true);

    let Ok(mut reader) = builder.from_str(sample) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    while let Some(next) = reader.read_row() {
        match next {
            Ok(row) => rows.push(row),
            Err(_) => break,
        }
    }
    rows
}

/// The pattern regularity score.
///
/// For each distinct row pattern `p` occurring `c` times with `f` cells:
/// `c * max(epsilon, f - 1) / f`, summed and divided by the number of
/// distinct patterns. Repetition of wide patterns scores high; a bag of
/// fragmented singletons scores near zero.
pub(crate) fn pattern_score(abstraction: &Abstraction) -> f64 {
    let mut patterns: HashMap<&[Symbol], usize> = HashMap::new();
    for pattern in abstraction.row_patterns() {
        *patterns.entry(pattern).or_insert(0) += 1;
    }
    if patterns.is_empty() {
        return 0.0;
    }

    let total: f64 = patterns
        .iter()
        .map(|(pattern, &count)| {
            let cells = cells_in(pattern) as f64;
            if cells == 0.0 {
                return 0.0;
            }
            count as f64 * (cells - 1.0).max(PATTERN_EPSILON) / cells
        })
        .sum();

    total / patterns.len() as f64
}

/// Hook for weighting pattern regularity by per-column type agreement.
/// Constant until a column type scorer lands.
fn type_alignment_score(_rows: &[Vec<String>]) -> f64 {
    1.0
}

/// Walk the ordered candidates and keep the strictly best score, so earlier
/// candidates win exact ties.
pub(crate) fn best_score(
    sample: &str,
    candidates: &[Dialect],
    trim: &Trim,
) -> Option<DialectScore> {
    let mut best: Option<DialectScore> = None;
    for dialect in candidates {
        let score = score_dialect(sample, dialect, trim);
        match &best {
            None => best = Some(score),
            Some(current) if score.beats(current) => best = Some(score),
            Some(_) => {}
        }
    }
    best
}
