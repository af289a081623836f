//! Dialect inference by speculative tokenization and pattern scoring.
//!
//! Inference walks candidate `(field, row)` delimiter pairs in prior order,
//! tokenizes the leading sample under each, and keeps the dialect whose
//! output shape is most regular. The sample is consumed by the caller and
//! restored afterwards, so inference never disturbs normal reading.

mod abstraction;
mod candidates;
mod score;

use crate::config::{Escape, Trim};
use crate::delimiter::{Delimiter, Dialect, RowDelimiterSet};
use crate::error::{CsvError, Result};

/// Pick the best dialect for `sample` from the candidate lists.
///
/// Fails with an invalid configuration for empty candidate lists, and with
/// an inference failure when no candidate produces a positive pattern score.
pub(crate) fn infer_dialect(
    sample: &str,
    fields: &[Delimiter],
    rows: &[RowDelimiterSet],
    escape: Escape,
    trim: &Trim,
) -> Result<Dialect> {
    let candidates = candidates::generate(fields, rows, escape.scalar(), trim.scalars())?;
    let best = score::best_score(sample, &candidates, trim);
    match best {
        Some(best) if best.pattern_score > 0.0 => Ok(best.dialect),
        _ => Err(CsvError::InferenceFailure {
            reason: "no candidate dialect produced a positive pattern score".into(),
        }),
    }
}
