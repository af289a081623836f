//! Generation of candidate dialects for inference.

use crate::delimiter::{Delimiter, Dialect, Delimiters, RowDelimiterSet};
use crate::error::{CsvError, Result};

/// Build the ordered candidate dialects from the user-supplied lists.
///
/// Pairs `(F[i], R[j])` are ordered by `i + j` ascending, so earlier-listed
/// delimiters of either slot are preferred roughly equally when scores tie.
/// Duplicated entries are collapsed by scalar-sequence equality before
/// pairing, and pairs that fail dialect validation are discarded.
pub(crate) fn generate(
    fields: &[Delimiter],
    rows: &[RowDelimiterSet],
    escape: Option<char>,
    trim: &[char],
) -> Result<Vec<Dialect>> {
    if fields.is_empty() {
        return Err(CsvError::config(
            "inference requires at least one field delimiter candidate",
        ));
    }
    if rows.is_empty() {
        return Err(CsvError::config(
            "inference requires at least one row delimiter candidate",
        ));
    }

    let fields = dedup(fields);
    let rows = dedup(rows);

    let mut ranked: Vec<(usize, Dialect)> = Vec::with_capacity(fields.len() * rows.len());
    for (i, field) in fields.iter().enumerate() {
        for (j, row) in rows.iter().enumerate() {
            let Ok(delimiters) = Delimiters::new(field.clone(), row.clone()) else {
                continue;
            };
            let Ok(dialect) = Dialect::new(delimiters, escape) else {
                continue;
            };
            if dialect.validate_trim(trim).is_err() {
                continue;
            }
            ranked.push((i + j, dialect));
        }
    }

    // Stable sort keeps the field-major generation order within equal ranks.
    ranked.sort_by_key(|(rank, _)| *rank);
    Ok(ranked.into_iter().map(|(_, dialect)| dialect).collect())
}

/// Collapse duplicates while preserving first-occurrence order.
fn dedup<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delim(scalars: &str) -> Delimiter {
        Delimiter::new(scalars).unwrap()
    }

    fn single(scalars: &str) -> RowDelimiterSet {
        RowDelimiterSet::single(delim(scalars))
    }

    #[test]
    fn test_empty_candidate_lists_rejected() {
        let err = generate(&[], &[single("\n")], None, &[]).unwrap_err();
        assert_eq!(err.code(), 1);
        let err = generate(&[delim(",")], &[], None, &[]).unwrap_err();
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_pairs_ordered_by_combined_rank() {
        let fields = [delim(","), delim(";")];
        let rows = [single("\n"), single("\r\n")];
        let dialects = generate(&fields, &rows, None, &[]).unwrap();
        let order: Vec<(String, String)> = dialects
            .iter()
            .map(|d| (d.field().as_string(), d.rows().delimiters()[0].as_string()))
            .collect();
        assert_eq!(order[0], (",".into(), "\n".into()));
        // Rank 1 pairs keep generation order: (",", "\r\n") before (";", "\n").
        assert_eq!(order[1], (",".into(), "\r\n".into()));
        assert_eq!(order[2], (";".into(), "\n".into()));
        assert_eq!(order[3], (";".into(), "\r\n".into()));
    }

    #[test]
    fn test_ambiguous_pairs_discarded() {
        let fields = [delim("-"), delim(",")];
        let rows = [single("--")];
        let dialects = generate(&fields, &rows, None, &[]).unwrap();
        assert_eq!(dialects.len(), 1);
        assert_eq!(dialects[0].field().as_string(), ",");
    }

    #[test]
    fn test_escape_collisions_discarded() {
        let fields = [delim("~"), delim(",")];
        let rows = [single("\n")];
        let dialects = generate(&fields, &rows, Some('~'), &[]).unwrap();
        assert_eq!(dialects.len(), 1);
        assert_eq!(dialects[0].field().as_string(), ",");
    }

    #[test]
    fn test_duplicates_collapsed() {
        let fields = [delim(","), delim(","), delim(";")];
        let rows = [single("\n"), single("\n")];
        let dialects = generate(&fields, &rows, None, &[]).unwrap();
        assert_eq!(dialects.len(), 2);
    }
}
