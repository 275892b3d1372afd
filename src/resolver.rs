//! Range and state resolution: parsed records into a renderable `CoverageSet`.
use crate::parser;
use crate::types::{Annotation, CoverageSet, CoverageState, RawRecord};

/// Shift from zero-based record offsets to one-based document positions.
pub const COORDINATE_SHIFT: u64 = 1;

/// Why a record produced no annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The shifted range would overflow `u64`.
    Overflow,
    /// The range ends past `document_length + 1`.
    PastEnd,
    /// The record covers zero characters.
    ZeroLength,
}

/// Resolve records against a document of `document_length` characters.
///
/// Each record becomes `[start + 1, start + 1 + length)` tagged with its state.
/// Degenerate and out-of-bounds ranges are dropped. Order and duplicates are
/// preserved exactly as they appear in the input.
pub fn resolve<I>(records: I, document_length: u64) -> CoverageSet
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut set = CoverageSet::default();
    let mut dropped = 0_usize;

    for record in records {
        match resolve_record(&record, document_length) {
            Ok(annotation) => set.push(annotation),
            Err(rejection) => {
                dropped = dropped.saturating_add(1);
                log::debug!(
                    "dropping {}:{},{} ({rejection:?}, document length {document_length})",
                    record.kind,
                    record.start,
                    record.length
                );
            },
        }
    }

    log::debug!("resolved {} annotations, dropped {dropped}", set.len());
    return set;
}

/// Resolve a single record, reporting why it was rejected.
///
/// # Errors
///
/// Returns the `Rejection` reason when the range is empty, overflows, or
/// reaches past the end of the document.
pub fn resolve_record(record: &RawRecord, document_length: u64) -> Result<Annotation, Rejection> {
    if record.length == 0 {
        return Err(Rejection::ZeroLength);
    }

    // Offsets are unsigned, so the shifted start is never negative.
    let start = record.start.checked_add(COORDINATE_SHIFT).ok_or(Rejection::Overflow)?;
    let end = start.checked_add(record.length).ok_or(Rejection::Overflow)?;
    let limit = document_length.checked_add(COORDINATE_SHIFT).ok_or(Rejection::Overflow)?;

    if end > limit {
        return Err(Rejection::PastEnd);
    }

    return Ok(Annotation {
        range: start..end,
        state: CoverageState::from_executed(record.executed),
    });
}

/// Parse and resolve record text in one step.
pub fn resolve_text(text: &str, document_length: u64) -> CoverageSet {
    return resolve(parser::parse(text), document_length);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(executed: bool, start: u64, length: u64) -> RawRecord {
        return RawRecord { executed, kind: "BRANCH".to_string(), length, start };
    }

    #[test]
    fn executed_record_shifts_by_one() {
        let set = resolve_text("BRANCH:T,10,5", 100);
        assert_eq!(
            set.as_slice(),
            &[Annotation { range: 11..16, state: CoverageState::Executed }]
        );
    }

    #[test]
    fn range_past_end_is_dropped() {
        assert!(resolve_text("BRANCH:NIL,95,10", 100).is_empty());
    }

    #[test]
    fn range_ending_exactly_at_document_end_is_kept() {
        let set = resolve_text("BRANCH:NIL,95,5", 100);
        assert_eq!(
            set.as_slice(),
            &[Annotation { range: 96..101, state: CoverageState::NotExecuted }]
        );
    }

    #[test]
    fn garbage_resolves_to_nothing() {
        assert!(resolve_text("garbage", 100).is_empty());
    }

    #[test]
    fn zero_length_is_rejected() {
        assert_eq!(resolve_record(&record(true, 3, 0), 100), Err(Rejection::ZeroLength));
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(resolve_record(&record(true, u64::MAX, 1), u64::MAX), Err(Rejection::Overflow));
        assert_eq!(
            resolve_record(&record(true, u64::MAX - 2, 5), u64::MAX - 1),
            Err(Rejection::Overflow)
        );
    }

    #[test]
    fn empty_document_accepts_nothing() {
        assert_eq!(resolve_record(&record(true, 0, 1), 0), Err(Rejection::PastEnd));
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let records = vec![
            record(false, 20, 3),
            record(true, 0, 50),
            record(false, 20, 3),
            record(true, 5, 2),
        ];
        let set = resolve(records, 100);
        let ranges: Vec<_> = set.iter().map(|a| a.range.clone()).collect();
        assert_eq!(ranges, vec![21..24, 1..51, 21..24, 6..8]);
    }

    #[test]
    fn reapplication_is_idempotent() {
        let text = "BRANCH:T,0,4\nBRANCH:NIL,2,2\nnoise\nBRANCH:T,8,1\n";
        assert_eq!(resolve_text(text, 10), resolve_text(text, 10));
    }

    #[test]
    fn shrinking_document_only_removes_annotations() {
        let text = "BRANCH:T,0,4\nBRANCH:NIL,2,8\nBRANCH:T,8,1\nBRANCH:T,3,3\n";
        let mut previous = resolve_text(text, 12);
        for length in (0..12).rev() {
            let current = resolve_text(text, length);
            assert!(current.len() <= previous.len());
            assert!(current.iter().all(|a| previous.iter().any(|p| p == a)));
            previous = current;
        }
    }

    #[test]
    fn retained_ranges_are_never_empty_or_past_end() {
        let text = "A:T,0,0\nA:T,0,1\nA:NIL,9,1\nA:NIL,9,2\nA:T,10,1\n";
        let set = resolve_text(text, 10);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|a| a.range.start < a.range.end && a.range.end <= 11));
    }
}
