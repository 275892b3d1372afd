//! Core domain types: coverage states, parsed records, and resolved annotations.
use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;

/// Every coverage state, in the order the legend presents them.
pub const ALL_STATES: [CoverageState; 7] = [
    CoverageState::Executed,
    CoverageState::NotExecuted,
    CoverageState::NotInstrumented,
    CoverageState::ConditionalizedOut,
    CoverageState::BothBranchesTaken,
    CoverageState::OneBranchTaken,
    CoverageState::NeitherBranchTaken,
];

/// A resolved, bounds-checked range ready for rendering.
/// `range.start < range.end` holds for every annotation the resolver emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// One-based, end-exclusive character positions in the document.
    pub range: Range<u64>,
    /// Coverage classification of the range.
    pub state: CoverageState,
}

/// Ordered annotations in record-file order. Overlaps and duplicates are
/// kept so the renderer can choose its own composition policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoverageSet {
    /// The annotations, in input order.
    annotations: Vec<Annotation>,
}

impl CoverageSet {
    /// Borrow the annotations as a slice.
    pub fn as_slice(&self) -> &[Annotation] {
        return &self.annotations;
    }

    /// True when nothing survived resolution.
    pub fn is_empty(&self) -> bool {
        return self.annotations.is_empty();
    }

    /// Iterate annotations in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        return self.annotations.iter();
    }

    /// Number of annotations, duplicates included.
    pub fn len(&self) -> usize {
        return self.annotations.len();
    }

    /// Append one annotation at the end.
    pub(crate) fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Count annotations per state.
    pub fn summary(&self) -> CoverageSummary {
        let mut by_state: BTreeMap<CoverageState, usize> = BTreeMap::new();
        for annotation in &self.annotations {
            let count = by_state.entry(annotation.state).or_default();
            *count = count.saturating_add(1);
        }
        return CoverageSummary {
            by_state,
            total: self.annotations.len(),
        };
    }
}

impl<'a> IntoIterator for &'a CoverageSet {
    type IntoIter = std::slice::Iter<'a, Annotation>;
    type Item = &'a Annotation;

    fn into_iter(self) -> Self::IntoIter {
        return self.annotations.iter();
    }
}

impl IntoIterator for CoverageSet {
    type IntoIter = std::vec::IntoIter<Annotation>;
    type Item = Annotation;

    fn into_iter(self) -> Self::IntoIter {
        return self.annotations.into_iter();
    }
}

/// Closed set of coverage classifications for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageState {
    /// Both arms of a conditional ran.
    BothBranchesTaken,
    /// Excluded at read time (feature expressions and the like).
    ConditionalizedOut,
    /// The form ran at least once.
    Executed,
    /// Neither arm of a conditional ran.
    NeitherBranchTaken,
    /// The form never ran.
    NotExecuted,
    /// No instrumentation was emitted for the range.
    NotInstrumented,
    /// Exactly one arm of a conditional ran.
    OneBranchTaken,
}

impl CoverageState {
    /// Numeric code used by the instrumentation tool's legacy state tables.
    pub fn code(self) -> u32 {
        return match self {
            Self::NotInstrumented => 0,
            Self::Executed => 1,
            Self::NotExecuted => 2,
            Self::BothBranchesTaken => 5,
            Self::OneBranchTaken => 6,
            Self::NeitherBranchTaken => 9,
            Self::ConditionalizedOut => 15,
        };
    }

    /// Map a numeric state code to a state. Unknown codes fall back to
    /// `NotInstrumented` so a renderer always has something to draw.
    pub fn from_code(code: i64) -> Self {
        return match code {
            1 => Self::Executed,
            2 => Self::NotExecuted,
            5 => Self::BothBranchesTaken,
            6 => Self::OneBranchTaken,
            9 => Self::NeitherBranchTaken,
            15 => Self::ConditionalizedOut,
            _ => Self::NotInstrumented,
        };
    }

    /// Map the executed flag of a record to its state.
    pub fn from_executed(executed: bool) -> Self {
        return if executed { Self::Executed } else { Self::NotExecuted };
    }

    /// Human-readable label for tooltips and reports.
    pub fn label(self) -> &'static str {
        return match self {
            Self::BothBranchesTaken => "Both branches taken",
            Self::ConditionalizedOut => "Conditionalized out",
            Self::Executed => "Executed form",
            Self::NeitherBranchTaken => "Neither branch taken",
            Self::NotExecuted => "Unexecuted form",
            Self::NotInstrumented => "Not instrumented",
            Self::OneBranchTaken => "One branch taken",
        };
    }

    /// Presentation token a renderer uses to pick a visual style.
    pub fn style_token(self) -> &'static str {
        return match self {
            Self::BothBranchesTaken => "coverage-both-branches",
            Self::ConditionalizedOut => "coverage-conditionalized-out",
            Self::Executed => "coverage-executed",
            Self::NeitherBranchTaken => "coverage-neither-branch",
            Self::NotExecuted => "coverage-not-executed",
            Self::NotInstrumented => "coverage-not-instrumented",
            Self::OneBranchTaken => "coverage-one-branch",
        };
    }
}

/// Per-state annotation counts for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    /// Annotation count keyed by state. States with no annotations are absent.
    pub by_state: BTreeMap<CoverageState, usize>,
    /// Total annotations, duplicates included.
    pub total: usize,
}

impl CoverageSummary {
    /// Count for one state, zero when absent.
    pub fn count(&self, state: CoverageState) -> usize {
        return self.by_state.get(&state).copied().unwrap_or(0);
    }
}

/// One matched line of a coverage record file. Offsets are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    /// `T` in the record maps to true, `NIL` to false.
    pub executed: bool,
    /// Uppercase tag before the colon, e.g. `BRANCH`.
    pub kind: String,
    /// Number of characters covered.
    pub length: u64,
    /// Zero-based character offset of the first covered character.
    pub start: u64,
}

/// Style token for a numeric state code, defaulting like `from_code`.
pub fn style_token_for_code(code: i64) -> &'static str {
    return CoverageState::from_code(code).style_token();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for state in ALL_STATES {
            assert_eq!(CoverageState::from_code(i64::from(state.code())), state);
        }
    }

    #[test]
    fn unknown_code_defaults_to_not_instrumented() {
        assert_eq!(CoverageState::from_code(3), CoverageState::NotInstrumented);
        assert_eq!(CoverageState::from_code(-1), CoverageState::NotInstrumented);
        assert_eq!(style_token_for_code(42), "coverage-not-instrumented");
    }

    #[test]
    fn labels_and_tokens_are_distinct() {
        let mut labels: Vec<&str> = ALL_STATES.iter().map(|s| s.label()).collect();
        let mut tokens: Vec<&str> = ALL_STATES.iter().map(|s| s.style_token()).collect();
        labels.sort_unstable();
        labels.dedup();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(labels.len(), ALL_STATES.len());
        assert_eq!(tokens.len(), ALL_STATES.len());
    }

    #[test]
    fn summary_counts_duplicates() {
        let mut set = CoverageSet::default();
        set.push(Annotation { range: 1..3, state: CoverageState::Executed });
        set.push(Annotation { range: 1..3, state: CoverageState::Executed });
        set.push(Annotation { range: 4..5, state: CoverageState::NotExecuted });

        let summary = set.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(CoverageState::Executed), 2);
        assert_eq!(summary.count(CoverageState::NotExecuted), 1);
        assert_eq!(summary.count(CoverageState::OneBranchTaken), 0);
    }
}
