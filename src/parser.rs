//! Coverage record parsing: line-oriented text into `RawRecord`s.
use std::str::Lines;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::RawRecord;

/// `TAG:FLAG,START,LEN`, unanchored so prefix and suffix text is ignored.
#[allow(clippy::expect_used, reason = "the pattern is a literal and compiles")]
static RECORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"([A-Z]+):(T|NIL),([0-9]+),([0-9]+)").expect("valid regex");
});

/// Lazy sequence of records over the lines of one input.
/// Yields at most one record per line; non-matching lines are skipped.
pub struct Records<'a> {
    /// Remaining input lines.
    lines: Lines<'a>,
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        return self.lines.find_map(parse_line);
    }
}

/// Parse coverage record text. Never fails; call again with the same text to
/// restart the sequence.
pub fn parse(text: &str) -> Records<'_> {
    return Records { lines: text.lines() };
}

/// Parse a single line, returning the first usable record found anywhere in
/// it. A match whose offsets overflow is passed over for a later one.
pub fn parse_line(line: &str) -> Option<RawRecord> {
    let record = RECORD_PATTERN
        .captures_iter(line)
        .find_map(|cap| return record_from_capture(&cap, line));
    if record.is_none() && !line.trim().is_empty() {
        log::debug!("skipping line without a coverage record: {line:?}");
    }
    return record;
}

/// Convert a grammar match into a record. Digit runs that overflow `u64`
/// yield nothing.
fn record_from_capture(cap: &Captures<'_>, line: &str) -> Option<RawRecord> {
    let kind = cap.get(1)?.as_str();
    let flag = cap.get(2)?.as_str();
    let start = cap.get(3)?.as_str();
    let length = cap.get(4)?.as_str();

    let (Ok(start), Ok(length)) = (start.parse::<u64>(), length.parse::<u64>()) else {
        log::debug!("skipping record with out-of-range offsets: {line:?}");
        return None;
    };

    return Some(RawRecord {
        executed: flag == "T",
        kind: kind.to_string(),
        length,
        start,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, executed: bool, start: u64, length: u64) -> RawRecord {
        return RawRecord { executed, kind: kind.to_string(), length, start };
    }

    #[test]
    fn parses_executed_and_unexecuted_flags() {
        let records: Vec<RawRecord> = parse("BRANCH:T,10,5\nBRANCH:NIL,95,10\n").collect();
        assert_eq!(
            records,
            vec![record("BRANCH", true, 10, 5), record("BRANCH", false, 95, 10)]
        );
    }

    #[test]
    fn skips_lines_without_a_record() {
        let records: Vec<RawRecord> = parse("hello world\n\ngarbage\nBRANCH:X,1,2").collect();
        assert!(records.is_empty());
    }

    #[test]
    fn honors_match_inside_longer_line() {
        let line = ";; form BRANCH:T,3,4 (from instrumentation pass)";
        assert_eq!(parse_line(line), Some(record("BRANCH", true, 3, 4)));
    }

    #[test]
    fn lowercase_prefix_does_not_join_the_tag() {
        assert_eq!(parse_line("xyzEXPR:NIL,0,1"), Some(record("EXPR", false, 0, 1)));
    }

    #[test]
    fn first_match_on_a_line_wins() {
        assert_eq!(
            parse_line("BRANCH:T,1,2 BRANCH:NIL,3,4"),
            Some(record("BRANCH", true, 1, 2))
        );
    }

    #[test]
    fn zero_length_records_still_parse() {
        assert_eq!(parse_line("BRANCH:T,7,0"), Some(record("BRANCH", true, 7, 0)));
    }

    #[test]
    fn overflowing_offsets_are_skipped() {
        assert_eq!(parse_line("BRANCH:T,99999999999999999999999,1"), None);
    }

    #[test]
    fn later_match_used_when_first_overflows() {
        assert_eq!(
            parse_line("X:T,99999999999999999999,1 BRANCH:T,1,1"),
            Some(record("BRANCH", true, 1, 1))
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        let records: Vec<RawRecord> = parse("BRANCH:T,1,1\r\nBRANCH:NIL,2,2\r\n").collect();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn sequence_restarts_on_reparse() {
        let text = "BRANCH:T,1,1\nnoise\nBRANCH:T,2,2\n";
        let first: Vec<RawRecord> = parse(text).collect();
        let second: Vec<RawRecord> = parse(text).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
