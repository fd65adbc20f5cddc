//! Labeled-section extraction for agent reports.
//!
//! Agent reports use a loose, versionless text protocol of labeled sections
//! (`CLAIM:`, `RESULT:`, `EVIDENCE:`, `CONFIDENCE: 0.8`, ...). Every detector
//! reads sections through this module so the protocol is parsed in one place.
//! A missing section is `None`, never an error.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A line that opens a new ALLCAPS section (`RESULT:`, `COUNTER_EVIDENCE:`).
    static ref SECTION_LABEL: Regex = Regex::new(r"^\s*[A-Z][A-Z_]+:").unwrap();

    static ref CONFIDENCE_VALUE: Regex = Regex::new(
        r"(?m)^\s*CONFIDENCE:\s*([0-9]*\.?[0-9]+)"
    ).unwrap();
}

/// Strip `LABEL:` from the start of a line, returning what follows.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.trim_start()
        .strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(':'))
}

/// Value of the first line labeled `label`, trimmed. Empty values count as absent.
pub fn labeled_line<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| strip_label(line, label))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// The block that starts at the first `label:` line.
///
/// Blank lines directly after the label are skipped. The block then runs
/// until a blank line, the next ALLCAPS label, or end of text.
pub fn labeled_block(text: &str, label: &str) -> Option<String> {
    let mut lines = text.lines();
    let first = lines.find_map(|line| strip_label(line, label))?.trim();

    let mut block = Vec::new();
    if !first.is_empty() {
        block.push(first);
    }

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if block.is_empty() {
                continue;
            }
            break;
        }
        if SECTION_LABEL.is_match(line) {
            break;
        }
        block.push(trimmed);
    }

    Some(block.join("\n"))
}

/// Whether a line-anchored `label:` section exists at all.
pub fn has_label(text: &str, label: &str) -> bool {
    text.lines().any(|line| strip_label(line, label).is_some())
}

/// The self-reported `CONFIDENCE:` value, if present and numeric.
pub fn confidence(text: &str) -> Option<f64> {
    CONFIDENCE_VALUE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_line() {
        let text = "Intro\n  CLAIM: cache is warm\nRESULT: hits 98%\nCLAIM: second";
        assert_eq!(labeled_line(text, "CLAIM"), Some("cache is warm"));
        assert_eq!(labeled_line(text, "RESULT"), Some("hits 98%"));
        assert_eq!(labeled_line(text, "EVIDENCE"), None);
    }

    #[test]
    fn test_labeled_line_must_start_line() {
        assert_eq!(labeled_line("the CLAIM: inline", "CLAIM"), None);
        assert_eq!(labeled_line("CLAIM:   ", "CLAIM"), None);
    }

    #[test]
    fn test_block_stops_at_next_label() {
        let text = "EVIDENCE: ran tests\n- 40 passed\nCONFIDENCE: 0.9";
        assert_eq!(
            labeled_block(text, "EVIDENCE").as_deref(),
            Some("ran tests\n- 40 passed")
        );
    }

    #[test]
    fn test_block_stops_at_blank_line() {
        let text = "EVIDENCE:\nlog line one\nlog line two\n\ntrailing prose";
        assert_eq!(
            labeled_block(text, "EVIDENCE").as_deref(),
            Some("log line one\nlog line two")
        );
    }

    #[test]
    fn test_block_skips_blank_lines_after_label() {
        let text = "SUGGESTED_REVISIONS:\n\n- add tests\n- add logs\n\nSUMMARY: x";
        assert_eq!(
            labeled_block(text, "SUGGESTED_REVISIONS").as_deref(),
            Some("- add tests\n- add logs")
        );
    }

    #[test]
    fn test_empty_block_stops_at_next_label() {
        let text = "SUMMARY:\n\nRECOMMENDATION: accept";
        assert_eq!(labeled_block(text, "SUMMARY").as_deref(), Some(""));
    }

    #[test]
    fn test_block_runs_to_end() {
        assert_eq!(labeled_block("EVIDENCE: ok", "EVIDENCE").as_deref(), Some("ok"));
    }

    #[test]
    fn test_confidence() {
        assert_eq!(confidence("CLAIM: x\nCONFIDENCE: 0.85"), Some(0.85));
        assert_eq!(confidence("CONFIDENCE: .5"), Some(0.5));
        assert_eq!(confidence("CONFIDENCE: high"), None);
        assert_eq!(confidence("no confidence here"), None);
    }

    #[test]
    fn test_has_label() {
        assert!(has_label("DISCUSSION: tradeoffs", "DISCUSSION"));
        assert!(!has_label("a discussion of tradeoffs", "DISCUSSION"));
    }
}
