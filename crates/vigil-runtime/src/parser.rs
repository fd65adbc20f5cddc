//! Parsing of Inspector and Challenger replies.
//!
//! Replies must follow the grammar mandated by the prompts in
//! `vigil_core::prompts`. Unknown pattern names or severities are errors:
//! a reply that does not parse is discarded, never best-effort repaired.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use vigil_core::detectors::sections;
use vigil_core::{
    ChallengeSeverity, ChallengedClaim, ChallengerOutput, DetectedPattern, InspectionPattern,
    InspectorOutput, Level,
};

/// Errors from reply parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Malformed pattern line: {0}")]
    MalformedPatternLine(String),
}

lazy_static! {
    static ref PATTERN_LINE: Regex = Regex::new(
        r"(?i)^\s*-\s*PATTERN:\s*(?P<pattern>[^|]+?)\s*\|\s*LOCATION:\s*(?P<location>[^|]*?)\s*\|\s*SEVERITY:\s*(?P<severity>[^|]+?)\s*\|\s*DESCRIPTION:\s*(?P<description>.*?)\s*$"
    ).unwrap();
}

/// First word of a value, without placeholder brackets or punctuation.
fn keyword(value: &str) -> &str {
    value
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
}

fn parse_level(field: &'static str, value: &str) -> Result<Level, ParseError> {
    Level::from_name(keyword(value)).ok_or_else(|| ParseError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_challenge_severity(
    field: &'static str,
    value: &str,
) -> Result<ChallengeSeverity, ParseError> {
    ChallengeSeverity::from_name(keyword(value)).ok_or_else(|| ParseError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

/// Whether the whole value is a placeholder such as `none` or `[n/a]`.
fn is_none_marker(value: &str) -> bool {
    let value = value
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '/')
        .to_ascii_lowercase();
    matches!(value.as_str(), "" | "none" | "n/a")
}

/// Free-text field that may continue on the lines after its label.
fn text_field(text: &str, label: &str) -> String {
    sections::labeled_block(text, label).unwrap_or_default()
}

/// Parse an Inspector reply.
pub fn parse_inspector_output(text: &str) -> Result<InspectorOutput, ParseError> {
    let suspicion = sections::labeled_line(text, "SUSPICION_LEVEL")
        .ok_or(ParseError::MissingField("SUSPICION_LEVEL"))?;
    let suspicion_level = parse_level("SUSPICION_LEVEL", suspicion)?;

    let mut detected_patterns = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with('-') || !trimmed.to_ascii_uppercase().contains("PATTERN:") {
            continue;
        }

        let caps = PATTERN_LINE
            .captures(line)
            .ok_or_else(|| ParseError::MalformedPatternLine(line.trim().to_string()))?;

        let name = &caps["pattern"];
        let pattern =
            InspectionPattern::from_name(keyword(name)).ok_or_else(|| ParseError::InvalidValue {
                field: "PATTERN",
                value: name.to_string(),
            })?;

        detected_patterns.push(DetectedPattern {
            pattern,
            location: caps["location"].to_string(),
            severity: parse_level("SEVERITY", &caps["severity"])?,
            description: caps["description"].to_string(),
        });
    }

    Ok(InspectorOutput {
        suspicion_level,
        detected_patterns,
        summary: text_field(text, "SUMMARY"),
        recommendation: text_field(text, "RECOMMENDATION"),
    })
}

/// Split a Challenger reply into per-claim blocks.
fn claim_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("CHALLENGED_CLAIM:") {
            if let Some(block) = current.take() {
                blocks.push(block.join("\n"));
            }
            current = Some(vec![line]);
        } else if trimmed.starts_with("OVERALL_SEVERITY:") {
            if let Some(block) = current.take() {
                blocks.push(block.join("\n"));
            }
        } else if let Some(block) = current.as_mut() {
            block.push(line);
        }
    }

    if let Some(block) = current {
        blocks.push(block.join("\n"));
    }
    blocks
}

fn parse_claim(block: &str) -> Result<ChallengedClaim, ParseError> {
    let field = |label: &'static str| {
        sections::labeled_line(block, label)
            .unwrap_or_default()
            .to_string()
    };

    let claim = sections::labeled_line(block, "CHALLENGED_CLAIM")
        .ok_or(ParseError::MissingField("CHALLENGED_CLAIM"))?;
    let severity = sections::labeled_line(block, "SEVERITY")
        .ok_or(ParseError::MissingField("SEVERITY"))?;

    Ok(ChallengedClaim {
        claim: claim.to_string(),
        flaw: field("FLAW"),
        evidence_gap: field("EVIDENCE_GAP"),
        alternative: field("ALTERNATIVE"),
        boundary_failure: sections::labeled_line(block, "BOUNDARY_FAILURE")
            .filter(|v| !is_none_marker(v))
            .map(str::to_string),
        severity: parse_challenge_severity("SEVERITY", severity)?,
    })
}

/// Parse a Challenger reply.
pub fn parse_challenger_output(text: &str) -> Result<ChallengerOutput, ParseError> {
    let overall = sections::labeled_line(text, "OVERALL_SEVERITY")
        .ok_or(ParseError::MissingField("OVERALL_SEVERITY"))?;
    let overall_severity = parse_challenge_severity("OVERALL_SEVERITY", overall)?;

    let challenged_claims = claim_blocks(text)
        .iter()
        .map(|block| parse_claim(block))
        .collect::<Result<Vec<_>, _>>()?;

    let suggested_revisions = sections::labeled_block(text, "SUGGESTED_REVISIONS")
        .map(|block| {
            block
                .lines()
                .map(|l| l.trim().trim_start_matches('-').trim())
                .filter(|l| !is_none_marker(l))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ChallengerOutput {
        challenged_claims,
        overall_severity,
        summary: text_field(text, "SUMMARY"),
        suggested_revisions,
    })
}
