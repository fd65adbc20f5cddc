//! Property tests for reviewer reply parsing.

use proptest::prelude::*;

use vigil_core::{ChallengeSeverity, InspectionPattern, Level};
use vigil_runtime::{parse_challenger_output, parse_inspector_output};

fn any_level() -> impl Strategy<Value = Level> {
    prop::sample::select(vec![Level::Low, Level::Medium, Level::High])
}

fn any_pattern() -> impl Strategy<Value = InspectionPattern> {
    prop::sample::select(InspectionPattern::ALL.to_vec())
}

fn any_severity() -> impl Strategy<Value = ChallengeSeverity> {
    prop::sample::select(vec![
        ChallengeSeverity::Minor,
        ChallengeSeverity::Moderate,
        ChallengeSeverity::Critical,
    ])
}

proptest! {
    #[test]
    fn parsers_accept_arbitrary_text(text in ".{0,400}") {
        let _ = parse_inspector_output(&text);
        let _ = parse_challenger_output(&text);
    }

    #[test]
    fn well_formed_inspector_reply_parses(
        level in any_level(),
        findings in prop::collection::vec((any_pattern(), any_level()), 0..5),
    ) {
        let mut reply = String::from("INSPECTION_REPORT:\n");
        for (pattern, severity) in &findings {
            reply.push_str(&format!(
                "- PATTERN: {} | LOCATION: RESULT | SEVERITY: {} | DESCRIPTION: flagged\n",
                pattern, severity
            ));
        }
        reply.push_str(&format!("SUSPICION_LEVEL: {}\nSUMMARY: s\nRECOMMENDATION: r\n", level));

        let output = parse_inspector_output(&reply).unwrap();
        prop_assert_eq!(output.suspicion_level, level);
        prop_assert_eq!(output.detected_patterns.len(), findings.len());
        for (parsed, (pattern, severity)) in output.detected_patterns.iter().zip(&findings) {
            prop_assert_eq!(parsed.pattern, *pattern);
            prop_assert_eq!(parsed.severity, *severity);
        }
    }

    #[test]
    fn well_formed_challenger_reply_parses(
        overall in any_severity(),
        claims in prop::collection::vec(any_severity(), 0..4),
    ) {
        let mut reply = String::new();
        for (i, severity) in claims.iter().enumerate() {
            reply.push_str(&format!(
                "CHALLENGED_CLAIM: claim {}\nFLAW: f\nEVIDENCE_GAP: g\nALTERNATIVE: a\nBOUNDARY_FAILURE: none\nSEVERITY: {}\n\n",
                i, severity
            ));
        }
        reply.push_str(&format!("OVERALL_SEVERITY: {}\nSUMMARY: s\n", overall));

        let output = parse_challenger_output(&reply).unwrap();
        prop_assert_eq!(output.overall_severity, overall);
        prop_assert_eq!(output.challenged_claims.len(), claims.len());
        for (parsed, severity) in output.challenged_claims.iter().zip(&claims) {
            prop_assert_eq!(parsed.severity, *severity);
            prop_assert!(parsed.boundary_failure.is_none());
        }
    }
}
