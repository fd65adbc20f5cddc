//! Confirmation bias: evidence that could only ever have confirmed the claim.

use crate::types::InspectionPattern;

use super::{lexicon, sections, DetectionResult, Detector};

const MAX_UNCHALLENGED_POSITIVES: usize = 3;
const MAX_EXPECTED_PHRASES: usize = 1;

/// Flags one-sided evidence when the report never mentions looking for counter-evidence.
pub struct ConfirmationBiasDetector;

impl ConfirmationBiasDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConfirmationBiasDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ConfirmationBiasDetector {
    fn id(&self) -> InspectionPattern {
        InspectionPattern::ConfirmationBias
    }

    fn run(&self, text: &str) -> DetectionResult {
        if lexicon::mentions_counter_evidence_search(text) {
            return DetectionResult::clear();
        }

        let evidence = sections::labeled_block(text, "EVIDENCE").unwrap_or_default();
        let positives = lexicon::positive_outcome_count(&evidence);
        let negatives = lexicon::negative_outcome_count(&evidence);

        if positives > MAX_UNCHALLENGED_POSITIVES && negatives == 0 {
            return DetectionResult::detected(format!(
                "Evidence lists {} positive outcomes and no negative ones",
                positives
            ));
        }

        let expected = lexicon::expected_outcome_phrase_count(text);
        if expected > MAX_EXPECTED_PHRASES {
            return DetectionResult::detected(format!(
                "{} 'as expected'-style phrases without a search for counter-evidence",
                expected
            ));
        }

        DetectionResult::clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> DetectionResult {
        ConfirmationBiasDetector::new().run(text)
    }

    #[test]
    fn test_one_sided_evidence_detected() {
        let text = "EVIDENCE: unit tests passed, integration passed, lint passed, build succeeded";
        let result = detect(text);
        assert!(result.detected);
        assert!(result.reason.contains("4 positive"));
    }

    #[test]
    fn test_negative_outcome_balances_evidence() {
        let text = "EVIDENCE: unit tests passed, integration passed, lint passed, build succeeded, one flaky test failed";
        assert!(!detect(text).detected);
    }

    #[test]
    fn test_counter_evidence_search_suppresses() {
        let text = "EVIDENCE: unit tests passed, integration passed, lint passed, build succeeded\n\
                    NOTE: I also searched for counterexamples in the issue tracker";
        assert!(!detect(text).detected);
    }

    #[test]
    fn test_expected_phrases_detected() {
        let text = "RESULT: login works as expected\nNo issues found during the check.";
        let result = detect(text);
        assert!(result.detected);
        assert!(result.reason.contains("2 'as expected'"));
    }

    #[test]
    fn test_counter_evidence_search_suppresses_expected_phrases() {
        let text = "RESULT: login works as expected\nNo issues found during the check.\n\
                    I also searched for edge cases around expired sessions.";
        assert!(!detect(text).detected);
    }

    #[test]
    fn test_single_expected_phrase_not_detected() {
        assert!(!detect("RESULT: login works as expected").detected);
    }

    #[test]
    fn test_japanese_phrases() {
        assert!(detect("結果: 期待通りに正常に動作した").detected);
    }
}
