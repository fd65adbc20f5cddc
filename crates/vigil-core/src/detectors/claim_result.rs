//! Claim/Result mismatch: the stated RESULT does not back the CLAIM.

use tracing::debug;

use crate::types::InspectionPattern;

use super::{lexicon, sections, DetectionResult, Detector};

/// Below this share of shared long words, differing negation counts as a contradiction.
pub const MIN_TOKEN_OVERLAP: f64 = 0.3;

/// Compares the first `CLAIM:` and `RESULT:` lines.
///
/// Rules, first match wins:
/// 1. negation differs and token overlap is under [`MIN_TOKEN_OVERLAP`],
/// 2. the claim hedges while the result asserts certainty,
/// 3. claim and result share no salient terms.
pub struct ClaimResultMismatchDetector;

impl ClaimResultMismatchDetector {
    pub fn new() -> Self {
        Self
    }

    /// Shared long words as a fraction of the smaller side.
    fn token_overlap(claim: &str, result: &str) -> f64 {
        let claim_words = lexicon::long_words(claim);
        let result_words = lexicon::long_words(result);

        let shorter = claim_words.len().min(result_words.len());
        if shorter == 0 {
            return 0.0;
        }

        let shared = claim_words.intersection(&result_words).count();
        shared as f64 / shorter as f64
    }
}

impl Default for ClaimResultMismatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ClaimResultMismatchDetector {
    fn id(&self) -> InspectionPattern {
        InspectionPattern::ClaimResultMismatch
    }

    fn run(&self, text: &str) -> DetectionResult {
        let (Some(claim), Some(result)) = (
            sections::labeled_line(text, "CLAIM"),
            sections::labeled_line(text, "RESULT"),
        ) else {
            return DetectionResult::clear();
        };

        if lexicon::has_negation(claim) != lexicon::has_negation(result) {
            let overlap = Self::token_overlap(claim, result);
            if overlap < MIN_TOKEN_OVERLAP {
                debug!(overlap, "Negation differs between CLAIM and RESULT");
                return DetectionResult::detected(format!(
                    "CLAIM and RESULT disagree on negation with {:.0}% token overlap",
                    overlap * 100.0
                ));
            }
        }

        if lexicon::has_uncertainty(claim) && lexicon::has_high_confidence(result) {
            return DetectionResult::detected(
                "CLAIM is hedged but RESULT asserts certainty",
            );
        }

        let claim_terms = lexicon::salient_terms(claim);
        let result_terms = lexicon::salient_terms(result);
        if !claim_terms.is_empty()
            && !result_terms.is_empty()
            && claim_terms.is_disjoint(&result_terms)
        {
            return DetectionResult::detected("CLAIM and RESULT share no key terms");
        }

        DetectionResult::clear()
    }
}
