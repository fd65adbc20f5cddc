//! Overconfidence: high self-reported confidence on thin or vague evidence.

use crate::types::InspectionPattern;

use super::{lexicon, sections, DetectionResult, Detector};

const VERY_HIGH_CONFIDENCE: f64 = 0.9;
const HIGH_CONFIDENCE: f64 = 0.85;
const MIN_EVIDENCE_CHARS: usize = 100;
const MIN_HIGH_CONFIDENCE_MARKERS: usize = 2;
const MIN_SPECIFICITY: u8 = 2;

/// Compares `CONFIDENCE:` against the `EVIDENCE:` block.
///
/// A report without a numeric confidence is never flagged.
pub struct OverconfidenceDetector;

impl OverconfidenceDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OverconfidenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for OverconfidenceDetector {
    fn id(&self) -> InspectionPattern {
        InspectionPattern::Overconfidence
    }

    fn run(&self, text: &str) -> DetectionResult {
        let Some(confidence) = sections::confidence(text) else {
            return DetectionResult::clear();
        };

        let evidence = sections::labeled_block(text, "EVIDENCE").unwrap_or_default();
        let evidence_chars = evidence.chars().count();
        let specificity = lexicon::specificity_score(&evidence);

        // Short evidence is only thin when it also points at nothing concrete
        if confidence > VERY_HIGH_CONFIDENCE && evidence_chars < MIN_EVIDENCE_CHARS && specificity == 0
        {
            return DetectionResult::detected(format!(
                "Confidence {:.2} rests on {} characters of evidence with no concrete references",
                confidence, evidence_chars
            ));
        }

        let markers = lexicon::high_confidence_count(text);
        if markers >= MIN_HIGH_CONFIDENCE_MARKERS
            && lexicon::uncertainty_count(&evidence) == 0
            && confidence > HIGH_CONFIDENCE
        {
            return DetectionResult::detected(format!(
                "{} absolute-certainty markers and no acknowledged uncertainty at confidence {:.2}",
                markers, confidence
            ));
        }

        if confidence > VERY_HIGH_CONFIDENCE && specificity < MIN_SPECIFICITY {
            return DetectionResult::detected(format!(
                "Confidence {:.2} with low evidence specificity ({}/3)",
                confidence, specificity
            ));
        }

        DetectionResult::clear()
    }
}
