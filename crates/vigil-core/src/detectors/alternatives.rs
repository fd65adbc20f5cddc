//! Missing alternatives: confident conclusions that never consider other explanations.

use crate::types::InspectionPattern;

use super::{lexicon, sections, DetectionResult, Detector};

const CONFIDENT: f64 = 0.8;
const VERY_CONFIDENT: f64 = 0.85;

/// Flags confident conclusions with no alternatives, counter-evidence,
/// limitations or discussion section.
pub struct MissingAlternativesDetector;

impl MissingAlternativesDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MissingAlternativesDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MissingAlternativesDetector {
    fn id(&self) -> InspectionPattern {
        InspectionPattern::MissingAlternatives
    }

    fn run(&self, text: &str) -> DetectionResult {
        if !lexicon::has_conclusion(text) {
            return DetectionResult::clear();
        }
        let Some(confidence) = sections::confidence(text) else {
            return DetectionResult::clear();
        };

        let considers_other_views = lexicon::has_alternative(text)
            || lexicon::has_counter_evidence(text)
            || lexicon::has_limitation(text);

        if confidence > CONFIDENT && !considers_other_views {
            return DetectionResult::detected(format!(
                "Conclusion at confidence {:.2} without alternatives, counter-evidence or limitations",
                confidence
            ));
        }

        if confidence > VERY_CONFIDENT && !lexicon::has_discussion(text) {
            return DetectionResult::detected(format!(
                "Conclusion at confidence {:.2} without a DISCUSSION section",
                confidence
            ));
        }

        DetectionResult::clear()
    }
}
