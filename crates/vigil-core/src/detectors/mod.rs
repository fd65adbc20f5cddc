//! Pattern detectors for agent reports.
//!
//! Each detector is an independent, stateless heuristic over the report text.
//! Detectors never fail: missing sections mean "not detected".
//!
//! | Detector | Looks at |
//! |----------|----------|
//! | [`ClaimResultMismatchDetector`] | `CLAIM:` vs `RESULT:` lines |
//! | [`OverconfidenceDetector`] | `CONFIDENCE:` vs `EVIDENCE:` block |
//! | [`MissingAlternativesDetector`] | conclusions without alternatives or limitations |
//! | [`ConfirmationBiasDetector`] | one-sided outcome language in evidence |

mod alternatives;
mod claim_result;
mod confirmation_bias;
pub mod lexicon;
mod overconfidence;
pub mod sections;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::InspectionPattern;

pub use alternatives::MissingAlternativesDetector;
pub use claim_result::ClaimResultMismatchDetector;
pub use confirmation_bias::ConfirmationBiasDetector;
pub use overconfidence::OverconfidenceDetector;

/// Outcome of running one detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: bool,
    pub reason: String,
}

impl DetectionResult {
    pub fn detected(reason: impl Into<String>) -> Self {
        Self {
            detected: true,
            reason: reason.into(),
        }
    }

    pub fn clear() -> Self {
        Self {
            detected: false,
            reason: String::new(),
        }
    }
}

/// A pluggable heuristic keyed by the pattern it detects.
pub trait Detector: Send + Sync {
    /// The inspection pattern this detector reports.
    fn id(&self) -> InspectionPattern;

    /// Run the heuristic over the report text.
    fn run(&self, text: &str) -> DetectionResult;

    fn description(&self) -> &'static str {
        self.id().description()
    }
}

/// Ordered collection of detectors.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// The built-in detectors, in evaluation order.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ClaimResultMismatchDetector::new()));
        registry.register(Box::new(OverconfidenceDetector::new()));
        registry.register(Box::new(MissingAlternativesDetector::new()));
        registry.register(Box::new(ConfirmationBiasDetector::new()));
        registry
    }

    /// Append a detector; it runs after those already registered.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn ids(&self) -> Vec<InspectionPattern> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    /// First positive detection among the enabled patterns, in registry order.
    pub fn first_detection(
        &self,
        text: &str,
        enabled: &BTreeSet<InspectionPattern>,
    ) -> Option<(InspectionPattern, DetectionResult)> {
        self.detectors
            .iter()
            .filter(|d| enabled.contains(&d.id()))
            .map(|d| (d.id(), d.run(text)))
            .find(|(_, result)| result.detected)
    }

    /// Run every detector regardless of configuration.
    pub fn run_all(&self, text: &str) -> Vec<(InspectionPattern, DetectionResult)> {
        self.detectors.iter().map(|d| (d.id(), d.run(text))).collect()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
