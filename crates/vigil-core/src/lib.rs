//! # vigil-core
//!
//! Deterministic verification workflow engine for autonomous agent reports.
//!
//! This crate decides whether an agent's CLAIM/EVIDENCE/RESULT report can be
//! trusted as-is, or must first go through secondary review (the Inspector)
//! and adversarial critique (the Challenger):
//! - Should this report be verified at all?
//! - What should the reviewers be asked?
//! - Given their replies, what is the verdict?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same verdict
//! 2. **No LLM calls**: Prompts are built here, agents run elsewhere
//! 3. **Never fails**: Missing sections and reports mean "insufficient signal"
//! 4. **Monotonic**: Verdicts only escalate within one synthesis
//!
//! ## Example
//!
//! ```rust,ignore
//! use vigil_core::{
//!     resolve_verification_config, should_trigger_verification, TriggerMode,
//!     VerificationContext,
//! };
//!
//! let config = resolve_verification_config();
//! let context = VerificationContext::new("production migration", TriggerMode::PostSubagent);
//! let decision = should_trigger_verification(report, 0.92, &context, &config);
//!
//! if decision.trigger {
//!     let prompt = build_inspector_prompt(report, &context, &config);
//!     // run the Inspector elsewhere, then:
//!     let result = synthesize_verification_result(report, 0.92, Some(inspector), None, &context, &config);
//! }
//! ```

pub mod config;
pub mod detectors;
pub mod prompts;
pub mod synthesizer;
pub mod trigger;
pub mod types;

// Re-export main types at crate root
pub use config::{
    reset_verification_config, resolve_verification_config, ChallengerConfig, ConfigError,
    ConfigProvider, ConfigResolver, InspectorConfig, VerificationConfig, VerificationMode,
};
pub use detectors::{
    ClaimResultMismatchDetector, ConfirmationBiasDetector, DetectionResult, Detector,
    DetectorRegistry, MissingAlternativesDetector, OverconfidenceDetector,
};
pub use prompts::{build_challenger_prompt, build_inspector_prompt};
pub use synthesizer::Synthesizer;
pub use trigger::{is_high_stakes_task, TriggerEvaluator, LOW_CONFIDENCE_THRESHOLD};
pub use types::{
    ChallengeCategory, ChallengeSeverity, ChallengedClaim, ChallengerOutput, DetectedPattern,
    FallbackBehavior, InspectionPattern, InspectorOutput, Level, TriggerDecision, TriggerMode,
    Verdict, VerificationContext, VerificationResult,
};

/// Decide whether `output` needs verification, using the built-in detectors.
pub fn should_trigger_verification(
    output: &str,
    confidence: f64,
    context: &VerificationContext,
    config: &VerificationConfig,
) -> TriggerDecision {
    TriggerEvaluator::new().evaluate(output, confidence, context, config)
}

/// Combine Inspector/Challenger replies into the final verification result.
pub fn synthesize_verification_result(
    original_output: &str,
    original_confidence: f64,
    inspector: Option<InspectorOutput>,
    challenger: Option<ChallengerOutput>,
    context: &VerificationContext,
    config: &VerificationConfig,
) -> VerificationResult {
    Synthesizer::new().synthesize(
        original_output,
        original_confidence,
        inspector,
        challenger,
        context,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
CLAIM: the session cache no longer leaks
EVIDENCE: ran the soak test
CONFIDENCE: 0.95
RESULT: memory is definitely stable";

    #[test]
    fn test_full_round() {
        let config = VerificationConfig::default();
        let context = VerificationContext::new("rotate session tokens", TriggerMode::PostSubagent)
            .with_agent("worker-1");

        // Security task: fires regardless of confidence
        let decision = should_trigger_verification(REPORT, 0.95, &context, &config);
        assert!(decision.trigger);

        let inspector_prompt = build_inspector_prompt(REPORT, &context, &config);
        let challenger_prompt = build_challenger_prompt(REPORT, &context, &config);
        assert!(inspector_prompt.contains(REPORT));
        assert!(challenger_prompt.contains(REPORT));

        let inspector = InspectorOutput {
            suspicion_level: Level::Medium,
            detected_patterns: vec![],
            summary: "evidence is a single soak run".to_string(),
            recommendation: "add heap profile".to_string(),
        };
        let result =
            synthesize_verification_result(REPORT, 0.95, Some(inspector), None, &context, &config);

        assert!(result.triggered);
        assert_eq!(result.final_verdict, Verdict::PassWithWarnings);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_confident_routine_report_skipped() {
        let context = VerificationContext::new("refactor helper", TriggerMode::PostSubagent);
        let decision =
            should_trigger_verification(REPORT, 0.95, &context, &VerificationConfig::default());
        assert!(!decision.trigger);
    }
}
