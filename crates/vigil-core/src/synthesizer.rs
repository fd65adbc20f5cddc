//! Synthesizer: combines Inspector and Challenger reports into a final verdict.
//!
//! The synthesizer applies fixed escalation rules in order:
//! 1. Inspector suspicion caps confidence and raises the verdict
//! 2. A high-severity Inspector pattern escalates per the fallback behavior
//! 3. Challenger severity caps confidence and raises the verdict
//! 4. Reaching the maximum verification depth forces human review
//!
//! Verdicts only ever move toward stricter states within one call.
//! Absent reports skip their rules; synthesis never fails.

use chrono::Utc;
use tracing::debug;

use crate::config::VerificationConfig;
use crate::types::{
    ChallengeSeverity, ChallengerOutput, FallbackBehavior, InspectorOutput, Level, Verdict,
    VerificationContext, VerificationResult,
};

/// Confidence cap after high Inspector suspicion.
pub const HIGH_SUSPICION_CAP: f64 = 0.5;
/// Confidence cap after medium Inspector suspicion.
pub const MEDIUM_SUSPICION_CAP: f64 = 0.7;
/// Confidence cap after a critical challenge.
pub const CRITICAL_CHALLENGE_CAP: f64 = 0.3;
/// Confidence cap after a moderate challenge.
pub const MODERATE_CHALLENGE_CAP: f64 = 0.6;

/// How a serious flaw escalates under a given fallback behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Escalation {
    verdict: Verdict,
    requires_re_run: bool,
}

impl FallbackBehavior {
    /// Escalation for a serious flaw whose non-blocking verdict is `otherwise`.
    fn escalation(self, otherwise: Verdict) -> Escalation {
        match self {
            FallbackBehavior::Block => Escalation {
                verdict: Verdict::Blocked,
                requires_re_run: true,
            },
            FallbackBehavior::Warn | FallbackBehavior::AutoReject => Escalation {
                verdict: otherwise,
                requires_re_run: false,
            },
        }
    }
}

/// Running state of one synthesis.
struct Accumulator {
    verdict: Verdict,
    confidence: f64,
    requires_re_run: bool,
    warnings: Vec<String>,
}

impl Accumulator {
    fn new(confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            verdict: Verdict::Pass,
            confidence,
            requires_re_run: false,
            warnings: Vec::new(),
        }
    }

    fn raise(&mut self, verdict: Verdict) {
        self.verdict = self.verdict.escalate(verdict);
    }

    fn cap(&mut self, ceiling: f64) {
        self.confidence = self.confidence.min(ceiling);
    }

    fn apply(&mut self, escalation: Escalation) {
        self.raise(escalation.verdict);
        self.requires_re_run |= escalation.requires_re_run;
    }

    fn warn(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// The Synthesizer turns review outputs into a [`VerificationResult`].
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a verification result.
    ///
    /// # Arguments
    ///
    /// * `original_output` - The report that was reviewed
    /// * `original_confidence` - The report's self-assessed confidence
    /// * `inspector` - Inspector report, if the Inspector ran
    /// * `challenger` - Challenger report, if the Challenger ran
    /// * `context` - Call context, including the re-verification counter
    /// * `config` - Active verification config
    ///
    /// Synthesis runs only for rounds whose trigger fired, so the result is
    /// always `triggered`. `trigger_reason` describes the review inputs; the
    /// runtime orchestrator replaces it with the trigger decision's reason.
    pub fn synthesize(
        &self,
        original_output: &str,
        original_confidence: f64,
        inspector: Option<InspectorOutput>,
        challenger: Option<ChallengerOutput>,
        context: &VerificationContext,
        config: &VerificationConfig,
    ) -> VerificationResult {
        let mut acc = Accumulator::new(original_confidence);
        let fallback = config.fallback_behavior;

        if let Some(report) = &inspector {
            match report.suspicion_level {
                Level::High => {
                    acc.raise(Verdict::NeedsReview);
                    acc.cap(HIGH_SUSPICION_CAP);
                    acc.warn(format!("Inspector: high suspicion. {}", report.summary.trim()));
                }
                Level::Medium => {
                    acc.raise(Verdict::PassWithWarnings);
                    acc.cap(MEDIUM_SUSPICION_CAP);
                    acc.warn(format!("Inspector: medium suspicion. {}", report.summary.trim()));
                }
                Level::Low => {}
            }

            let high_patterns: Vec<_> = report
                .detected_patterns
                .iter()
                .filter(|p| p.severity == Level::High)
                .map(|p| p.pattern.as_str())
                .collect();
            if !high_patterns.is_empty() {
                acc.apply(fallback.escalation(Verdict::NeedsReview));
                acc.warn(format!(
                    "Inspector: high-severity patterns detected ({})",
                    high_patterns.join(", ")
                ));
            }
        }

        if let Some(report) = &challenger {
            match report.overall_severity {
                ChallengeSeverity::Critical => {
                    acc.apply(fallback.escalation(Verdict::Fail));
                    acc.cap(CRITICAL_CHALLENGE_CAP);
                    acc.warn(format!(
                        "Challenger: critical flaws in {} claim(s). {}",
                        report.challenged_claims.len(),
                        report.summary.trim()
                    ));
                }
                ChallengeSeverity::Moderate => {
                    acc.raise(Verdict::PassWithWarnings);
                    acc.cap(MODERATE_CHALLENGE_CAP);
                    acc.warn(format!(
                        "Challenger: moderate flaws in {} claim(s). {}",
                        report.challenged_claims.len(),
                        report.summary.trim()
                    ));
                }
                ChallengeSeverity::Minor => {}
            }
        }

        let rounds = context.previous_verifications.unwrap_or(0);
        let depth_reached = rounds >= config.max_verification_depth;
        if depth_reached {
            acc.warn(format!(
                "Max verification depth reached ({}/{}); human review required",
                rounds, config.max_verification_depth
            ));
            if !acc.verdict.is_rejection() {
                acc.raise(Verdict::NeedsReview);
            }
        }

        let trigger_reason = match (&inspector, &challenger) {
            (Some(_), Some(_)) => "reviewed by inspector and challenger",
            (Some(_), None) => "reviewed by inspector",
            (None, Some(_)) => "reviewed by challenger",
            (None, None) if depth_reached => "max verification depth reached",
            (None, None) => "triggered without review output",
        };

        debug!(
            verdict = %acc.verdict,
            confidence = acc.confidence,
            requires_re_run = acc.requires_re_run,
            warnings = acc.warnings.len(),
            output_len = original_output.len(),
            "Verification synthesized"
        );

        VerificationResult {
            triggered: true,
            trigger_reason: trigger_reason.to_string(),
            inspector_output: inspector,
            challenger_output: challenger,
            final_verdict: acc.verdict,
            confidence: acc.confidence,
            requires_re_run: acc.requires_re_run,
            warnings: acc.warnings,
            evaluated_at: Utc::now(),
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}
