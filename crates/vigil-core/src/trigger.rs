//! Trigger evaluation: decide whether a report needs verification at all.
//!
//! Decisions are evaluated in a fixed order and the first applicable one wins:
//!
//! | Step | Condition | Decision |
//! |------|-----------|----------|
//! | 1 | config disabled | skip |
//! | 2 | confidence >= skip threshold and task not high-stakes | skip |
//! | 3 | `low-confidence` enabled and confidence < 0.7 | fire |
//! | 4 | `high-stakes` enabled and task is high-stakes | fire |
//! | 5 | an enabled pattern detector fires | fire |
//! | 6 | call is `post-subagent`/`post-team` and that mode is enabled | fire |
//! | 7 | otherwise | skip |

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::config::VerificationConfig;
use crate::detectors::DetectorRegistry;
use crate::types::{TriggerDecision, TriggerMode, VerificationContext};

/// Confidence below which `low-confidence` mode fires.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.7;

lazy_static! {
    static ref HIGH_STAKES_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("destructive", Regex::new(r"(?i:\b(?:delete|deletion|remove|drop|truncate|destroy|wipe|purge|rm\s+-rf|force[- ]push|overwrite)\b)|削除|破壊|消去").unwrap()),
        ("production", Regex::new(r"(?i:\b(?:production|prod|deploy(?:ment)?|release|rollout|migration|migrate)\b)|本番|デプロイ|リリース|移行|マイグレーション").unwrap()),
        ("security", Regex::new(r"(?i:\b(?:security|auth|authentication|authorization|credentials?|secrets?|passwords?|tokens?|encrypt(?:ion)?|permissions?|vulnerabilit(?:y|ies)|exploit)\b)|セキュリティ|認証|認可|権限|脆弱性|暗号").unwrap()),
        ("financial", Regex::new(r"(?i:\b(?:payments?|billing|financial|invoices?|refunds?)\b)|決済|請求|支払").unwrap()),
    ];
}

/// Whether a task description touches destructive, security, production or
/// financial concerns.
pub fn is_high_stakes_task(task: &str) -> bool {
    HIGH_STAKES_PATTERNS.iter().any(|(_, re)| re.is_match(task))
}

/// Name of the first high-stakes category a task matches.
pub fn high_stakes_category(task: &str) -> Option<&'static str> {
    HIGH_STAKES_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(task))
        .map(|(name, _)| *name)
}

/// Evaluates trigger decisions against a detector registry.
pub struct TriggerEvaluator {
    detectors: DetectorRegistry,
}

impl TriggerEvaluator {
    /// Evaluator with the built-in detectors.
    pub fn new() -> Self {
        Self::with_detectors(DetectorRegistry::builtin())
    }

    pub fn with_detectors(detectors: DetectorRegistry) -> Self {
        Self { detectors }
    }

    /// Decide whether `output` needs verification.
    pub fn evaluate(
        &self,
        output: &str,
        confidence: f64,
        context: &VerificationContext,
        config: &VerificationConfig,
    ) -> TriggerDecision {
        let decision = self.decide(output, confidence, context, config);
        debug!(
            trigger = decision.trigger,
            reason = %decision.reason,
            confidence,
            mode = %context.trigger_mode,
            "Trigger evaluated"
        );
        decision
    }

    fn decide(
        &self,
        output: &str,
        confidence: f64,
        context: &VerificationContext,
        config: &VerificationConfig,
    ) -> TriggerDecision {
        if !config.enabled {
            return TriggerDecision::skip("verification disabled");
        }

        let high_stakes = high_stakes_category(&context.task);

        if confidence >= config.min_confidence_to_skip_verification && high_stakes.is_none() {
            return TriggerDecision::skip(format!(
                "confidence {:.2} meets skip threshold {:.2} for a non-high-stakes task",
                confidence, config.min_confidence_to_skip_verification
            ));
        }

        if config.is_mode_enabled(TriggerMode::LowConfidence)
            && confidence < LOW_CONFIDENCE_THRESHOLD
        {
            return TriggerDecision::fire(format!(
                "low confidence ({:.2} < {:.2})",
                confidence, LOW_CONFIDENCE_THRESHOLD
            ));
        }

        if let Some(category) = high_stakes {
            if config.is_mode_enabled(TriggerMode::HighStakes) {
                return TriggerDecision::fire(format!("high-stakes task ({})", category));
            }
        }

        if config.inspector_config.auto_trigger_on_collapse_signals {
            if let Some((pattern, detection)) = self
                .detectors
                .first_detection(output, &config.inspector_config.required_patterns)
            {
                return TriggerDecision::fire(format!("{}: {}", pattern, detection.reason));
            }
        }

        let mode = context.trigger_mode;
        if matches!(mode, TriggerMode::PostSubagent | TriggerMode::PostTeam)
            && config.is_mode_enabled(mode)
        {
            return TriggerDecision::fire(format!("{} verification", mode));
        }

        TriggerDecision::skip("no trigger conditions met")
    }
}

impl Default for TriggerEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InspectionPattern;

    fn context(task: &str, mode: TriggerMode) -> VerificationContext {
        VerificationContext::new(task, mode)
    }

    fn evaluate(
        output: &str,
        confidence: f64,
        ctx: &VerificationContext,
        config: &VerificationConfig,
    ) -> TriggerDecision {
        TriggerEvaluator::new().evaluate(output, confidence, ctx, config)
    }

    #[test]
    fn test_high_stakes_classification() {
        assert!(is_high_stakes_task("production migration"));
        assert!(is_high_stakes_task("Delete stale user records"));
        assert!(is_high_stakes_task("rotate API tokens"));
        assert!(is_high_stakes_task("本番環境へのデプロイ"));
        assert!(!is_high_stakes_task("refactor helper"));
        assert!(!is_high_stakes_task("add unit tests for the parser"));
        // Word boundaries: "products" is not "prod"
        assert!(!is_high_stakes_task("list products on the landing page"));
    }

    #[test]
    fn test_disabled_never_triggers() {
        let decision = evaluate(
            "CONFIDENCE: 0.1",
            0.1,
            &context("drop production database", TriggerMode::Explicit),
            &VerificationConfig::disabled(),
        );
        assert!(!decision.trigger);
        assert_eq!(decision.reason, "verification disabled");
    }

    #[test]
    fn test_confident_low_risk_skips() {
        let decision = evaluate(
            "CLAIM: helper renamed\nRESULT: helper renamed",
            0.95,
            &context("refactor helper", TriggerMode::PostSubagent),
            &VerificationConfig::default(),
        );
        assert!(!decision.trigger);
        assert!(decision.reason.contains("skip threshold"));
    }

    #[test]
    fn test_confident_high_stakes_still_triggers() {
        let decision = evaluate(
            "",
            0.99,
            &context("production migration", TriggerMode::PostSubagent),
            &VerificationConfig::default(),
        );
        assert!(decision.trigger);
        assert!(decision.reason.starts_with("high-stakes task"));
    }

    #[test]
    fn test_low_confidence_triggers() {
        let decision = evaluate(
            "",
            0.5,
            &context("refactor helper", TriggerMode::Explicit),
            &VerificationConfig::default(),
        );
        assert!(decision.trigger);
        assert!(decision.reason.starts_with("low confidence"));
    }

    #[test]
    fn test_low_confidence_ignored_when_mode_disabled() {
        let decision = evaluate(
            "",
            0.5,
            &context("refactor helper", TriggerMode::Explicit),
            &VerificationConfig::minimal(),
        );
        assert!(!decision.trigger);
        assert_eq!(decision.reason, "no trigger conditions met");
    }

    #[test]
    fn test_detector_triggers() {
        let decision = evaluate(
            "CLAIM: X is not supported\nRESULT: X works correctly",
            0.8,
            &context("refactor helper", TriggerMode::Explicit),
            &VerificationConfig::default(),
        );
        assert!(decision.trigger);
        assert!(decision.reason.starts_with("claim-result-mismatch:"));
    }

    #[test]
    fn test_detector_disabled_by_required_patterns() {
        let mut config = VerificationConfig::default();
        config
            .inspector_config
            .required_patterns
            .remove(&InspectionPattern::ClaimResultMismatch);

        let decision = evaluate(
            "CLAIM: X is not supported\nRESULT: X works correctly",
            0.8,
            &context("refactor helper", TriggerMode::Explicit),
            &config,
        );
        assert!(!decision.trigger);
    }

    #[test]
    fn test_collapse_signals_switch() {
        let mut config = VerificationConfig::default();
        config.inspector_config.auto_trigger_on_collapse_signals = false;

        let decision = evaluate(
            "CLAIM: X is not supported\nRESULT: X works correctly",
            0.8,
            &context("refactor helper", TriggerMode::Explicit),
            &config,
        );
        assert!(!decision.trigger);
    }

    #[test]
    fn test_post_subagent_mode_triggers() {
        let decision = evaluate(
            "",
            0.8,
            &context("refactor helper", TriggerMode::PostSubagent),
            &VerificationConfig::default(),
        );
        assert!(decision.trigger);
        assert_eq!(decision.reason, "post-subagent verification");
    }

    #[test]
    fn test_post_team_needs_mode_enabled() {
        let ctx = context("refactor helper", TriggerMode::PostTeam);

        let decision = evaluate("", 0.8, &ctx, &VerificationConfig::default());
        assert!(!decision.trigger);

        let decision = evaluate("", 0.8, &ctx, &VerificationConfig::strict());
        assert!(decision.trigger);
        assert_eq!(decision.reason, "post-team verification");
    }
}
