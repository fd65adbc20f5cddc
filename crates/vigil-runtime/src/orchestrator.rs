//! Runtime orchestrator for one verification round.
//!
//! The orchestrator implements the full round:
//! - Trigger evaluation (deterministic, `vigil-core`)
//! - Prompt construction for both reviewers
//! - Parallel fan-out to Inspector and Challenger via tokio::join!
//! - Reply parsing and deterministic synthesis
//!
//! A reviewer that fails, times out, or replies outside the grammar contributes
//! no output. The failure is recorded as a warning and the verdict is raised
//! to at least `needs-review`.

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument};

use vigil_core::{
    build_challenger_prompt, build_inspector_prompt, ChallengerOutput, InspectorOutput,
    Synthesizer, TriggerEvaluator, Verdict, VerificationConfig, VerificationContext,
    VerificationResult,
};

use crate::agents::{AgentError, ReviewAgent, ReviewRole};
use crate::config::RuntimeConfig;
use crate::parser::{parse_challenger_output, parse_inspector_output};
use crate::RuntimeError;

/// Runs verification rounds against a review agent.
pub struct VerificationOrchestrator {
    agent: Arc<dyn ReviewAgent>,
    config: Arc<VerificationConfig>,
    runtime: RuntimeConfig,
    evaluator: TriggerEvaluator,
    synthesizer: Synthesizer,
}

impl VerificationOrchestrator {
    pub fn new(
        agent: Arc<dyn ReviewAgent>,
        config: Arc<VerificationConfig>,
        runtime: RuntimeConfig,
    ) -> Self {
        Self {
            agent,
            config,
            runtime,
            evaluator: TriggerEvaluator::new(),
            synthesizer: Synthesizer::new(),
        }
    }

    /// Replace the trigger evaluator, e.g. to plug in extra detectors.
    pub fn with_evaluator(mut self, evaluator: TriggerEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Verify one report.
    ///
    /// # Execution Flow
    /// 1. Evaluate triggers; return a pass-through result if none fire
    /// 2. Build Inspector and Challenger prompts
    /// 3. Fan-out: run both reviewers concurrently, each under the timeout
    /// 4. Parse replies and synthesize the final result
    pub async fn verify(
        &self,
        output: &str,
        confidence: f64,
        context: &VerificationContext,
    ) -> VerificationResult {
        let span = info_span!(
            "verification_round",
            task = %context.task,
            mode = %context.trigger_mode,
            round = context.previous_verifications.unwrap_or(0)
        );

        async move {
            let decision = self.evaluator.evaluate(output, confidence, context, &self.config);
            if !decision.trigger {
                return VerificationResult::not_triggered(decision.reason, confidence);
            }
            info!(reason = %decision.reason, "Verification triggered");

            let run_challenger = self.runtime.run_challenger
                && confidence >= self.config.challenger_config.min_confidence_to_challenge;

            let inspector_prompt = build_inspector_prompt(output, context, &self.config);
            let challenger_prompt = build_challenger_prompt(output, context, &self.config);

            let (inspector, challenger) = tokio::join!(
                self.run_inspector(&inspector_prompt),
                async {
                    if run_challenger {
                        Some(self.run_challenger(&challenger_prompt).await)
                    } else {
                        None
                    }
                },
            );

            let mut failures = Vec::new();
            let inspector = inspector
                .map_err(|e| failures.push(format!("Inspector unavailable: {}", e)))
                .ok();
            let challenger = match challenger {
                Some(Ok(reply)) => Some(reply),
                Some(Err(e)) => {
                    failures.push(format!("Challenger unavailable: {}", e));
                    None
                }
                None => None,
            };

            let mut result = self.synthesizer.synthesize(
                output,
                confidence,
                inspector,
                challenger,
                context,
                &self.config,
            );
            result.trigger_reason = decision.reason;

            if !failures.is_empty() {
                for failure in &failures {
                    warn!(%failure, "Reviewer contributed no output");
                }
                result.final_verdict = result.final_verdict.escalate(Verdict::NeedsReview);
                result.warnings.extend(failures);
            }

            info!(verdict = %result.final_verdict, confidence = result.confidence, "Verification complete");
            result
        }
        .instrument(span)
        .await
    }

    async fn call(&self, role: ReviewRole, prompt: &str) -> Result<String, RuntimeError> {
        let limit = self.runtime.agent_timeout;
        match timeout(limit, self.agent.review(role, prompt)).await {
            Ok(reply) => Ok(reply?),
            Err(_) => Err(AgentError::Timeout(limit).into()),
        }
    }

    async fn run_inspector(&self, prompt: &str) -> Result<InspectorOutput, RuntimeError> {
        let reply = self.call(ReviewRole::Inspector, prompt).await?;
        parse_inspector_output(&reply).map_err(|source| RuntimeError::Parse {
            role: ReviewRole::Inspector,
            source,
        })
    }

    async fn run_challenger(&self, prompt: &str) -> Result<ChallengerOutput, RuntimeError> {
        let reply = self.call(ReviewRole::Challenger, prompt).await?;
        parse_challenger_output(&reply).map_err(|source| RuntimeError::Parse {
            role: ReviewRole::Challenger,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use vigil_core::{
        DetectionResult, Detector, DetectorRegistry, InspectionPattern, Level, TriggerMode,
    };

    const CLEAN_INSPECTION: &str =
        "INSPECTION_REPORT:\n- none\nSUSPICION_LEVEL: low\nSUMMARY: clean\nRECOMMENDATION: accept";
    const MINOR_CHALLENGE: &str = "OVERALL_SEVERITY: minor\nSUMMARY: nothing serious";
    const CRITICAL_CHALLENGE: &str = "\
CHALLENGED_CLAIM: the migration is reversible
FLAW: no down migration exists
EVIDENCE_GAP: rollback never exercised
ALTERNATIVE: data loss on rollback
BOUNDARY_FAILURE: none
SEVERITY: critical

OVERALL_SEVERITY: critical
SUMMARY: rollback path is untested";

    /// Replies with fixed text per role and counts calls.
    struct ScriptedAgent {
        inspector: &'static str,
        challenger: &'static str,
        calls: AtomicUsize,
    }

    impl ScriptedAgent {
        fn new(inspector: &'static str, challenger: &'static str) -> Self {
            Self {
                inspector,
                challenger,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReviewAgent for ScriptedAgent {
        async fn review(&self, role: ReviewRole, _prompt: &str) -> Result<String, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match role {
                ReviewRole::Inspector => self.inspector.to_string(),
                ReviewRole::Challenger => self.challenger.to_string(),
            })
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl ReviewAgent for FailingAgent {
        async fn review(&self, _role: ReviewRole, _prompt: &str) -> Result<String, AgentError> {
            Err(AgentError::CallFailed("model unavailable".to_string()))
        }
    }

    struct SlowAgent;

    #[async_trait]
    impl ReviewAgent for SlowAgent {
        async fn review(&self, _role: ReviewRole, _prompt: &str) -> Result<String, AgentError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(CLEAN_INSPECTION.to_string())
        }
    }

    fn orchestrator(agent: Arc<dyn ReviewAgent>) -> VerificationOrchestrator {
        VerificationOrchestrator::new(
            agent,
            Arc::new(VerificationConfig::default()),
            RuntimeConfig::default().with_timeout(Duration::from_secs(5)),
        )
    }

    fn high_stakes() -> VerificationContext {
        VerificationContext::new("production migration", TriggerMode::PostSubagent)
    }

    #[tokio::test]
    async fn test_not_triggered_skips_agents() {
        let agent = Arc::new(ScriptedAgent::new(CLEAN_INSPECTION, MINOR_CHALLENGE));
        let context = VerificationContext::new("refactor helper", TriggerMode::PostSubagent);

        let result = orchestrator(agent.clone())
            .verify("CLAIM: done", 0.95, &context)
            .await;

        assert!(!result.triggered);
        assert_eq!(result.final_verdict, Verdict::Pass);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clean_reviews_pass() {
        let agent = Arc::new(ScriptedAgent::new(CLEAN_INSPECTION, MINOR_CHALLENGE));

        let result = orchestrator(agent.clone())
            .verify("CLAIM: done", 0.8, &high_stakes())
            .await;

        assert!(result.triggered);
        assert!(result.trigger_reason.starts_with("high-stakes task"));
        assert_eq!(result.final_verdict, Verdict::Pass);
        assert_eq!(
            result.inspector_output.as_ref().map(|i| i.suspicion_level),
            Some(Level::Low)
        );
        assert!(result.challenger_output.is_some());
        assert_eq!(agent.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_critical_challenge_fails() {
        let agent = Arc::new(ScriptedAgent::new(CLEAN_INSPECTION, CRITICAL_CHALLENGE));

        let result = orchestrator(agent).verify("CLAIM: done", 0.8, &high_stakes()).await;

        assert_eq!(result.final_verdict, Verdict::Fail);
        assert_eq!(result.confidence, 0.3);
    }

    #[tokio::test]
    async fn test_low_confidence_skips_challenger() {
        let agent = Arc::new(ScriptedAgent::new(CLEAN_INSPECTION, CRITICAL_CHALLENGE));

        let result = orchestrator(agent.clone())
            .verify("CLAIM: done", 0.3, &high_stakes())
            .await;

        assert!(result.challenger_output.is_none());
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_agent_failure_needs_review() {
        let result = orchestrator(Arc::new(FailingAgent))
            .verify("CLAIM: done", 0.8, &high_stakes())
            .await;

        assert!(result.triggered);
        assert_eq!(result.final_verdict, Verdict::NeedsReview);
        assert!(result.inspector_output.is_none());
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_needs_review() {
        let agent = Arc::new(ScriptedAgent::new("looks fine to me", MINOR_CHALLENGE));

        let result = orchestrator(agent).verify("CLAIM: done", 0.8, &high_stakes()).await;

        assert_eq!(result.final_verdict, Verdict::NeedsReview);
        assert!(result.inspector_output.is_none());
        assert!(result.challenger_output.is_some());
        assert!(result.warnings.iter().any(|w| w.contains("SUSPICION_LEVEL")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_needs_review() {
        let result = orchestrator(Arc::new(SlowAgent))
            .verify("CLAIM: done", 0.8, &high_stakes())
            .await;

        assert_eq!(result.final_verdict, Verdict::NeedsReview);
        assert!(result.warnings.iter().any(|w| w.contains("Timeout")));
    }

    #[tokio::test]
    async fn test_inspector_only_never_calls_challenger() {
        let agent = Arc::new(ScriptedAgent::new(CLEAN_INSPECTION, CRITICAL_CHALLENGE));
        let orchestrator = VerificationOrchestrator::new(
            agent.clone(),
            Arc::new(VerificationConfig::default()),
            RuntimeConfig::default().inspector_only(),
        );

        let result = orchestrator.verify("CLAIM: done", 0.8, &high_stakes()).await;

        assert!(result.challenger_output.is_none());
        assert_eq!(result.final_verdict, Verdict::Pass);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }

    struct StaleLogDetector;

    impl Detector for StaleLogDetector {
        fn id(&self) -> InspectionPattern {
            InspectionPattern::IncompleteReasoning
        }

        fn run(&self, text: &str) -> DetectionResult {
            if text.contains("yesterday's log") {
                DetectionResult::detected("evidence predates the change")
            } else {
                DetectionResult::clear()
            }
        }
    }

    #[tokio::test]
    async fn test_custom_evaluator_triggers_round() {
        let agent = Arc::new(ScriptedAgent::new(CLEAN_INSPECTION, MINOR_CHALLENGE));
        let mut detectors = DetectorRegistry::empty();
        detectors.register(Box::new(StaleLogDetector));

        let orchestrator = orchestrator(agent.clone())
            .with_evaluator(TriggerEvaluator::with_detectors(detectors));
        let context = VerificationContext::new("refactor helper", TriggerMode::Explicit);

        let result = orchestrator
            .verify("CLAIM: fixed
EVIDENCE: yesterday's log", 0.8, &context)
            .await;

        assert!(result.triggered);
        assert_eq!(
            result.trigger_reason,
            "incomplete-reasoning: evidence predates the change"
        );
        assert_eq!(agent.calls.load(Ordering::SeqCst), 2);
    }
}
