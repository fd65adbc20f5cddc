//! Core value types for verification rounds.
//!
//! Every type here is request-scoped: built fresh for one verification call and
//! never mutated once handed back to the caller.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a verification round was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMode {
    /// After a single subagent finished its work.
    PostSubagent,
    /// After an agent team finished its work.
    PostTeam,
    /// The reported confidence is below the low-confidence floor.
    LowConfidence,
    /// A caller explicitly asked for verification.
    Explicit,
    /// The task touches destructive, security or production concerns.
    HighStakes,
}

impl TriggerMode {
    /// All trigger modes, in declaration order.
    pub const ALL: [TriggerMode; 5] = [
        TriggerMode::PostSubagent,
        TriggerMode::PostTeam,
        TriggerMode::LowConfidence,
        TriggerMode::Explicit,
        TriggerMode::HighStakes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::PostSubagent => "post-subagent",
            TriggerMode::PostTeam => "post-team",
            TriggerMode::LowConfidence => "low-confidence",
            TriggerMode::Explicit => "explicit",
            TriggerMode::HighStakes => "high-stakes",
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when a critical flaw is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackBehavior {
    /// Surface the flaw as a verdict and warnings; never block.
    #[default]
    Warn,
    /// Block the output and require a re-run.
    Block,
    /// Reject the output outright; the caller decides whether to retry.
    AutoReject,
}

/// Reasoning-failure classes the Challenger argues from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeCategory {
    EvidenceGap,
    LogicalFlaw,
    Assumption,
    Alternative,
    Boundary,
    CausalReversal,
}

impl ChallengeCategory {
    pub const ALL: [ChallengeCategory; 6] = [
        ChallengeCategory::EvidenceGap,
        ChallengeCategory::LogicalFlaw,
        ChallengeCategory::Assumption,
        ChallengeCategory::Alternative,
        ChallengeCategory::Boundary,
        ChallengeCategory::CausalReversal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeCategory::EvidenceGap => "evidence-gap",
            ChallengeCategory::LogicalFlaw => "logical-flaw",
            ChallengeCategory::Assumption => "assumption",
            ChallengeCategory::Alternative => "alternative",
            ChallengeCategory::Boundary => "boundary",
            ChallengeCategory::CausalReversal => "causal-reversal",
        }
    }

    /// One-line guidance for the Challenger prompt.
    pub fn description(&self) -> &'static str {
        match self {
            ChallengeCategory::EvidenceGap => {
                "Claims that go further than the cited evidence supports"
            }
            ChallengeCategory::LogicalFlaw => {
                "Steps that do not follow from the previous ones"
            }
            ChallengeCategory::Assumption => "Unstated premises the conclusion depends on",
            ChallengeCategory::Alternative => {
                "Competing explanations that fit the same evidence"
            }
            ChallengeCategory::Boundary => {
                "Inputs, scales or environments where the claim breaks down"
            }
            ChallengeCategory::CausalReversal => {
                "Cause and effect that may run in the opposite direction"
            }
        }
    }
}

impl fmt::Display for ChallengeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suspicious patterns the Inspector (and the local detectors) look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionPattern {
    ClaimResultMismatch,
    EvidenceConfidenceGap,
    MissingAlternatives,
    CausalReversal,
    ConfirmationBias,
    Overconfidence,
    IncompleteReasoning,
}

impl InspectionPattern {
    pub const ALL: [InspectionPattern; 7] = [
        InspectionPattern::ClaimResultMismatch,
        InspectionPattern::EvidenceConfidenceGap,
        InspectionPattern::MissingAlternatives,
        InspectionPattern::CausalReversal,
        InspectionPattern::ConfirmationBias,
        InspectionPattern::Overconfidence,
        InspectionPattern::IncompleteReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionPattern::ClaimResultMismatch => "claim-result-mismatch",
            InspectionPattern::EvidenceConfidenceGap => "evidence-confidence-gap",
            InspectionPattern::MissingAlternatives => "missing-alternatives",
            InspectionPattern::CausalReversal => "causal-reversal",
            InspectionPattern::ConfirmationBias => "confirmation-bias",
            InspectionPattern::Overconfidence => "overconfidence",
            InspectionPattern::IncompleteReasoning => "incomplete-reasoning",
        }
    }

    /// Parse the kebab-case name used in prompts and reports.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// One-line checklist entry for the Inspector prompt.
    pub fn description(&self) -> &'static str {
        match self {
            InspectionPattern::ClaimResultMismatch => {
                "CLAIM and RESULT disagree or talk about different things"
            }
            InspectionPattern::EvidenceConfidenceGap => {
                "Stated confidence is higher than the evidence justifies"
            }
            InspectionPattern::MissingAlternatives => {
                "A conclusion is drawn without considering other explanations"
            }
            InspectionPattern::CausalReversal => {
                "Correlation presented as causation, or cause and effect swapped"
            }
            InspectionPattern::ConfirmationBias => {
                "Only supporting evidence was gathered; nothing could have disproved the claim"
            }
            InspectionPattern::Overconfidence => {
                "Absolute language with vague or unverifiable evidence"
            }
            InspectionPattern::IncompleteReasoning => {
                "Reasoning skips steps or stops before reaching the conclusion"
            }
        }
    }
}

impl fmt::Display for InspectionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-level rating used for Inspector suspicion and pattern severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Level::Low),
            "medium" => Some(Level::Medium),
            "high" => Some(Level::High),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Challenger severity scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeSeverity {
    #[default]
    Minor,
    Moderate,
    Critical,
}

impl ChallengeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeSeverity::Minor => "minor",
            ChallengeSeverity::Moderate => "moderate",
            ChallengeSeverity::Critical => "critical",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "minor" => Some(ChallengeSeverity::Minor),
            "moderate" => Some(ChallengeSeverity::Moderate),
            "critical" => Some(ChallengeSeverity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for ChallengeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied context for one verification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationContext {
    /// Description of the task the agent performed
    pub task: String,

    /// Why this verification was requested
    pub trigger_mode: TriggerMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// Re-verification rounds already performed for this output.
    /// The engine keeps no history; the caller carries this counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_verifications: Option<u32>,
}

impl VerificationContext {
    pub fn new(task: impl Into<String>, trigger_mode: TriggerMode) -> Self {
        Self {
            task: task.into(),
            trigger_mode,
            agent_id: None,
            team_id: None,
            previous_verifications: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn with_previous_verifications(mut self, rounds: u32) -> Self {
        self.previous_verifications = Some(rounds);
        self
    }
}

/// One suspicious pattern reported by the Inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern: InspectionPattern,

    /// Where in the output the pattern was seen
    #[serde(default)]
    pub location: String,

    pub severity: Level,

    #[serde(default)]
    pub description: String,
}

/// Structured Inspector report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorOutput {
    pub suspicion_level: Level,

    #[serde(default)]
    pub detected_patterns: Vec<DetectedPattern>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub recommendation: String,
}

impl InspectorOutput {
    /// Whether any detected pattern was rated high severity.
    pub fn has_high_severity_pattern(&self) -> bool {
        self.detected_patterns
            .iter()
            .any(|p| p.severity == Level::High)
    }
}

/// A single claim the Challenger argued against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengedClaim {
    pub claim: String,

    pub flaw: String,

    #[serde(default)]
    pub evidence_gap: String,

    #[serde(default)]
    pub alternative: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_failure: Option<String>,

    pub severity: ChallengeSeverity,
}

/// Structured Challenger report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengerOutput {
    #[serde(default)]
    pub challenged_claims: Vec<ChallengedClaim>,

    pub overall_severity: ChallengeSeverity,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub suggested_revisions: Vec<String>,
}

/// Final disposition of a verification round, ordered by strictness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    #[default]
    Pass,
    PassWithWarnings,
    NeedsReview,
    Fail,
    Blocked,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::PassWithWarnings => "pass-with-warnings",
            Verdict::NeedsReview => "needs-review",
            Verdict::Fail => "fail",
            Verdict::Blocked => "blocked",
        }
    }

    /// Escalate to `other` if it is stricter. Never downgrades.
    pub fn escalate(self, other: Verdict) -> Verdict {
        self.max(other)
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Verdict::Fail | Verdict::Blocked)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether verification should fire, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDecision {
    pub trigger: bool,
    pub reason: String,
}

impl TriggerDecision {
    pub fn fire(reason: impl Into<String>) -> Self {
        Self {
            trigger: true,
            reason: reason.into(),
        }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            trigger: false,
            reason: reason.into(),
        }
    }
}

/// Final output of one verification round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub triggered: bool,

    pub trigger_reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_output: Option<InspectorOutput>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenger_output: Option<ChallengerOutput>,

    pub final_verdict: Verdict,

    /// Adjusted confidence in [0, 1]
    pub confidence: f64,

    pub requires_re_run: bool,

    #[serde(default)]
    pub warnings: Vec<String>,

    pub evaluated_at: DateTime<Utc>,
}

impl VerificationResult {
    /// Result for a round where verification did not fire.
    pub fn not_triggered(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            triggered: false,
            trigger_reason: reason.into(),
            inspector_output: None,
            challenger_output: None,
            final_verdict: Verdict::Pass,
            confidence: confidence.clamp(0.0, 1.0),
            requires_re_run: false,
            warnings: Vec::new(),
            evaluated_at: Utc::now(),
        }
    }
}
