//! Prompt templates for the Inspector and Challenger review agents.
//!
//! These are pure string builders. The engine never runs an agent; callers
//! feed the prompts to their own agent runner and hand the structured replies
//! back to the synthesizer.
//!
//! Each prompt is assembled from:
//! 1. a fixed role preamble,
//! 2. a checklist rendered from config,
//! 3. the task context and the report under review,
//! 4. a fixed output grammar the reply must follow.

use std::fmt::Write;

use crate::config::VerificationConfig;
use crate::types::VerificationContext;

/// Role preamble for the Inspector.
pub const INSPECTOR_ROLE_PROMPT: &str = r#"
You are the Inspector, a secondary reviewer of another agent's report.

Your job is to find suspicious patterns in the report below.
You do not redo the task.
You do not judge style.
You report only what the text itself supports, citing where you saw it.
"#;

/// Output grammar the Inspector must follow.
pub const INSPECTOR_OUTPUT_FORMAT: &str = r#"
## Output Format (follow exactly)
INSPECTION_REPORT:
- PATTERN: <pattern-name> | LOCATION: <where in the report> | SEVERITY: <low|medium|high> | DESCRIPTION: <what you observed>
(one line per detected pattern; write "- none" if nothing was detected)
SUSPICION_LEVEL: <low|medium|high>
SUMMARY: <one paragraph>
RECOMMENDATION: <accept, revise or reject, with the reason>
"#;

/// Role preamble for the Challenger.
pub const CHALLENGER_ROLE_PROMPT: &str = r#"
You are the Challenger, an adversarial reviewer of another agent's report.

Your job is to argue against the report's claims as strongly as the evidence allows.
Assume the report is wrong until its evidence forces you to concede.
Every challenge must name a concrete flaw, not a vague doubt.
"#;

/// Output grammar the Challenger must follow.
pub const CHALLENGER_OUTPUT_FORMAT: &str = r#"
## Output Format (follow exactly)
Repeat this block once per challenged claim, separated by blank lines:
CHALLENGED_CLAIM: <the claim, quoted>
FLAW: <what is wrong with it>
EVIDENCE_GAP: <what evidence is missing>
ALTERNATIVE: <a competing explanation>
BOUNDARY_FAILURE: <where the claim breaks down, or "none">
SEVERITY: <minor|moderate|critical>

Then finish with:
OVERALL_SEVERITY: <minor|moderate|critical>
SUMMARY: <one paragraph>
SUGGESTED_REVISIONS:
- <revision>
"#;

fn write_context(prompt: &mut String, output: &str, context: &VerificationContext) {
    let _ = writeln!(prompt, "\n## Task\n{}", context.task.trim());
    let _ = writeln!(prompt, "Trigger: {}", context.trigger_mode);
    if let Some(agent) = &context.agent_id {
        let _ = writeln!(prompt, "Agent: {}", agent);
    }
    if let Some(team) = &context.team_id {
        let _ = writeln!(prompt, "Team: {}", team);
    }
    if let Some(rounds) = context.previous_verifications.filter(|r| *r > 0) {
        let _ = writeln!(prompt, "Previous verification rounds: {}", rounds);
    }

    let _ = writeln!(
        prompt,
        "\n## Report Under Review\n<<<REPORT\n{}\nREPORT>>>",
        output.trim()
    );
}

/// Build the Inspector prompt for `output`.
pub fn build_inspector_prompt(
    output: &str,
    context: &VerificationContext,
    config: &VerificationConfig,
) -> String {
    let inspector = &config.inspector_config;
    let mut prompt = String::from(INSPECTOR_ROLE_PROMPT.trim_start());

    prompt.push_str("\n## Required Checks\n");
    for pattern in &inspector.required_patterns {
        let _ = writeln!(prompt, "- [ ] {}: {}", pattern, pattern.description());
    }

    let _ = writeln!(
        prompt,
        "\nReport SUSPICION_LEVEL at or above `{}` only when a detected pattern would \
         change whether the report can be trusted.",
        inspector.suspicion_threshold
    );

    write_context(&mut prompt, output, context);
    prompt.push_str(INSPECTOR_OUTPUT_FORMAT);
    prompt
}

/// Build the Challenger prompt for `output`.
pub fn build_challenger_prompt(
    output: &str,
    context: &VerificationContext,
    config: &VerificationConfig,
) -> String {
    let challenger = &config.challenger_config;
    let mut prompt = String::from(CHALLENGER_ROLE_PROMPT.trim_start());

    prompt.push_str("\n## Challenge Categories\n");
    for category in &challenger.enabled_categories {
        let _ = writeln!(prompt, "- {}: {}", category, category.description());
    }

    let flaws = challenger.required_flaws;
    let _ = writeln!(
        prompt,
        "\nYou must raise at least {} flaw{}. If you cannot find that many, say so in SUMMARY \
         instead of inventing weak ones.",
        flaws,
        if flaws == 1 { "" } else { "s" }
    );

    write_context(&mut prompt, output, context);
    prompt.push_str(CHALLENGER_OUTPUT_FORMAT);
    prompt
}
