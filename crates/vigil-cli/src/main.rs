//! Vigil command line interface
//!
//! Exposes the verification engine to shell users and scripts.
//!
//! # Usage
//!
//! ```bash
//! # Print the resolved config (env presets and overrides applied)
//! vigil config
//!
//! # Should this report be verified?
//! vigil trigger --file report.txt --task "deploy to production"
//!
//! # Build the Inspector prompt from stdin
//! cat report.txt | vigil prompt inspector --task "fix login bug"
//!
//! # Combine reviewer replies into a verdict
//! vigil synthesize --file report.txt --inspector inspector.yaml --challenger challenger.json
//!
//! # Run every detector
//! vigil detect --file report.txt
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use vigil_core::detectors::sections;
use vigil_core::{
    build_challenger_prompt, build_inspector_prompt, resolve_verification_config,
    ChallengerOutput, DetectorRegistry, InspectionPattern, InspectorOutput, Synthesizer,
    TriggerEvaluator, TriggerMode, VerificationConfig, VerificationContext,
};

#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Vigil - verification workflow engine for agent reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (YAML, or JSON with a .json extension); overrides env resolution
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, global = true, default_value = "json", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PromptRole {
    Inspector,
    Challenger,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the active verification config
    Config,

    /// Decide whether a report needs verification
    Trigger(ReportArgs),

    /// Print a reviewer prompt for a report
    Prompt {
        /// Which reviewer the prompt is for
        #[arg(value_enum)]
        role: PromptRole,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Combine Inspector/Challenger documents into a final result
    Synthesize {
        /// Inspector output document (YAML or JSON)
        #[arg(long)]
        inspector: Option<PathBuf>,

        /// Challenger output document (YAML or JSON)
        #[arg(long)]
        challenger: Option<PathBuf>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Run every built-in detector and print each result
    Detect {
        /// Report file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Report input plus the verification context around it.
#[derive(Args, Debug)]
struct ReportArgs {
    /// Report file (reads stdin if not provided)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Task description the report answers
    #[arg(short, long, default_value = "")]
    task: String,

    /// Why verification is being considered
    #[arg(short, long, default_value = "post-subagent", value_parser = parse_trigger_mode)]
    mode: TriggerMode,

    /// Reported confidence; defaults to the report's CONFIDENCE line, else 0
    #[arg(long)]
    confidence: Option<f64>,

    /// Verification rounds already run for this report
    #[arg(long)]
    previous: Option<u32>,

    #[arg(long)]
    agent: Option<String>,

    #[arg(long)]
    team: Option<String>,
}

/// One detector's verdict, as printed by `vigil detect`.
#[derive(Serialize, Debug)]
struct DetectorReport {
    pattern: InspectionPattern,
    detected: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    reason: String,
}

fn parse_trigger_mode(value: &str) -> Result<TriggerMode, String> {
    TriggerMode::ALL
        .into_iter()
        .find(|mode| mode.as_str() == value)
        .ok_or_else(|| {
            let known: Vec<_> = TriggerMode::ALL.iter().map(|m| m.as_str()).collect();
            format!("unknown trigger mode '{}' (expected one of: {})", value, known.join(", "))
        })
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read report from stdin")?;
            Ok(buffer)
        }
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn parse_document<T: DeserializeOwned>(text: &str, json: bool) -> Result<T> {
    if json {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_yaml::from_str(text)?)
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_document(&text, is_json_path(path))
        .with_context(|| format!("Invalid document in {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<Arc<VerificationConfig>> {
    match path {
        Some(path) => {
            let config = VerificationConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            Ok(Arc::new(config))
        }
        None => Ok(resolve_verification_config()),
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

impl ReportArgs {
    fn context(&self) -> VerificationContext {
        let mut context = VerificationContext::new(self.task.clone(), self.mode);
        if let Some(agent) = &self.agent {
            context = context.with_agent(agent.clone());
        }
        if let Some(team) = &self.team {
            context = context.with_team(team.clone());
        }
        if let Some(rounds) = self.previous {
            context = context.with_previous_verifications(rounds);
        }
        context
    }

    fn confidence(&self, report: &str) -> f64 {
        self.confidence
            .or_else(|| sections::confidence(report))
            .unwrap_or(0.0)
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = load_config(cli.config.as_deref())?;
    debug!(enabled = config.enabled, "Config loaded");

    match cli.command {
        Commands::Config => render(config.as_ref(), cli.format),

        Commands::Trigger(args) => {
            let report = read_input(args.file.as_deref())?;
            let decision = TriggerEvaluator::new().evaluate(
                &report,
                args.confidence(&report),
                &args.context(),
                &config,
            );
            render(&decision, cli.format)
        }

        Commands::Prompt { role, report: args } => {
            let report = read_input(args.file.as_deref())?;
            let context = args.context();
            Ok(match role {
                PromptRole::Inspector => build_inspector_prompt(&report, &context, &config),
                PromptRole::Challenger => build_challenger_prompt(&report, &context, &config),
            })
        }

        Commands::Synthesize {
            inspector,
            challenger,
            report: args,
        } => {
            let inspector = inspector
                .as_deref()
                .map(load_document::<InspectorOutput>)
                .transpose()?;
            let challenger = challenger
                .as_deref()
                .map(load_document::<ChallengerOutput>)
                .transpose()?;

            // Both documents may be files; the report itself then comes from stdin.
            let report = read_input(args.file.as_deref())?;
            let result = Synthesizer::new().synthesize(
                &report,
                args.confidence(&report),
                inspector,
                challenger,
                &args.context(),
                &config,
            );
            render(&result, cli.format)
        }

        Commands::Detect { file } => {
            let report = read_input(file.as_deref())?;
            let results: Vec<DetectorReport> = DetectorRegistry::builtin()
                .run_all(&report)
                .into_iter()
                .map(|(pattern, result)| DetectorReport {
                    pattern,
                    detected: result.detected,
                    reason: result.reason,
                })
                .collect();
            render(&results, cli.format)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let output = run(Cli::parse())?;
    println!("{}", output.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{Level, TriggerDecision};

    #[test]
    fn test_parse_trigger_mode() {
        assert_eq!(parse_trigger_mode("post-team"), Ok(TriggerMode::PostTeam));
        assert_eq!(parse_trigger_mode("high-stakes"), Ok(TriggerMode::HighStakes));

        let err = parse_trigger_mode("whenever").unwrap_err();
        assert!(err.contains("post-subagent"));
    }

    #[test]
    fn test_cli_parses_prompt_command() {
        let cli = Cli::try_parse_from([
            "vigil",
            "prompt",
            "challenger",
            "--task",
            "drop table",
            "--mode",
            "explicit",
            "--previous",
            "1",
            "-o",
            "yaml",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Yaml);
        match cli.command {
            Commands::Prompt { role, report } => {
                assert_eq!(role, PromptRole::Challenger);
                let context = report.context();
                assert_eq!(context.task, "drop table");
                assert_eq!(context.trigger_mode, TriggerMode::Explicit);
                assert_eq!(context.previous_verifications, Some(1));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["vigil", "trigger", "--mode", "sometimes"]).is_err());
    }

    #[test]
    fn test_confidence_falls_back_to_report() {
        let cli = Cli::try_parse_from(["vigil", "trigger"]).unwrap();
        let Commands::Trigger(args) = cli.command else {
            panic!("expected trigger");
        };

        assert_eq!(args.confidence("CLAIM: x\nCONFIDENCE: 0.82"), 0.82);
        assert_eq!(args.confidence("CLAIM: x"), 0.0);
    }

    #[test]
    fn test_explicit_confidence_wins() {
        let cli = Cli::try_parse_from(["vigil", "trigger", "--confidence", "0.4"]).unwrap();
        let Commands::Trigger(args) = cli.command else {
            panic!("expected trigger");
        };

        assert_eq!(args.confidence("CONFIDENCE: 0.99"), 0.4);
    }

    #[test]
    fn test_parse_inspector_document() {
        let yaml = "\
suspicion_level: medium
detected_patterns:
  - pattern: overconfidence
    location: CONFIDENCE
    severity: high
    description: 0.97 on one log line
summary: thin evidence
recommendation: add a reproduction
";
        let output: InspectorOutput = parse_document(yaml, false).unwrap();
        assert_eq!(output.suspicion_level, Level::Medium);
        assert_eq!(
            output.detected_patterns[0].pattern,
            InspectionPattern::Overconfidence
        );

        let json = r#"{"challenged_claims": [], "overall_severity": "minor", "summary": "", "suggested_revisions": []}"#;
        let output: ChallengerOutput = parse_document(json, true).unwrap();
        assert!(output.challenged_claims.is_empty());
    }

    #[test]
    fn test_render_formats() {
        let decision = TriggerDecision::fire("high-stakes task (security)");

        let json = render(&decision, OutputFormat::Json).unwrap();
        assert!(json.contains("\"trigger\": true"));

        let yaml = render(&decision, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("trigger: true"));
    }

    #[test]
    fn test_json_extension_detection() {
        assert!(is_json_path(Path::new("inspector.JSON")));
        assert!(!is_json_path(Path::new("inspector.yaml")));
        assert!(!is_json_path(Path::new("inspector")));
    }
}
