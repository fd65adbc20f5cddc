//! # vigil-runtime
//!
//! Optional async driver for Vigil verification rounds.
//!
//! `vigil-core` decides, builds prompts and synthesizes, but never runs a
//! reviewer. This crate closes the loop: it sends the Inspector and
//! Challenger prompts to a caller-supplied [`ReviewAgent`], bounds each call
//! with a timeout, parses the replies and hands them to the synthesizer.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vigil_core::{resolve_verification_config, TriggerMode, VerificationContext};
//! use vigil_runtime::{RuntimeConfig, VerificationOrchestrator};
//!
//! let orchestrator = VerificationOrchestrator::new(
//!     Arc::new(MyAgent::new()),
//!     resolve_verification_config(),
//!     RuntimeConfig::from_env(),
//! );
//!
//! let context = VerificationContext::new("deploy to production", TriggerMode::PostSubagent);
//! let result = orchestrator.verify(report, 0.9, &context).await;
//! ```

use thiserror::Error;

pub mod agents;
pub mod config;
pub mod orchestrator;
pub mod parser;

pub use agents::{AgentError, ReviewAgent, ReviewRole};
pub use config::{RuntimeConfig, ENV_AGENT_TIMEOUT};
pub use orchestrator::VerificationOrchestrator;
pub use parser::{parse_challenger_output, parse_inspector_output, ParseError};

/// Errors from one reviewer call.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Unparseable {role} reply: {source}")]
    Parse {
        role: ReviewRole,
        #[source]
        source: ParseError,
    },
}
