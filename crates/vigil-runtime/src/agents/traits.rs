//! Review agent trait and common types.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from review agents.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent call failed: {0}")]
    CallFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which reviewer a prompt is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRole {
    Inspector,
    Challenger,
}

impl fmt::Display for ReviewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewRole::Inspector => f.write_str("inspector"),
            ReviewRole::Challenger => f.write_str("challenger"),
        }
    }
}

/// An external agent that answers review prompts.
///
/// Implementations own model selection, transport and retries. The
/// orchestrator only supplies the prompt and bounds the call with a timeout.
///
/// # Isolation Contract
/// - The Inspector and Challenger calls for one report run concurrently
/// - Neither call sees the other's reply
#[async_trait]
pub trait ReviewAgent: Send + Sync {
    /// Answer `prompt` in the grammar the prompt mandates.
    async fn review(&self, role: ReviewRole, prompt: &str) -> Result<String, AgentError>;
}
