//! Runtime settings for driving review agents.

use std::time::Duration;

use tracing::warn;

/// Per-agent timeout override, in humantime format (`90s`, `2m`).
pub const ENV_AGENT_TIMEOUT: &str = "PI_VERIFICATION_AGENT_TIMEOUT";

/// Configuration for the verification orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Upper bound on each Inspector/Challenger call
    pub agent_timeout: Duration,

    /// Run the Challenger alongside the Inspector
    pub run_challenger: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(120),
            run_challenger: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults with the timeout taken from the environment when well-formed.
    pub fn from_env() -> Self {
        Self::from_timeout_value(std::env::var(ENV_AGENT_TIMEOUT).ok().as_deref())
    }

    fn from_timeout_value(value: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = value {
            match humantime::parse_duration(raw.trim()) {
                Ok(timeout) if !timeout.is_zero() => config.agent_timeout = timeout,
                _ => warn!(variable = ENV_AGENT_TIMEOUT, value = %raw, "Ignoring malformed timeout"),
            }
        }

        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn inspector_only(mut self) -> Self {
        self.run_challenger = false;
        self
    }
}
