//! Environment-driven config resolution and the process-wide config cache.

use std::collections::HashMap;
use std::num::IntErrorKind;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::{VerificationConfig, MAX_DEPTH_CEILING};

/// Selects a preset: `disabled` (or `0`), `minimal`, `strict`; anything else is auto.
pub const ENV_MODE: &str = "PI_VERIFICATION_WORKFLOW_MODE";

/// Float override for `min_confidence_to_skip_verification`, clamped to [0, 1].
pub const ENV_MIN_CONFIDENCE: &str = "PI_VERIFICATION_MIN_CONFIDENCE";

/// Integer override for `max_verification_depth`, clamped to [1, 5].
pub const ENV_MAX_DEPTH: &str = "PI_VERIFICATION_MAX_DEPTH";

/// Workflow mode keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    Disabled,
    Minimal,
    Strict,
    Auto,
}

impl VerificationMode {
    /// Parse a mode keyword. Unknown or empty values mean `Auto`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("disabled") | Some("0") => VerificationMode::Disabled,
            Some("minimal") => VerificationMode::Minimal,
            Some("strict") => VerificationMode::Strict,
            _ => VerificationMode::Auto,
        }
    }
}

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Resolves a [`VerificationConfig`] from a variable lookup.
///
/// The lookup defaults to the process environment; tests and embedders can
/// supply their own so resolution stays a pure function of its inputs.
#[derive(Clone)]
pub struct ConfigResolver {
    lookup: Arc<Lookup>,
}

impl ConfigResolver {
    /// Resolver over the process environment.
    pub fn from_env() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// Resolver over an arbitrary lookup function.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    /// Resolver over a fixed set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::with_lookup(move |key| vars.get(key).cloned())
    }

    /// Resolve the config. Never fails: malformed overrides are discarded.
    pub fn resolve(&self) -> VerificationConfig {
        let mode = VerificationMode::parse((self.lookup)(ENV_MODE).as_deref());
        debug!(?mode, "Resolving verification config");

        match mode {
            VerificationMode::Disabled => VerificationConfig::disabled(),
            VerificationMode::Minimal => VerificationConfig::minimal(),
            VerificationMode::Strict => VerificationConfig::strict(),
            VerificationMode::Auto => {
                let mut config = VerificationConfig::default();

                if let Some(threshold) = self.min_confidence_override() {
                    config.min_confidence_to_skip_verification = threshold;
                }
                if let Some(depth) = self.max_depth_override() {
                    config.max_verification_depth = depth;
                }

                config
            }
        }
    }

    fn min_confidence_override(&self) -> Option<f64> {
        let raw = (self.lookup)(ENV_MIN_CONFIDENCE)?;
        match raw.trim().parse::<f64>() {
            Ok(value) if !value.is_nan() => Some(value.clamp(0.0, 1.0)),
            _ => {
                warn!(variable = ENV_MIN_CONFIDENCE, value = %raw, "Ignoring malformed override");
                None
            }
        }
    }

    fn max_depth_override(&self) -> Option<u32> {
        let raw = (self.lookup)(ENV_MAX_DEPTH)?;
        match raw.trim().parse::<i64>() {
            Ok(value) => Some(value.clamp(1, i64::from(MAX_DEPTH_CEILING)) as u32),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(MAX_DEPTH_CEILING),
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => Some(1),
            Err(_) => {
                warn!(variable = ENV_MAX_DEPTH, value = %raw, "Ignoring malformed override");
                None
            }
        }
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Lazily resolved, cached config with an explicit reset.
///
/// Readers share one `Arc`; `reset` swaps the slot under a write lock so
/// concurrent readers see either the old config or a fresh resolution.
/// The cache is never invalidated automatically: changes to the environment
/// are only picked up after `reset`.
pub struct ConfigProvider {
    resolver: ConfigResolver,
    cached: RwLock<Option<Arc<VerificationConfig>>>,
}

impl ConfigProvider {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self {
            resolver,
            cached: RwLock::new(None),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ConfigResolver::from_env())
    }

    /// Get the cached config, resolving it on first use.
    pub fn get(&self) -> Arc<VerificationConfig> {
        if let Some(config) = self.cached.read().as_ref() {
            return Arc::clone(config);
        }

        let mut slot = self.cached.write();
        // Another thread may have resolved while we waited for the write lock
        if let Some(config) = slot.as_ref() {
            return Arc::clone(config);
        }

        let config = Arc::new(self.resolver.resolve());
        *slot = Some(Arc::clone(&config));
        config
    }

    /// Drop the cached config; the next `get` resolves again.
    pub fn reset(&self) {
        *self.cached.write() = None;
    }
}

lazy_static! {
    static ref GLOBAL_PROVIDER: ConfigProvider = ConfigProvider::from_env();
}

/// Resolve the process-wide config from the environment, cached after first use.
pub fn resolve_verification_config() -> Arc<VerificationConfig> {
    GLOBAL_PROVIDER.get()
}

/// Clear the process-wide config cache.
pub fn reset_verification_config() {
    GLOBAL_PROVIDER.reset();
}
