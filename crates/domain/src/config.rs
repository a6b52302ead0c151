//! Service configuration loaded from environment variables.

use std::str::FromStr;

use common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How much pre-execution validation a guarded command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Read current state and run every guard rule before executing.
    #[default]
    Strict,

    /// Skip guard reads to save a round-trip. The write may then act on
    /// state the guard would have rejected; the store's own transition
    /// checks still apply.
    LatencyProne,
}

impl ExecutionMode {
    /// Returns true if state-guard reads are skipped.
    pub fn is_latency_prone(&self) -> bool {
        matches!(self, ExecutionMode::LatencyProne)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Strict => "strict",
            ExecutionMode::LatencyProne => "latency-prone",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown execution mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown execution mode: {0} (expected \"strict\" or \"latency-prone\")")]
pub struct UnknownExecutionMode(pub String);

impl FromStr for ExecutionMode {
    type Err = UnknownExecutionMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ExecutionMode::Strict),
            "latency-prone" | "latency_prone" => Ok(ExecutionMode::LatencyProne),
            other => Err(UnknownExecutionMode(other.to_string())),
        }
    }
}

/// Service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `ORDERS_EXECUTION_MODE` — `strict` or `latency-prone` (default: `strict`)
/// - `ORDERS_PRICE_TOLERANCE_CENTS` — accepted price drift in cents (default: `0`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceConfig {
    /// Default mode for guarded order item commands.
    pub execution_mode: ExecutionMode,
    /// Largest accepted difference between an item price and the product price.
    pub price_tolerance: Money,
}

impl ServiceConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let execution_mode = lookup("ORDERS_EXECUTION_MODE")
            .and_then(|mode| match mode.parse::<ExecutionMode>() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    tracing::warn!(%err, "ignoring ORDERS_EXECUTION_MODE");
                    None
                }
            })
            .unwrap_or_default();
        let price_tolerance = lookup("ORDERS_PRICE_TOLERANCE_CENTS")
            .and_then(|cents| cents.trim().parse::<i64>().ok())
            .filter(|cents| *cents >= 0)
            .map(Money::from_cents)
            .unwrap_or_default();

        Self {
            execution_mode,
            price_tolerance,
        }
    }

    /// Returns a copy with a different execution mode.
    pub fn with_execution_mode(mut self, execution_mode: ExecutionMode) -> Self {
        self.execution_mode = execution_mode;
        self
    }

    /// Returns a copy with a different price tolerance.
    pub fn with_price_tolerance(mut self, price_tolerance: Money) -> Self {
        self.price_tolerance = price_tolerance;
        self
    }
}
