//! Telemetry and diagnostics for applications embedding `chart-core`.
//!
//! Tracing setup stays explicit and opt-in: consumers either call
//! `init_default_tracing` or wire their own `tracing` subscriber.
//!
//! Non-fatal configuration problems found during a recompute are collected
//! as [`Diagnostic`] values so the host can surface them next to the chart,
//! and each one is also logged at `warn` level when recorded.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable read for the filter directives, ahead of `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "CHART_CORE_LOG";

/// Directives used when neither [`LOG_ENV_VAR`] nor `RUST_LOG` is set:
/// diagnostics from this crate, errors from everything else.
pub const DEFAULT_LOG_DIRECTIVES: &str = "error,chart_core=warn";

/// Installs a compact `fmt` subscriber for `chart_core` events.
///
/// Only available with the `telemetry` feature; returns `false` without it,
/// or when the host already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

/// A configuration problem local to one axis or series.
///
/// None of these abort the recompute; the rest of the chart is laid out
/// normally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A log-scaled y axis whose value range has a non-positive bound.
    InvalidLogRange { axis: usize, min: f64, max: f64 },
    /// A series asked to share the axis of a series that does not define one.
    /// The series is placed on axis 0.
    UnresolvedAxisLink { series: String, target: String },
    /// The date ticker found no granularity that fits the pixel budget.
    EmptyDateAxis { low: f64, high: f64, pixels: f64 },
}

impl Diagnostic {
    fn emit(&self) {
        match self {
            Self::InvalidLogRange { axis, min, max } => warn!(
                axis,
                min,
                max,
                "axis can't be displayed in log scale for its value range"
            ),
            Self::UnresolvedAxisLink { series, target } => warn!(
                series = %series,
                target = %target,
                "series wants to share a y-axis with a series that does not define its own axis"
            ),
            Self::EmptyDateAxis { low, high, pixels } => warn!(
                low,
                high,
                pixels,
                "no date granularity fits the axis; emitting no ticks"
            ),
        }
    }
}

/// Collector for the diagnostics raised during one recompute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Logs `diagnostic` and keeps it for the host.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
