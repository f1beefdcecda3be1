//! Plugin configuration.
//!
//! Trace-distance bounds come from the `mmex_trace_*` cvars, falling back to
//! the defaults below.

use crate::engine::Engine;

/// Lower trace-distance bound cvar (exclusive)
pub const CVAR_TRACE_MIN: &str = "mmex_trace_min";
/// Upper trace-distance bound cvar (inclusive)
pub const CVAR_TRACE_MAX: &str = "mmex_trace_max";

/// Plugin configuration
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    /// Bounds used when the cvars are missing or unusable
    pub trace: TraceLimits,
}

/// Accepted range for the `traceline` distance: `min < distance <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceLimits {
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: 1000.0,
        }
    }
}

impl TraceLimits {
    /// Whether the pair describes a non-empty, non-negative range.
    pub fn is_usable(&self) -> bool {
        self.min_distance.is_finite()
            && self.max_distance.is_finite()
            && self.min_distance >= 0.0
            && self.max_distance > self.min_distance
    }

    /// Read the current bounds from the engine's cvars.
    ///
    /// A missing cvar keeps the fallback value for that side. If the
    /// resulting pair is unusable the whole fallback is returned.
    pub fn resolve<E: Engine>(engine: &E, fallback: TraceLimits) -> TraceLimits {
        let limits = TraceLimits {
            min_distance: engine
                .cvar_float(CVAR_TRACE_MIN)
                .unwrap_or(fallback.min_distance),
            max_distance: engine
                .cvar_float(CVAR_TRACE_MAX)
                .unwrap_or(fallback.max_distance),
        };

        if limits.is_usable() {
            limits
        } else {
            tracing::warn!(
                min = limits.min_distance,
                max = limits.max_distance,
                "ignoring unusable trace limits from cvars"
            );
            fallback
        }
    }
}
