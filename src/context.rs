//! Per-attach plugin context.

use crate::config::{PluginConfig, TraceLimits};
use crate::engine::Engine;

/// State handed to command handlers.
///
/// Built when Metamod attaches the plugin and dropped on detach.
pub struct PluginContext<E> {
    engine: E,
    config: PluginConfig,
}

impl<E: Engine> PluginContext<E> {
    pub fn new(engine: E, config: PluginConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Trace bounds as currently set on the server.
    pub fn trace_limits(&self) -> TraceLimits {
        TraceLimits::resolve(&self.engine, self.config.trace)
    }
}
