use std::sync::Arc;

use crate::analysis::{AnalyzeOptions, ChartRenderer, PlottersRenderer};
use crate::core::Config;

/// Server state - shared references handed to every request handler
///
/// The analyzer holds no cross-request mutable state: the configuration is
/// immutable and the chart renderer is a stateless drawing backend behind
/// an `Arc`. Cloning the state is cheap, and concurrent requests cannot
/// interfere with each other.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | configuration (immutable) |
/// | renderer | Arc<dyn ChartRenderer> | chart rendering backend |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Chart renderer (swappable in tests)
    pub renderer: Arc<dyn ChartRenderer>,
}

impl ServerState {
    /// Build the state with the production renderer
    pub fn initialize(config: &Config) -> Self {
        Self {
            config: config.clone(),
            renderer: Arc::new(PlottersRenderer::default()),
        }
    }

    /// Build the state with a custom renderer (used by tests)
    pub fn with_renderer(config: &Config, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            config: config.clone(),
            renderer,
        }
    }

    /// Per-call analysis options derived from the configuration
    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            default_commission: self.config.default_commission,
        }
    }
}
