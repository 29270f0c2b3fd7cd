//! Progress hooks for the agent loop

/// Receives progress notifications while a turn runs
///
/// All methods default to doing nothing.
pub trait AgentObserver: Send + Sync {
    /// A tool call is about to run
    fn on_tool_start(&self, _name: &str) {}

    /// A tool call finished
    fn on_tool_finish(&self, _name: &str, _is_error: bool) {}

    /// Tool results were handed back to the LLM
    fn on_analysing(&self) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AgentObserver for NoopObserver {}
