use std::fmt;

/// Lifecycle state of a graph.
///
/// `Starting` is only observable from inside `Graph::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphState {
    #[default]
    Stopped,
    Starting,
    Running,
}

impl GraphState {
    pub fn is_running(&self) -> bool {
        matches!(self, GraphState::Running)
    }
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GraphState::Stopped => "stopped",
            GraphState::Starting => "starting",
            GraphState::Running => "running",
        };
        f.write_str(label)
    }
}
