pub mod config;
pub mod flow;
pub mod state;

// Re-export commonly used types
pub use config::{CyclePolicy, GraphConfig};
pub use flow::Flow;
pub use state::GraphState;
