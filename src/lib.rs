pub mod core;
pub mod nodes;

// Re-export commonly used types
pub use crate::core::error::{FlowError, FlowResult};
pub use crate::core::execution::{CyclePolicy, Flow, GraphConfig, GraphState};
pub use crate::core::graph::Graph;
pub use crate::core::node::{Node, NodeDescriptor, NodeLogic, NodeRegistry, Status};
pub use crate::core::ports::{ControlIn, ControlOut, Ports, ValueIn, ValueOut};
pub use crate::core::types::{ConnectionId, NodeId, PortKind};
pub use crate::core::values::{ObjectRef, PortValue, Value, ValueType};
