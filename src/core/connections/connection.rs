use crate::core::types::{ConnectionId, InputRef, NodeId, OutputRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directed edge from one node's output port to another node's input port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    id: ConnectionId,
    source: OutputRef,
    target: InputRef,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, source: OutputRef, target: InputRef) -> Self {
        Self { id, source, target }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source(&self) -> &OutputRef {
        &self.source
    }

    pub fn target(&self) -> &InputRef {
        &self.target
    }

    pub fn source_node(&self) -> NodeId {
        self.source.node
    }

    pub fn source_port(&self) -> &str {
        &self.source.port
    }

    pub fn target_node(&self) -> NodeId {
        self.target.node
    }

    pub fn target_port(&self) -> &str {
        &self.target.port
    }

    /// Check if either end is on `node`
    pub fn touches(&self, node: NodeId) -> bool {
        self.source.node == node || self.target.node == node
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.id, self.source, self.target)
    }
}
