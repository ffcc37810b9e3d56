use serde::{Deserialize, Serialize};
use std::fmt;

/// Port identifier, unique within its node and direction
pub type PortId = String;

/// Stable node identifier within a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Create a node ID from its raw value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Create an output port handle on this node
    pub fn output(&self, port: impl AsRef<str>) -> OutputRef {
        OutputRef {
            node: *self,
            port: port.as_ref().to_string(),
        }
    }

    /// Create an input port handle on this node
    pub fn input(&self, port: impl AsRef<str>) -> InputRef {
        InputRef {
            node: *self,
            port: port.as_ref().to_string(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a connection within a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub(crate) u64);

impl ConnectionId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// The four port kinds a node can expose.
///
/// Control ports carry an imperative call, value ports carry a value that is
/// computed when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// Entry point invoked by an upstream control-out
    ControlIn,
    /// Exit point that invokes the bound downstream control-in
    ControlOut,
    /// Pull endpoint that reads a bound value-out or falls back to its default
    ValueIn,
    /// Getter-backed endpoint evaluated on every read
    ValueOut,
}

impl PortKind {
    /// Check if this port kind can be connected to another port kind
    pub fn can_connect_to(&self, other: &PortKind) -> bool {
        matches!(
            (self, other),
            (PortKind::ControlOut, PortKind::ControlIn) | (PortKind::ValueOut, PortKind::ValueIn)
        )
    }

    pub fn is_input(&self) -> bool {
        matches!(self, PortKind::ControlIn | PortKind::ValueIn)
    }

    pub fn is_control(&self) -> bool {
        matches!(self, PortKind::ControlIn | PortKind::ControlOut)
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PortKind::ControlIn => "control-in",
            PortKind::ControlOut => "control-out",
            PortKind::ValueIn => "value-in",
            PortKind::ValueOut => "value-out",
        };
        f.write_str(label)
    }
}

/// Handle for an output port on a specific node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    pub(crate) node: NodeId,
    pub(crate) port: PortId,
}

impl OutputRef {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// Handle for an input port on a specific node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRef {
    pub(crate) node: NodeId,
    pub(crate) port: PortId,
}

impl InputRef {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_kind_compatibility() {
        assert!(PortKind::ControlOut.can_connect_to(&PortKind::ControlIn));
        assert!(PortKind::ValueOut.can_connect_to(&PortKind::ValueIn));
        assert!(!PortKind::ControlOut.can_connect_to(&PortKind::ValueIn));
        assert!(!PortKind::ValueOut.can_connect_to(&PortKind::ControlIn));
        assert!(!PortKind::ControlIn.can_connect_to(&PortKind::ControlOut));
    }

    #[test]
    fn test_port_refs() {
        let node = NodeId::new(3);
        let out = node.output("Out");
        let input = node.input("In");
        assert_eq!(out.node(), node);
        assert_eq!(out.port(), "Out");
        assert_eq!(input.to_string(), "#3.In");
    }
}
