use crate::core::types::{NodeId, PortId, PortKind};
use crate::core::values::ValueType;
use thiserror::Error;

/// Errors raised by graph maintenance and by node execution.
///
/// A node's *logical* failure is not an error: it is reported through
/// [`Status::Failure`](crate::core::node::Status). Anything returned as a
/// `FlowError` from a handler or getter aborts the current invocation and
/// bubbles up through every enclosing `call`, `read`, `invoke` and `tick`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("Node {0} not found")]
    UnknownNode(NodeId),

    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("Port '{port}' ({kind}) not found on node '{node}'")]
    UnknownPort {
        node: String,
        port: PortId,
        kind: PortKind,
    },

    #[error("No {direction} port '{port}' on node '{node}'. Valid {direction} ports: {valid:?}")]
    MissingPort {
        node: String,
        port: PortId,
        direction: &'static str,
        valid: Vec<String>,
    },

    #[error("Cannot connect {from_kind} '{from}' to {to_kind} '{to}'")]
    IncompatiblePorts {
        from: String,
        from_kind: PortKind,
        to: String,
        to_kind: PortKind,
    },

    #[error("Type mismatch on port '{port}': expected {expected}, found {found}")]
    TypeMismatch {
        port: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Input port '{port}' on node '{node}' is already connected. Multiple drivers not allowed.")]
    InputAlreadyConnected { node: String, port: PortId },

    #[error("Control output '{port}' on node '{node}' is already connected")]
    OutputAlreadyConnected { node: String, port: PortId },

    #[error("Connecting '{from}' to '{to}' would close a control cycle")]
    ControlCycle { from: String, to: String },

    #[error("Graph '{0}' is not running")]
    NotRunning(String),

    #[error("Call depth limit of {limit} exceeded entering node '{node}'")]
    CallDepthExceeded { node: String, limit: usize },

    #[error("Flow execution error: '{node}' - '{message}'")]
    Fault { node: String, message: String },
}

impl FlowError {
    /// Create a runtime fault attributed to a node
    pub fn fault(node: impl Into<String>, message: impl Into<String>) -> Self {
        FlowError::Fault {
            node: node.into(),
            message: message.into(),
        }
    }
}

pub type FlowResult<T = ()> = Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FlowError::fault("Divide", "division by zero");
        assert_eq!(err.to_string(), "Flow execution error: 'Divide' - 'division by zero'");

        let err = FlowError::UnknownPort {
            node: "Branch".to_string(),
            port: "Maybe".to_string(),
            kind: PortKind::ControlOut,
        };
        assert!(err.to_string().contains("control-out"));
    }
}
