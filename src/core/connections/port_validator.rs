use crate::core::error::{FlowError, FlowResult};
use crate::core::node::Node;
use crate::core::ports::Port;
use crate::core::types::PortKind;

/// Port validation utilities for nodes
pub struct PortValidator;

impl PortValidator {
    /// Validate that a node has the specified output port
    pub fn validate_source_port<'n>(node: &'n Node, port: &str) -> FlowResult<&'n Port> {
        node.get_output_port(port).ok_or_else(|| FlowError::MissingPort {
            node: node.name().to_string(),
            port: port.to_string(),
            direction: "output",
            valid: node.ports().outputs().map(|p| p.id().to_string()).collect(),
        })
    }

    /// Validate that a node has the specified input port
    pub fn validate_target_port<'n>(node: &'n Node, port: &str) -> FlowResult<&'n Port> {
        node.get_input_port(port).ok_or_else(|| FlowError::MissingPort {
            node: node.name().to_string(),
            port: port.to_string(),
            direction: "input",
            valid: node.ports().inputs().map(|p| p.id().to_string()).collect(),
        })
    }

    /// Validate that a node has a port of exactly `kind` under `port`
    pub fn validate_port_kind<'n>(node: &'n Node, port: &str, kind: PortKind) -> FlowResult<&'n Port> {
        node.ports()
            .lookup(port, kind)
            .ok_or_else(|| FlowError::UnknownPort {
                node: node.name().to_string(),
                port: port.to_string(),
                kind,
            })
    }
}
