use super::connection::Connection;
use super::port_validator::PortValidator;
use crate::core::error::{FlowError, FlowResult};
use crate::core::node::NodeSet;
use crate::core::types::{InputRef, OutputRef, PortKind};

/// Centralized connection validation for connect-time checks and validation passes
pub struct ConnectionValidator;

impl ConnectionValidator {
    /// Validate a connection between two ports.
    ///
    /// Both nodes and ports must exist, the ports must belong to the same flow
    /// category (control-out to control-in, value-out to value-in) and a value
    /// target must accept the source's type. Returns the source port kind.
    pub(crate) fn validate_connection(
        nodes: &NodeSet,
        source: &OutputRef,
        target: &InputRef,
    ) -> FlowResult<PortKind> {
        let source_node = nodes
            .get(source.node())
            .ok_or(FlowError::UnknownNode(source.node()))?;
        let target_node = nodes
            .get(target.node())
            .ok_or(FlowError::UnknownNode(target.node()))?;

        let source_port = PortValidator::validate_source_port(source_node, source.port())?;
        let target_port = PortValidator::validate_target_port(target_node, target.port())?;

        if !source_port.kind().can_connect_to(&target_port.kind()) {
            return Err(FlowError::IncompatiblePorts {
                from: source.to_string(),
                from_kind: source_port.kind(),
                to: target.to_string(),
                to_kind: target_port.kind(),
            });
        }

        if let (Some(source_type), Some(target_type)) =
            (source_port.value_type(), target_port.value_type())
        {
            if !target_type.is_assignable_from(source_type) {
                return Err(FlowError::TypeMismatch {
                    port: target.to_string(),
                    expected: target_type.clone(),
                    found: source_type.clone(),
                });
            }
        }

        Ok(source_port.kind())
    }

    /// Check that an existing connection still resolves against the current port sets
    pub(crate) fn is_still_valid(nodes: &NodeSet, connection: &Connection) -> bool {
        Self::validate_connection(nodes, connection.source(), connection.target()).is_ok()
    }

    /// Check if a value input is already driven (prevents multiple drivers)
    pub(crate) fn check_input_port_collision(
        nodes: &NodeSet,
        connections: &[Connection],
        target: &InputRef,
    ) -> FlowResult<()> {
        if connections.iter().any(|c| c.target() == target) {
            return Err(FlowError::InputAlreadyConnected {
                node: Self::node_label(nodes, target.node()),
                port: target.port().to_string(),
            });
        }
        Ok(())
    }

    /// Check if a control output already has a target (one callback per control output)
    pub(crate) fn check_output_port_collision(
        nodes: &NodeSet,
        connections: &[Connection],
        source: &OutputRef,
    ) -> FlowResult<()> {
        if connections.iter().any(|c| c.source() == source) {
            return Err(FlowError::OutputAlreadyConnected {
                node: Self::node_label(nodes, source.node()),
                port: source.port().to_string(),
            });
        }
        Ok(())
    }

    fn node_label(nodes: &NodeSet, id: crate::core::types::NodeId) -> String {
        nodes
            .get(id)
            .map(|node| node.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }
}
