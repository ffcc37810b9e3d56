use super::connection::Connection;
use crate::core::node::NodeSet;
use crate::core::ports::port::{ControlBinding, ValueBinding};
use crate::core::types::PortKind;
use log::debug;
use std::rc::Rc;

/// Installs runtime bindings for validated connections.
///
/// A control connection stores the target's handler on the source control-out;
/// a value connection stores the source's getter on the target value-in.
pub(crate) struct Binder;

impl Binder {
    /// Bind one connection. Returns false if either end no longer resolves.
    pub fn bind(nodes: &mut NodeSet, connection: &Connection) -> bool {
        let Some(source_port) = nodes
            .get(connection.source_node())
            .and_then(|node| node.get_output_port(connection.source_port()))
        else {
            return false;
        };

        match source_port.kind() {
            PortKind::ControlOut => {
                let Some(handler) = nodes
                    .get(connection.target_node())
                    .and_then(|node| node.get_input_port(connection.target_port()))
                    .and_then(|port| port.control_handler())
                    .map(Rc::clone)
                else {
                    return false;
                };
                let binding = ControlBinding {
                    target: connection.target_node(),
                    handler,
                };
                nodes
                    .get_mut(connection.source_node())
                    .and_then(|node| node.registry_mut().output_mut(connection.source_port()))
                    .map(|port| port.bind_control(binding))
                    .unwrap_or(false)
            }
            PortKind::ValueOut => {
                let Some(getter) = source_port.value_getter().map(Rc::clone) else {
                    return false;
                };
                let binding = ValueBinding {
                    source: connection.source_node(),
                    getter,
                };
                nodes
                    .get_mut(connection.target_node())
                    .and_then(|node| node.registry_mut().input_mut(connection.target_port()))
                    .map(|port| port.bind_value(binding))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Drop every binding in the graph and re-establish one per connection
    pub fn rebind(nodes: &mut NodeSet, connections: &[Connection]) {
        for node in nodes.iter_mut() {
            node.registry_mut().unbind_all();
        }
        for connection in connections {
            if !Self::bind(nodes, connection) {
                debug!("Connection {} could not be bound", connection);
            }
        }
    }
}
