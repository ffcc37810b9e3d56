use crate::core::connections::PortValidator;
use crate::core::error::{FlowError, FlowResult};
use crate::core::graph::Graph;
use crate::core::node::{Node, Status};
use crate::core::ports::port::PortSlot;
use crate::core::ports::{ControlIn, ControlOut, Port, ValueIn};
use crate::core::types::{NodeId, PortKind};
use crate::core::values::{PortValue, Value};
use log::trace;

/// Execution context handed to control handlers, value getters and `update`.
///
/// A `Flow` borrows the graph immutably and is bound to the node currently
/// executing, so port handles resolve against that node. Calling a control
/// output or reading a connected value input enters the bound node with a
/// fresh `Flow` one level deeper; nothing is queued and nothing is cached.
pub struct Flow<'g> {
    graph: &'g Graph,
    node: &'g Node,
    depth: usize,
}

impl<'g> Flow<'g> {
    /// Enter `node` from outside the graph (an invocation or a tick)
    pub(crate) fn root(graph: &'g Graph, node: NodeId) -> FlowResult<Self> {
        Self::enter_at(graph, node, 1)
    }

    fn enter_at(graph: &'g Graph, id: NodeId, depth: usize) -> FlowResult<Self> {
        let node = graph.node(id).ok_or(FlowError::UnknownNode(id))?;
        if let Some(limit) = graph.config().max_call_depth {
            if depth > limit {
                return Err(FlowError::CallDepthExceeded {
                    node: node.name().to_string(),
                    limit,
                });
            }
        }
        Ok(Self { graph, node, depth })
    }

    fn enter(&self, id: NodeId) -> FlowResult<Flow<'g>> {
        Self::enter_at(self.graph, id, self.depth + 1)
    }

    /// Invoke the control input bound to `port`; a no-op while unconnected
    pub fn call(&self, port: &ControlOut) -> FlowResult {
        self.call_port(port.id())
    }

    /// Invoke the control input bound to the control output `id`
    pub fn call_port(&self, id: &str) -> FlowResult {
        let port = self.lookup(id, PortKind::ControlOut)?;
        match port.slot() {
            PortSlot::ControlOut {
                binding: Some(binding),
            } => {
                trace!("{} '{}' -> {}", self.node.name(), id, binding.target);
                let mut next = self.enter(binding.target)?;
                (binding.handler)(&mut next)
            }
            _ => Ok(()),
        }
    }

    /// Run a control input of the current node directly
    pub(crate) fn run_control_in(&mut self, port: &ControlIn) -> FlowResult {
        let port = self.lookup(port.id(), PortKind::ControlIn)?;
        match port.control_handler() {
            Some(handler) => handler(self),
            None => Ok(()),
        }
    }

    /// Read a typed value input.
    ///
    /// A connected input evaluates the upstream getter on every call; an
    /// unconnected one returns its current default.
    pub fn read<T: PortValue>(&self, port: &ValueIn<T>) -> FlowResult<T> {
        let value = self.read_value(port.id())?;
        T::from_value(&value).ok_or_else(|| FlowError::TypeMismatch {
            port: format!("{}.{}", self.node.id(), port.id()),
            expected: T::value_type(),
            found: value.value_type(),
        })
    }

    /// Read the value input `id` as a dynamic value
    pub fn read_value(&self, id: &str) -> FlowResult<Value> {
        let port = self.lookup(id, PortKind::ValueIn)?;
        match port.slot() {
            PortSlot::ValueIn {
                binding: Some(binding),
                value_type,
                ..
            } => {
                trace!("{} '{}' <- {}", self.node.name(), id, binding.source);
                let mut upstream = self.enter(binding.source)?;
                let value = (binding.getter)(&mut upstream)?;
                let found = value.value_type();
                value_type
                    .coerce(value)
                    .ok_or_else(|| FlowError::TypeMismatch {
                        port: format!("{}.{}", self.node.id(), id),
                        expected: value_type.clone(),
                        found,
                    })
            }
            PortSlot::ValueIn { default, .. } => Ok(default.clone()),
            _ => Ok(Value::Null),
        }
    }

    /// Evaluate a value output of the current node
    pub(crate) fn evaluate(&mut self, id: &str) -> FlowResult<Value> {
        let port = self.lookup(id, PortKind::ValueOut)?;
        match port.value_getter() {
            Some(getter) => getter(self),
            None => Ok(Value::Null),
        }
    }

    fn lookup(&self, id: &str, kind: PortKind) -> FlowResult<&'g Port> {
        PortValidator::validate_port_kind(self.node, id, kind)
    }

    pub fn set_status(&self, status: Status) {
        self.node.set_status(status);
    }

    pub fn status(&self) -> Status {
        self.node.status()
    }

    /// Mark the current node as failed. Logged, never raised.
    pub fn fail(&self, message: Option<&str>) {
        self.node.fail(message);
    }

    /// Build a runtime fault attributed to the current node, to return with `?`
    pub fn fault(&self, message: impl Into<String>) -> FlowError {
        FlowError::fault(self.node.name(), message)
    }

    pub fn node(&self) -> &'g Node {
        self.node
    }

    pub fn node_id(&self) -> NodeId {
        self.node.id()
    }

    pub fn node_name(&self) -> &'g str {
        self.node.name()
    }

    /// Nesting level of the current node in this cascade, 1 for the entry node
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }
}
