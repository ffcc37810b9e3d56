use super::handles::{ControlIn, ControlOut, ValueIn, ValueOut};
use super::port::{control_handler, value_getter, ControlHandler, Port, ValueGetter};
use crate::core::error::FlowResult;
use crate::core::execution::flow::Flow;
use crate::core::node::NodeLogic;
use crate::core::types::{NodeId, PortId, PortKind};
use crate::core::values::{PortValue, Value, ValueType};
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

/// Ports of one direction, keyed by ID, in declaration order
#[derive(Default)]
struct PortTable {
    ports: Vec<Port>,
    index: HashMap<PortId, usize>,
}

impl PortTable {
    /// Insert a port, replacing any port with the same ID in place. Returns true on replace.
    fn insert(&mut self, port: Port) -> bool {
        match self.index.get(port.id()) {
            Some(&slot) => {
                self.ports[slot] = port;
                true
            }
            None => {
                self.index.insert(port.id().to_string(), self.ports.len());
                self.ports.push(port);
                false
            }
        }
    }

    fn get(&self, id: &str) -> Option<&Port> {
        self.index.get(id).map(|&slot| &self.ports[slot])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Port> {
        match self.index.get(id) {
            Some(&slot) => self.ports.get_mut(slot),
            None => None,
        }
    }

    fn clear(&mut self) {
        self.ports.clear();
        self.index.clear();
    }
}

/// Port set of a single node.
///
/// Inputs (control-in, value-in) and outputs (control-out, value-out) each form
/// their own ID space. Registering an ID that already exists in its space
/// overwrites the previous port, so re-running port gathering is idempotent.
pub struct PortRegistry {
    owner: NodeId,
    inputs: PortTable,
    outputs: PortTable,
}

impl PortRegistry {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            owner,
            inputs: PortTable::default(),
            outputs: PortTable::default(),
        }
    }

    /// Get the node owning these ports
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Look up a port by ID and kind
    pub fn lookup(&self, id: &str, kind: PortKind) -> Option<&Port> {
        let table = if kind.is_input() { &self.inputs } else { &self.outputs };
        table.get(id).filter(|port| port.kind() == kind)
    }

    /// Look up an input port (control-in or value-in)
    pub fn input(&self, id: &str) -> Option<&Port> {
        self.inputs.get(id)
    }

    /// Look up an output port (control-out or value-out)
    pub fn output(&self, id: &str) -> Option<&Port> {
        self.outputs.get(id)
    }

    pub(crate) fn input_mut(&mut self, id: &str) -> Option<&mut Port> {
        self.inputs.get_mut(id)
    }

    pub(crate) fn output_mut(&mut self, id: &str) -> Option<&mut Port> {
        self.outputs.get_mut(id)
    }

    /// Input ports in declaration order
    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.inputs.ports.iter()
    }

    /// Output ports in declaration order
    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.outputs.ports.iter()
    }

    pub(crate) fn inputs_mut(&mut self) -> impl Iterator<Item = &mut Port> {
        self.inputs.ports.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.inputs.ports.len() + self.outputs.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_control_ports(&self) -> bool {
        self.inputs()
            .chain(self.outputs())
            .any(|port| port.kind().is_control())
    }

    pub(crate) fn clear(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }

    /// Drop every runtime binding while keeping the ports
    pub(crate) fn unbind_all(&mut self) {
        for port in self.inputs.ports.iter_mut().chain(self.outputs.ports.iter_mut()) {
            port.unbind();
        }
    }

    fn insert(&mut self, port: Port) {
        let kind = port.kind();
        let table = if kind.is_input() {
            &mut self.inputs
        } else {
            &mut self.outputs
        };
        let id = port.id().to_string();
        if table.insert(port) {
            debug!("Node {}: {} '{}' re-registered", self.owner, kind, id);
        }
    }

    pub fn register_control_in(&mut self, port: &ControlIn, handler: ControlHandler) {
        self.insert(Port::control_in(self.owner, port.id(), port.name(), handler));
    }

    pub fn register_control_out(&mut self, port: &ControlOut) {
        self.insert(Port::control_out(self.owner, port.id(), port.name()));
    }

    /// Declare a value input; `None` as default means the type's zero value
    pub fn register_value_in(
        &mut self,
        id: &str,
        name: &str,
        value_type: ValueType,
        default: Option<Value>,
    ) {
        self.insert(Port::value_in(self.owner, id, name, value_type, default));
    }

    pub fn register_value_out(
        &mut self,
        id: &str,
        name: &str,
        value_type: ValueType,
        getter: ValueGetter,
    ) {
        self.insert(Port::value_out(self.owner, id, name, value_type, getter));
    }
}

/// Typed registration front handed to [`NodeLogic::register_ports`].
///
/// Handlers and getters are written against the node's own logic type and get
/// the current [`Flow`] to call outputs and read inputs.
pub struct Ports<'a, L> {
    registry: &'a mut PortRegistry,
    logic: &'a Rc<L>,
}

impl<'a, L: NodeLogic> Ports<'a, L> {
    pub(crate) fn new(registry: &'a mut PortRegistry, logic: &'a Rc<L>) -> Self {
        Self { registry, logic }
    }

    /// Declare a control input handled by `handler`
    pub fn control_in<F>(&mut self, port: impl Into<ControlIn>, handler: F) -> ControlIn
    where
        F: Fn(&L, &mut Flow<'_>) -> FlowResult + 'static,
    {
        let port = port.into();
        let logic = Rc::clone(self.logic);
        let handler = control_handler(move |flow| handler(logic.as_ref(), flow));
        self.registry.register_control_in(&port, handler);
        port
    }

    /// Declare a control output
    pub fn control_out(&mut self, port: impl Into<ControlOut>) -> ControlOut {
        let port = port.into();
        self.registry.register_control_out(&port);
        port
    }

    /// Declare a value input falling back to `default` while unconnected
    pub fn value_in<T: PortValue>(&mut self, port: impl Into<ValueIn<T>>, default: T) -> ValueIn<T> {
        self.value_in_as(port, T::value_type(), default)
    }

    /// Declare a value input whose default is the zero value of `T`'s type
    pub fn value_in_zeroed<T: PortValue>(&mut self, port: impl Into<ValueIn<T>>) -> ValueIn<T> {
        let port = port.into();
        self.registry
            .register_value_in(port.id(), port.name(), T::value_type(), None);
        port
    }

    /// Declare a value input with an explicit type tag, e.g. a specific object type
    pub fn value_in_as<T: PortValue>(
        &mut self,
        port: impl Into<ValueIn<T>>,
        value_type: ValueType,
        default: T,
    ) -> ValueIn<T> {
        let port = port.into();
        self.registry.register_value_in(
            port.id(),
            port.name(),
            value_type,
            Some(default.into_value()),
        );
        port
    }

    /// Declare a value output computed by `getter` on every read
    pub fn value_out<T, F>(&mut self, port: impl Into<ValueOut<T>>, getter: F) -> ValueOut<T>
    where
        T: PortValue,
        F: Fn(&L, &mut Flow<'_>) -> FlowResult<T> + 'static,
    {
        self.value_out_as(port, T::value_type(), getter)
    }

    /// Declare a value output with an explicit type tag, e.g. a specific object type
    pub fn value_out_as<T, F>(
        &mut self,
        port: impl Into<ValueOut<T>>,
        value_type: ValueType,
        getter: F,
    ) -> ValueOut<T>
    where
        T: PortValue,
        F: Fn(&L, &mut Flow<'_>) -> FlowResult<T> + 'static,
    {
        let port = port.into();
        let logic = Rc::clone(self.logic);
        let getter = value_getter(move |flow| getter(logic.as_ref(), flow).map(T::into_value));
        self.registry
            .register_value_out(port.id(), port.name(), value_type, getter);
        port
    }

    /// Access the untyped registry, e.g. for ports whose types are only known at runtime
    pub fn registry(&mut self) -> &mut PortRegistry {
        &mut *self.registry
    }
}
