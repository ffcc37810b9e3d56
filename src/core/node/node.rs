use crate::core::agent::Agent;
use crate::core::error::FlowResult;
use crate::core::execution::flow::Flow;
use crate::core::ports::{Port, PortRegistry, Ports};
use crate::core::types::{NodeId, PortId, PortKind};
use crate::core::values::Value;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Outcome a node reports for its last control invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Success,
    Failure,
    /// Not finished; expects to be invoked or ticked again
    Running,
    #[default]
    Resting,
}

/// Behavior of a node.
///
/// Logic types hold their port handles as fields and keep mutable state in
/// cells: handlers run with `&self` because a node may be re-entered while one
/// of its own handlers is on the stack (e.g. a loop body reading the loop index).
pub trait NodeLogic: 'static {
    /// Declare every port of the node. Called on each port gathering, so it
    /// must declare the same set given the same configuration.
    fn register_ports(&self, ports: &mut Ports<'_, Self>)
    where
        Self: Sized;

    /// Per-tick callback, only invoked for updatable nodes
    fn update(&self, _flow: &mut Flow<'_>) -> FlowResult {
        Ok(())
    }

    /// Whether the graph should call `update` once per tick
    fn is_updatable(&self) -> bool {
        false
    }
}

type GatherFn = Box<dyn Fn(&mut PortRegistry)>;

/// A node in a graph: a port registry composed with its logic object
pub struct Node {
    id: NodeId,
    name: String,
    type_name: String,
    registry: PortRegistry,
    logic: Rc<dyn NodeLogic>,
    any: Rc<dyn Any>,
    gather: GatherFn,
    status: Cell<Status>,
    input_values: HashMap<PortId, Value>,
}

impl Node {
    /// Create a node around `logic`. Ports are not gathered yet.
    pub fn new<L: NodeLogic>(id: NodeId, name: Option<String>, logic: L) -> Self {
        let type_name = short_type_name::<L>().to_string();
        let name = name.unwrap_or_else(|| split_camel_case(&type_name));
        let logic = Rc::new(logic);
        let gather: GatherFn = {
            let logic = Rc::clone(&logic);
            Box::new(move |registry: &mut PortRegistry| {
                let mut ports = Ports::new(registry, &logic);
                logic.register_ports(&mut ports);
            })
        };
        let dynamic: Rc<dyn NodeLogic> = logic.clone();
        let any: Rc<dyn Any> = logic;

        Self {
            id,
            name,
            type_name,
            registry: PortRegistry::new(id),
            logic: dynamic,
            any,
            gather,
            status: Cell::new(Status::default()),
            input_values: HashMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }

    pub fn ports(&self) -> &PortRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut PortRegistry {
        &mut self.registry
    }

    pub fn get_input_port(&self, id: &str) -> Option<&Port> {
        self.registry.input(id)
    }

    pub fn get_output_port(&self, id: &str) -> Option<&Port> {
        self.registry.output(id)
    }

    /// Downcast the node's logic to its concrete type
    pub fn logic<L: NodeLogic>(&self) -> Option<&L> {
        self.any.downcast_ref::<L>()
    }

    pub(crate) fn behavior(&self) -> &dyn NodeLogic {
        self.logic.as_ref()
    }

    pub fn is_updatable(&self) -> bool {
        self.logic.is_updatable()
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    pub fn set_status(&self, status: Status) {
        self.status.set(status);
    }

    /// Mark the node as failed, logging `message` if given. Never raises.
    pub fn fail(&self, message: Option<&str>) {
        self.status.set(Status::Failure);
        if let Some(message) = message {
            error!("Flow execution error: '{}' - '{}'", self.name, message);
        }
    }

    /// Persisted per-port values applied on every port gathering
    pub fn input_values(&self) -> &HashMap<PortId, Value> {
        &self.input_values
    }

    pub(crate) fn set_input_values(&mut self, values: HashMap<PortId, Value>) {
        self.input_values = values;
    }

    pub(crate) fn record_input_value(&mut self, id: &str, value: Value) {
        self.input_values.insert(id.to_string(), value);
    }

    /// Rebuild the port set from the logic and re-apply persisted input values.
    ///
    /// Clears every port (and therefore every binding) first; the caller is
    /// responsible for revalidating and rebinding connections afterwards.
    pub(crate) fn gather_ports(&mut self) {
        self.registry.clear();
        (self.gather)(&mut self.registry);
        self.apply_input_values();
    }

    fn apply_input_values(&mut self) {
        for (id, value) in &self.input_values {
            let applied = match self.registry.input_mut(id) {
                Some(port) if port.kind() == PortKind::ValueIn => port.set_default(value.clone()),
                _ => false,
            };
            if !applied {
                debug!(
                    "Node '{}': stored value for '{}' does not match any value input",
                    self.name, id
                );
            }
        }
    }

    /// Fill the leading value input with an instance supplied by the agent.
    ///
    /// Only nodes exposing control ports qualify, and only while that input is
    /// unbound and still at its type's zero value.
    pub(crate) fn assign_agent_instance(&mut self, agent: &dyn Agent) -> bool {
        if !self.registry.has_control_ports() {
            return false;
        }
        let Some(port) = self
            .registry
            .inputs_mut()
            .find(|port| port.kind() == PortKind::ValueIn)
        else {
            return false;
        };
        if port.is_bound() || !port.is_default_value() {
            return false;
        }
        let Some(value_type) = port.value_type().cloned() else {
            return false;
        };
        match agent.provide(&value_type) {
            Some(value) => {
                let assigned = port.set_default(value);
                if assigned {
                    debug!(
                        "Node '{}': '{}' assigned from agent '{}'",
                        self.name,
                        port.id(),
                        agent.name()
                    );
                }
                assigned
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("ports", &self.registry.len())
            .field("status", &self.status.get())
            .finish()
    }
}

/// Last path segment of a type name without generic arguments
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// "LogText" -> "Log Text"
fn split_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if let Some(p) = prev {
            if c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}
