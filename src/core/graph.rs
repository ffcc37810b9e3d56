use crate::core::agent::Agent;
use crate::core::connections::{Binder, Connection, ConnectionValidator, ControlOrder};
use crate::core::error::{FlowError, FlowResult};
use crate::core::execution::{CyclePolicy, Flow, GraphConfig, GraphState};
use crate::core::node::{Node, NodeDescriptor, NodeLogic, NodeRegistry, NodeSet, Status};
use crate::core::ports::{ControlIn, Port, ValueIn};
use crate::core::types::{ConnectionId, InputRef, NodeId, OutputRef, PortKind};
use crate::core::values::{PortValue, Value, ValueType};
use log::{debug, info};
use std::rc::Rc;

/// An ordered collection of nodes and the connections between their ports.
///
/// Editing the graph (adding nodes, connecting, re-gathering ports) needs
/// `&mut Graph`; every such operation finishes by validating connections and
/// re-deriving bindings. Running it (`tick`, `invoke`, reads) needs only
/// `&Graph`, so maintenance can never overlap an executing cascade.
pub struct Graph {
    name: String,
    config: GraphConfig,
    nodes: NodeSet,
    connections: Vec<Connection>,
    next_node_id: u64,
    next_connection_id: u64,
    state: GraphState,
    /// Set by the first `start`; later starts skip discovery
    has_initialized: bool,
    /// Nodes ticked each frame, in discovery order
    updatable_nodes: Vec<NodeId>,
    agent: Option<Rc<dyn Agent>>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, GraphConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: GraphConfig) -> Self {
        Self {
            name: name.into(),
            config,
            nodes: NodeSet::default(),
            connections: Vec::new(),
            next_node_id: 1,
            next_connection_id: 1,
            state: GraphState::default(),
            has_initialized: false,
            updatable_nodes: Vec::new(),
            agent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn has_initialized(&self) -> bool {
        self.has_initialized
    }

    // ---- nodes ----

    /// Add a node running `logic`, named after its type
    pub fn add_node<L: NodeLogic>(&mut self, logic: L) -> NodeId {
        let id = self.allocate_node_id();
        self.insert_node(Node::new(id, None, logic))
    }

    /// Add a node running `logic` under a display name
    pub fn add_named_node<L: NodeLogic>(&mut self, name: impl Into<String>, logic: L) -> NodeId {
        let id = self.allocate_node_id();
        self.insert_node(Node::new(id, Some(name.into()), logic))
    }

    /// Construct a node from a descriptor through `registry` and add it
    pub fn add_from_descriptor(
        &mut self,
        registry: &NodeRegistry,
        descriptor: &NodeDescriptor,
    ) -> FlowResult<NodeId> {
        let id = NodeId::new(self.next_node_id);
        let node = registry.create(descriptor, id)?;
        self.next_node_id += 1;
        Ok(self.insert_node(node))
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn insert_node(&mut self, mut node: Node) -> NodeId {
        let id = node.id();
        node.gather_ports();
        debug!(
            "Graph '{}': added node '{}' ({}) as {}",
            self.name,
            node.name(),
            node.type_name(),
            id
        );
        if self.has_initialized && node.is_updatable() {
            debug!(
                "Graph '{}': '{}' added after first start and will not be ticked",
                self.name,
                node.name()
            );
        }
        self.nodes.push(node);
        self.validate();
        id
    }

    /// Remove a node; connections touching it are pruned
    pub fn remove_node(&mut self, id: NodeId) -> FlowResult<Node> {
        let node = self.nodes.remove(id).ok_or(FlowError::UnknownNode(id))?;
        self.updatable_nodes.retain(|&n| n != id);
        let pruned = self.connections.iter().filter(|c| c.touches(id)).count();
        debug!(
            "Graph '{}': removed node '{}', pruning {} connection(s)",
            self.name,
            node.name(),
            pruned
        );
        self.validate();
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        self.nodes.as_slice()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> FlowResult<()> {
        let node = self.nodes.get_mut(id).ok_or(FlowError::UnknownNode(id))?;
        node.set_name(name);
        Ok(())
    }

    /// Nullable lookup of an input port (control-in or value-in)
    pub fn get_input_port(&self, node: NodeId, id: &str) -> Option<&Port> {
        self.nodes.get(node).and_then(|n| n.get_input_port(id))
    }

    /// Nullable lookup of an output port (control-out or value-out)
    pub fn get_output_port(&self, node: NodeId, id: &str) -> Option<&Port> {
        self.nodes.get(node).and_then(|n| n.get_output_port(id))
    }

    /// Re-run port gathering for one node, then prune and rebind
    pub fn gather_ports(&mut self, id: NodeId) -> FlowResult<()> {
        let node = self.nodes.get_mut(id).ok_or(FlowError::UnknownNode(id))?;
        node.gather_ports();
        self.validate();
        Ok(())
    }

    /// Re-run port gathering for every node, then prune and rebind
    pub fn gather_all_ports(&mut self) {
        for node in self.nodes.iter_mut() {
            node.gather_ports();
        }
        self.validate();
    }

    /// Set and persist the default of a value input.
    ///
    /// The value survives later port gatherings. Rejected if the port is not a
    /// value input or the value does not fit its type.
    pub fn set_input_value(&mut self, node: NodeId, port: &str, value: Value) -> FlowResult<()> {
        let target = self.nodes.get_mut(node).ok_or(FlowError::UnknownNode(node))?;
        let node_name = target.name().to_string();
        let slot = target
            .registry_mut()
            .input_mut(port)
            .filter(|p| p.kind() == PortKind::ValueIn)
            .ok_or_else(|| FlowError::UnknownPort {
                node: node_name.clone(),
                port: port.to_string(),
                kind: PortKind::ValueIn,
            })?;
        let expected = slot.value_type().cloned().unwrap_or(ValueType::Any);
        if !slot.set_default(value.clone()) {
            return Err(FlowError::TypeMismatch {
                port: format!("{}.{}", node_name, port),
                expected,
                found: value.value_type(),
            });
        }
        let stored = slot.default_value().cloned().unwrap_or(value);
        target.record_input_value(port, stored);
        self.validate();
        Ok(())
    }

    /// Supply the agent used to fill leading value inputs on first start
    pub fn set_agent(&mut self, agent: Rc<dyn Agent>) {
        self.agent = Some(agent);
    }

    pub fn agent(&self) -> Option<&dyn Agent> {
        self.agent.as_deref()
    }

    // ---- connections ----

    /// Connect an output port to an input port.
    ///
    /// Fails if either end does not exist, the kinds or value types are
    /// incompatible, the value input already has a driver, the control output
    /// already has a target, or (under [`CyclePolicy::Reject`]) the new control
    /// edge would close a cycle.
    pub fn connect(&mut self, source: OutputRef, target: InputRef) -> FlowResult<ConnectionId> {
        let kind = ConnectionValidator::validate_connection(&self.nodes, &source, &target)?;
        match kind {
            PortKind::ValueOut => {
                ConnectionValidator::check_input_port_collision(&self.nodes, &self.connections, &target)?;
            }
            PortKind::ControlOut => {
                ConnectionValidator::check_output_port_collision(&self.nodes, &self.connections, &source)?;
                if self.config.cycle_policy == CyclePolicy::Reject
                    && self.closes_control_cycle(source.node(), target.node())
                {
                    return Err(FlowError::ControlCycle {
                        from: source.to_string(),
                        to: target.to_string(),
                    });
                }
            }
            _ => {}
        }

        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;
        let connection = Connection::new(id, source, target);
        debug!("Graph '{}': connected {}", self.name, connection);
        self.connections.push(connection);
        self.validate();
        Ok(id)
    }

    /// Remove a connection, returning it
    pub fn disconnect(&mut self, id: ConnectionId) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.id() == id)?;
        let connection = self.connections.remove(index);
        debug!("Graph '{}': disconnected {}", self.name, connection);
        self.validate();
        Some(connection)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id() == id)
    }

    /// The connection driving an input port, if any
    pub fn input_connection(&self, target: &InputRef) -> Option<&Connection> {
        self.connections.iter().find(|c| c.target() == target)
    }

    /// Connections leaving an output port. A control output has at most one.
    pub fn output_connections<'a>(
        &'a self,
        source: &'a OutputRef,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.source() == source)
    }

    /// Re-resolve every connection against the current port sets.
    ///
    /// Connections whose node or port disappeared, or whose kinds or types no
    /// longer match, are dropped. All bindings are then rebuilt from the
    /// surviving connections. Returns how many connections were pruned.
    pub fn validate(&mut self) -> usize {
        let nodes = &self.nodes;
        let before = self.connections.len();
        self.connections.retain(|connection| {
            let keep = ConnectionValidator::is_still_valid(nodes, connection);
            if !keep {
                debug!("Pruning stale connection {}", connection);
            }
            keep
        });
        let pruned = before - self.connections.len();
        Binder::rebind(&mut self.nodes, &self.connections);
        pruned
    }

    /// Node-level control edges, one per control connection
    pub fn control_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.connections
            .iter()
            .filter(|c| {
                self.get_output_port(c.source_node(), c.source_port())
                    .is_some_and(|port| port.kind() == PortKind::ControlOut)
            })
            .map(|c| (c.source_node(), c.target_node()))
            .collect()
    }

    /// Check if the control wiring contains a cycle
    pub fn has_control_cycle(&self) -> bool {
        ControlOrder::has_cycle(&self.node_ids(), &self.control_edges())
    }

    fn closes_control_cycle(&self, from: NodeId, to: NodeId) -> bool {
        let mut edges = self.control_edges();
        edges.push((from, to));
        ControlOrder::has_cycle(&self.node_ids(), &edges)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(Node::id).collect()
    }

    // ---- lifecycle ----

    /// Enter `Running`.
    ///
    /// The first start after construction also binds every connection, lets
    /// the agent fill leading value inputs and records the updatable nodes.
    /// Starting while already running does nothing.
    pub fn start(&mut self) {
        if self.state.is_running() {
            debug!("Graph '{}' already running", self.name);
            return;
        }
        self.state = GraphState::Starting;

        if !self.has_initialized {
            self.updatable_nodes.clear();
            self.validate();
            if let Some(agent) = self.agent.clone() {
                for node in self.nodes.iter_mut() {
                    node.assign_agent_instance(agent.as_ref());
                }
            }
            self.updatable_nodes = self
                .nodes
                .iter()
                .filter(|node| node.is_updatable())
                .map(Node::id)
                .collect();
            self.has_initialized = true;
            debug!(
                "Graph '{}': discovered {} updatable node(s)",
                self.name,
                self.updatable_nodes.len()
            );
        }

        self.state = GraphState::Running;
        info!("Graph '{}' started", self.name);
    }

    /// Halt future ticks and invocations. Bindings are kept.
    pub fn stop(&mut self) {
        if self.state != GraphState::Stopped {
            info!("Graph '{}' stopped", self.name);
        }
        self.state = GraphState::Stopped;
    }

    /// Call `update` on every updatable node in discovery order.
    ///
    /// Does nothing unless running. The first fault aborts the tick.
    pub fn tick(&self) -> FlowResult<()> {
        if !self.state.is_running() {
            return Ok(());
        }
        for &id in &self.updatable_nodes {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let mut flow = Flow::root(self, id)?;
            node.behavior().update(&mut flow)?;
        }
        Ok(())
    }

    /// Invoke a control input from outside the graph and return the node's
    /// status once the cascade has finished
    pub fn invoke(&self, node: NodeId, port: &ControlIn) -> FlowResult<Status> {
        if !self.state.is_running() {
            return Err(FlowError::NotRunning(self.name.clone()));
        }
        let mut flow = Flow::root(self, node)?;
        flow.run_control_in(port)?;
        Ok(flow.status())
    }

    /// Invoke the control input `id` of `node`
    pub fn invoke_port(&self, node: NodeId, id: &str) -> FlowResult<Status> {
        self.invoke(node, &ControlIn::new(id))
    }

    /// Read a typed value input of `node` as its own logic would
    pub fn read_input<T: PortValue>(&self, node: NodeId, port: &ValueIn<T>) -> FlowResult<T> {
        Flow::root(self, node)?.read(port)
    }

    /// Read the value input `id` of `node` as a dynamic value
    pub fn read_input_value(&self, node: NodeId, id: &str) -> FlowResult<Value> {
        Flow::root(self, node)?.read_value(id)
    }

    /// Evaluate the value output `id` of `node`
    pub fn evaluate_output(&self, node: NodeId, id: &str) -> FlowResult<Value> {
        Flow::root(self, node)?.evaluate(id)
    }

    /// Nodes ticked each frame, in discovery order
    pub fn updatable_nodes(&self) -> &[NodeId] {
        &self.updatable_nodes
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("nodes", &self.nodes.len())
            .field("connections", &self.connections.len())
            .field("updatable_nodes", &self.updatable_nodes)
            .finish()
    }
}
