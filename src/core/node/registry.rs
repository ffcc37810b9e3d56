use super::node::{Node, NodeLogic};
use crate::core::error::{FlowError, FlowResult};
use crate::core::types::{NodeId, PortId};
use crate::core::values::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted description of a node: what to construct and how to configure it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Type identifier registered in a [`NodeRegistry`]
    pub type_id: String,
    /// Display name; defaults to the logic type's name
    #[serde(default)]
    pub name: Option<String>,
    /// Stored values for value inputs, applied on every port gathering
    #[serde(default)]
    pub input_values: HashMap<PortId, Value>,
}

impl NodeDescriptor {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input_value(mut self, port: impl Into<PortId>, value: Value) -> Self {
        self.input_values.insert(port.into(), value);
        self
    }
}

type NodeFactory = Box<dyn Fn(NodeId, Option<String>) -> Node>;

/// Maps node type identifiers to constructors
#[derive(Default)]
pub struct NodeRegistry {
    factories: HashMap<String, NodeFactory>,
    /// Type IDs in registration order
    order: Vec<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `type_id`, replacing any previous one.
    /// Returns true if an existing registration was replaced.
    pub fn register<L, F>(&mut self, type_id: impl Into<String>, constructor: F) -> bool
    where
        L: NodeLogic,
        F: Fn() -> L + 'static,
    {
        let type_id = type_id.into();
        let factory_type = type_id.clone();
        let factory: NodeFactory = Box::new(move |id, name| {
            let mut node = Node::new(id, name, constructor());
            node.set_type_name(factory_type.clone());
            node
        });
        let replaced = self.factories.insert(type_id.clone(), factory).is_some();
        if !replaced {
            self.order.push(type_id);
        }
        replaced
    }

    /// Check if a type is registered
    pub fn contains(&self, type_id: &str) -> bool {
        self.factories.contains_key(type_id)
    }

    /// Get all registered type IDs in registration order
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Construct an unattached node of the described type (ports not gathered)
    pub(crate) fn create(&self, descriptor: &NodeDescriptor, id: NodeId) -> FlowResult<Node> {
        let factory = self
            .factories
            .get(&descriptor.type_id)
            .ok_or_else(|| FlowError::UnknownNodeType(descriptor.type_id.clone()))?;
        let mut node = factory(id, descriptor.name.clone());
        node.set_input_values(descriptor.input_values.clone());
        Ok(node)
    }
}
