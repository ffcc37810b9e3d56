use super::node::Node;
use crate::core::types::NodeId;
use std::collections::HashMap;

/// Ordered node storage with ID lookup
#[derive(Default)]
pub(crate) struct NodeSet {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl NodeSet {
    pub fn push(&mut self, node: Node) {
        self.index.insert(node.id(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Remove a node, preserving the order of the remaining ones
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.index.remove(&id)?;
        let node = self.nodes.remove(slot);
        for (i, node) in self.nodes.iter().enumerate().skip(slot) {
            self.index.insert(node.id(), i);
        }
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.index.get(&id) {
            Some(&slot) => self.nodes.get_mut(slot),
            None => None,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}
