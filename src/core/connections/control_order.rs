use crate::core::types::NodeId;
use std::collections::{HashMap, VecDeque};

/// Topological ordering of nodes along control connections
pub struct ControlOrder;

impl ControlOrder {
    /// Order `node_ids` so every control edge points forward (Kahn's algorithm).
    ///
    /// Ties are broken by the order of `node_ids`. On a cycle, returns the nodes
    /// that could not be ordered.
    pub fn order(node_ids: &[NodeId], edges: &[(NodeId, NodeId)]) -> Result<Vec<NodeId>, Vec<NodeId>> {
        let mut adj_list: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();

        for &id in node_ids {
            adj_list.entry(id).or_default();
            in_degree.entry(id).or_insert(0);
        }

        for &(from, to) in edges {
            if !in_degree.contains_key(&from) || !in_degree.contains_key(&to) {
                continue;
            }
            adj_list.entry(from).or_default().push(to);
            *in_degree.entry(to).or_insert(0) += 1;
        }

        let mut queue: VecDeque<NodeId> = node_ids
            .iter()
            .copied()
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut ordered = Vec::with_capacity(node_ids.len());

        while let Some(id) = queue.pop_front() {
            ordered.push(id);
            if let Some(targets) = adj_list.get(&id) {
                for target in targets {
                    if let Some(degree) = in_degree.get_mut(target) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(*target);
                        }
                    }
                }
            }
        }

        if ordered.len() == in_degree.len() {
            Ok(ordered)
        } else {
            let stuck = node_ids
                .iter()
                .copied()
                .filter(|id| !ordered.contains(id))
                .collect();
            Err(stuck)
        }
    }

    /// Check if the control edges contain a cycle (self-loops included)
    pub fn has_cycle(node_ids: &[NodeId], edges: &[(NodeId, NodeId)]) -> bool {
        Self::order(node_ids, edges).is_err()
    }
}
