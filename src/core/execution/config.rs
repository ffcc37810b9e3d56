//! Configuration for graph execution
//!
//! This module provides configuration types controlling how a graph treats
//! control-flow cycles and how deep a control cascade may go.

/// How the graph treats control connections that close a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Accept cyclic control wiring; a cycle recurses until something stops it
    #[default]
    Unguarded,
    /// Refuse, at connect time, a control connection that closes a node-level cycle
    Reject,
}

/// Configuration for a graph
///
/// Defaults keep control cascades unguarded: no cycle check and no depth limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Treatment of control cycles when connecting
    pub cycle_policy: CyclePolicy,
    /// Maximum number of nested node entries within one invocation or tick.
    /// The externally invoked node counts as depth 1.
    pub max_call_depth: Option<usize>,
}

impl GraphConfig {
    /// Create a new graph configuration with default values
    pub fn new() -> Self {
        Self {
            cycle_policy: CyclePolicy::default(),
            max_call_depth: None,
        }
    }

    /// Set the cycle policy
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Limit the dynamic call depth of control cascades and value pulls
    ///
    /// # Arguments
    /// * `depth` - The deepest nesting allowed, counting the entry node as 1
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = Some(depth);
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::new()
    }
}
