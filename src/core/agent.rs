use crate::core::values::{Value, ValueType};

/// External owner of a graph (e.g. a game object) that can supply instances
/// for nodes' leading value inputs when the graph first starts.
///
/// Compatibility is decided by the agent: it returns a value for the port types
/// it can satisfy and `None` for everything else.
pub trait Agent {
    fn name(&self) -> &str;

    /// Provide an instance for a value input of type `value_type`
    fn provide(&self, value_type: &ValueType) -> Option<Value>;
}
