use crate::core::node::NodeLogic;
use crate::core::ports::{Ports, ValueOut};
use std::cell::Cell;

/// Value source yielding 1, 2, 3, ... one step per read of `Count`
pub struct Counter {
    count: ValueOut<i64>,
    current: Cell<i64>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            count: ValueOut::new("Count"),
            current: Cell::new(0),
        }
    }

    /// Number of times `Count` has been evaluated
    pub fn reads(&self) -> i64 {
        self.current.get()
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLogic for Counter {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.value_out(&self.count, |node, _flow| {
            let next = node.current.get() + 1;
            node.current.set(next);
            Ok(next)
        });
    }
}
