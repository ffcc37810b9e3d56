use crate::core::node::{NodeLogic, Status};
use crate::core::ports::{ControlOut, Ports, ValueIn};
use std::cell::Cell;

/// Routes control to `True` or `False` depending on `Condition`
pub struct Branch {
    condition: ValueIn<bool>,
    on_true: ControlOut,
    on_false: ControlOut,
}

impl Branch {
    pub fn new() -> Self {
        Self {
            condition: ValueIn::new("Condition"),
            on_true: ControlOut::new("True"),
            on_false: ControlOut::new("False"),
        }
    }
}

impl Default for Branch {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLogic for Branch {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            let taken = if flow.read(&node.condition)? {
                &node.on_true
            } else {
                &node.on_false
            };
            flow.set_status(Status::Success);
            flow.call(taken)
        });
        ports.value_in(&self.condition, false);
        ports.control_out(&self.on_true);
        ports.control_out(&self.on_false);
    }
}

/// Fires each of its outputs in declaration order
pub struct Sequence {
    steps: Vec<ControlOut>,
}

impl Sequence {
    pub fn new(steps: usize) -> Self {
        Self {
            steps: (0..steps)
                .map(|i| ControlOut::new(format!("Then {}", i)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl NodeLogic for Sequence {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            for step in &node.steps {
                flow.call(step)?;
            }
            flow.set_status(Status::Success);
            Ok(())
        });
        for step in &self.steps {
            ports.control_out(step);
        }
    }
}

/// Holds control until it has been invoked `Count` times, reporting
/// `Running` meanwhile, then fires `Out` and starts over
pub struct Wait {
    count: ValueIn<i64>,
    out: ControlOut,
    seen: Cell<i64>,
}

impl Wait {
    pub fn new() -> Self {
        Self {
            count: ValueIn::new("Count"),
            out: ControlOut::new("Out"),
            seen: Cell::new(0),
        }
    }
}

impl Default for Wait {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLogic for Wait {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            let target = flow.read(&node.count)?;
            if target < 0 {
                flow.fail(Some("Count must not be negative"));
                return Ok(());
            }
            let seen = node.seen.get() + 1;
            if seen < target {
                node.seen.set(seen);
                flow.set_status(Status::Running);
                return Ok(());
            }
            node.seen.set(0);
            flow.set_status(Status::Success);
            flow.call(&node.out)
        });
        ports.value_in(&self.count, 1);
        ports.control_out(&self.out);
    }
}
