use crate::core::node::{NodeLogic, Status};
use crate::core::ports::{ControlOut, Ports, ValueIn};
use log::info;

/// Logs `Text` at info level, then continues to `Out`
pub struct LogText {
    text: ValueIn<String>,
    out: ControlOut,
}

impl LogText {
    pub fn new() -> Self {
        Self {
            text: ValueIn::new("Text"),
            out: ControlOut::new("Out"),
        }
    }
}

impl Default for LogText {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLogic for LogText {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            let text = flow.read(&node.text)?;
            info!("[{}] {}", flow.node_name(), text);
            flow.set_status(Status::Success);
            flow.call(&node.out)
        });
        ports.value_in_zeroed(&self.text);
        ports.control_out(&self.out);
    }
}
