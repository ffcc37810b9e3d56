use crate::core::error::FlowResult;
use crate::core::execution::Flow;
use crate::core::node::{NodeLogic, Status};
use crate::core::ports::{ControlOut, Ports};

/// Fires `Out` once per graph tick
pub struct OnUpdate {
    out: ControlOut,
}

impl OnUpdate {
    pub fn new() -> Self {
        Self {
            out: ControlOut::new("Out"),
        }
    }
}

impl Default for OnUpdate {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLogic for OnUpdate {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_out(&self.out);
    }

    fn update(&self, flow: &mut Flow<'_>) -> FlowResult {
        flow.set_status(Status::Success);
        flow.call(&self.out)
    }

    fn is_updatable(&self) -> bool {
        true
    }
}
