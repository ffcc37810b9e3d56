pub mod handles;
pub mod port;
pub mod registry;

pub use handles::{ControlIn, ControlOut, ValueIn, ValueOut};
pub use port::{ControlHandler, Port, ValueGetter};
pub use registry::{PortRegistry, Ports};
