#[allow(clippy::module_inception)]
pub mod node;
pub(crate) mod node_set;
pub mod registry;

pub use node::{Node, NodeLogic, Status};
pub(crate) use node_set::NodeSet;
pub use registry::{NodeDescriptor, NodeRegistry};
