//! Stock nodes covering the common building blocks of a flow graph.

pub mod control;
pub mod debug;
pub mod events;
pub mod values;

pub use control::{Branch, Sequence, Wait};
pub use debug::LogText;
pub use events::OnUpdate;
pub use values::Counter;

use crate::core::node::NodeRegistry;

/// Register every stock node under its `flow.*` type ID
pub fn register_stock_nodes(registry: &mut NodeRegistry) {
    registry.register("flow.on_update", OnUpdate::new);
    registry.register("flow.branch", Branch::new);
    registry.register("flow.sequence", || Sequence::new(2));
    registry.register("flow.wait", Wait::new);
    registry.register("flow.log_text", LogText::new);
    registry.register("flow.counter", Counter::new);
}
