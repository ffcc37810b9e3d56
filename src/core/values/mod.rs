pub mod traits;
pub mod typed_value;

// Re-export all public types
pub use traits::PortValue;
pub use typed_value::{ObjectRef, Value, ValueType};
