pub(crate) mod binder;
pub mod connection;
pub mod connection_validator;
pub mod control_order;
pub mod port_validator;

pub(crate) use binder::Binder;
pub use connection::Connection;
pub use connection_validator::ConnectionValidator;
pub use control_order::ControlOrder;
pub use port_validator::PortValidator;
