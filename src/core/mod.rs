pub mod agent;
pub mod connections;
pub mod error;
pub mod execution;
pub mod graph;
pub mod node;
pub mod ports;
pub mod types;
pub mod values;
