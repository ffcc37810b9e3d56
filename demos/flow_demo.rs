//! Wires a small graph from stock nodes and ticks it a few times.
//!
//! Run with `RUST_LOG=debug` to see binding and pruning as well.

use rflow::nodes::{register_stock_nodes, Branch, LogText, OnUpdate, Sequence, Wait};
use rflow::{FlowError, Graph, GraphConfig, NodeDescriptor, NodeRegistry, Value};

fn main() -> Result<(), FlowError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut registry = NodeRegistry::new();
    register_stock_nodes(&mut registry);

    let mut graph = Graph::with_config("demo", GraphConfig::new().with_max_call_depth(32));
    let tick = graph.add_node(OnUpdate::new());
    let steps = graph.add_node(Sequence::new(2));
    let greet = graph.add_from_descriptor(
        &registry,
        &NodeDescriptor::new("flow.log_text")
            .with_name("Greeting")
            .with_input_value("Text", Value::Text("tick".to_string())),
    )?;
    let every_other = graph.add_node(Wait::new());
    let branch = graph.add_node(Branch::new());
    let even = graph.add_named_node("Even", LogText::new());
    let odd = graph.add_named_node("Odd", LogText::new());

    graph.set_input_value(every_other, "Count", Value::Int(2))?;
    graph.set_input_value(branch, "Condition", Value::Bool(true))?;
    graph.set_input_value(even, "Text", Value::Text("every second tick".to_string()))?;
    graph.set_input_value(odd, "Text", Value::Text("never".to_string()))?;

    graph.connect(tick.output("Out"), steps.input("In"))?;
    graph.connect(steps.output("Then 0"), greet.input("In"))?;
    graph.connect(steps.output("Then 1"), every_other.input("In"))?;
    graph.connect(every_other.output("Out"), branch.input("In"))?;
    graph.connect(branch.output("True"), even.input("In"))?;
    graph.connect(branch.output("False"), odd.input("In"))?;

    graph.start();
    for _ in 0..4 {
        graph.tick()?;
    }
    graph.stop();

    for node in graph.nodes() {
        log::info!("{:<12} {:?}", node.name(), node.status());
    }
    Ok(())
}
