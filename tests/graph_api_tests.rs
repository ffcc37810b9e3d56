use rflow::core::agent::Agent;
use rflow::core::ports::ValueGetter;
use rflow::nodes::{Counter, OnUpdate, Sequence};
use rflow::{
    ControlOut, CyclePolicy, Flow, FlowError, Graph, GraphConfig, NodeDescriptor, NodeId,
    NodeLogic, NodeRegistry, ObjectRef, PortKind, Ports, Status, Value, ValueIn, ValueOut,
    ValueType,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Journal = Rc<RefCell<Vec<String>>>;

/// Records its label on every invocation, then continues to `Out`
struct Step {
    label: String,
    journal: Journal,
    out: ControlOut,
    declares_out: Cell<bool>,
}

impl Step {
    fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_string(),
            journal: Rc::clone(journal),
            out: ControlOut::new("Out"),
            declares_out: Cell::new(true),
        }
    }
}

impl NodeLogic for Step {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            node.journal.borrow_mut().push(node.label.clone());
            flow.set_status(Status::Success);
            if node.declares_out.get() {
                flow.call(&node.out)?;
            }
            Ok(())
        });
        if self.declares_out.get() {
            ports.control_out(&self.out);
        }
    }
}

/// Reads `Value` on every invocation and keeps what it saw
struct Reader {
    input: ValueIn<i64>,
    seen: RefCell<Vec<i64>>,
}

impl Reader {
    fn new() -> Self {
        Self {
            input: ValueIn::new("Value"),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl NodeLogic for Reader {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            let value = flow.read(&node.input)?;
            node.seen.borrow_mut().push(value);
            flow.set_status(Status::Success);
            Ok(())
        });
        ports.value_in(&self.input, 42);
    }
}

/// `Out = In + offset`
struct Offset {
    input: ValueIn<i64>,
    output: ValueOut<i64>,
    offset: i64,
}

impl Offset {
    fn new(offset: i64) -> Self {
        Self {
            input: ValueIn::new("In"),
            output: ValueOut::new("Out"),
            offset,
        }
    }
}

impl NodeLogic for Offset {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.value_in_zeroed(&self.input);
        ports.value_out(&self.output, |node, flow| Ok(flow.read(&node.input)? + node.offset));
    }
}

/// `Sum = Left + Right`
struct Add {
    left: ValueIn<i64>,
    right: ValueIn<i64>,
    sum: ValueOut<i64>,
}

impl NodeLogic for Add {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.value_in_zeroed(&self.left);
        ports.value_in_zeroed(&self.right);
        ports.value_out(&self.sum, |node, flow| {
            Ok(flow.read(&node.left)? + flow.read(&node.right)?)
        });
    }
}

struct Faulty {
    message: Option<&'static str>,
}

impl NodeLogic for Faulty {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |node, flow| {
            flow.fail(node.message);
            Ok(())
        });
    }
}

struct Crash;

impl NodeLogic for Crash {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("In", |_, flow| Err(flow.fault("boom")));
    }
}

fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

fn seen(graph: &Graph, id: NodeId) -> Vec<i64> {
    graph
        .node(id)
        .and_then(|node| node.logic::<Reader>())
        .map(|reader| reader.seen.borrow().clone())
        .unwrap()
}

#[test]
fn test_unbound_control_out_is_noop() {
    init_logger();
    let log = journal();
    let mut graph = Graph::new("noop");
    let a = graph.add_node(Step::new("A", &log));
    let b = graph.add_node(Step::new("B", &log));
    graph.start();

    assert_eq!(graph.invoke_port(a, "In").unwrap(), Status::Success);
    assert_eq!(entries(&log), vec!["A"]);
    assert_eq!(graph.node(b).unwrap().status(), Status::Resting);
}

#[test]
fn test_control_chain_runs_in_order_once() {
    init_logger();
    let log = journal();
    let mut graph = Graph::new("chain");
    let a = graph.add_node(Step::new("A", &log));
    let b = graph.add_node(Step::new("B", &log));
    let c = graph.add_node(Step::new("C", &log));
    graph.connect(a.output("Out"), b.input("In")).unwrap();
    graph.connect(b.output("Out"), c.input("In")).unwrap();
    graph.start();

    graph.invoke_port(a, "In").unwrap();
    assert_eq!(entries(&log), vec!["A", "B", "C"]);
}

#[test]
fn test_regathering_prunes_dropped_port() {
    init_logger();
    let log = journal();
    let mut graph = Graph::new("prune");
    let a = graph.add_node(Step::new("A", &log));
    let b = graph.add_node(Step::new("B", &log));
    let c = graph.add_node(Step::new("C", &log));
    graph.connect(a.output("Out"), b.input("In")).unwrap();
    graph.connect(b.output("Out"), c.input("In")).unwrap();
    assert_eq!(graph.connection_count(), 2);

    // re-gathering with the same declarations keeps everything
    graph.gather_ports(b).unwrap();
    assert_eq!(graph.connection_count(), 2);

    graph.node(b).unwrap().logic::<Step>().unwrap().declares_out.set(false);
    graph.gather_ports(b).unwrap();
    assert_eq!(graph.connection_count(), 1);
    assert!(graph.get_output_port(b, "Out").is_none());
    assert_eq!(graph.validate(), 0);

    graph.start();
    graph.invoke_port(a, "In").unwrap();
    assert_eq!(entries(&log), vec!["A", "B"]);
}

#[test]
fn test_unconnected_value_in_reads_default() {
    init_logger();
    let mut graph = Graph::new("defaults");
    let reader = graph.add_node(Reader::new());
    let source = graph.add_node(Counter::new());
    graph.start();

    for _ in 0..3 {
        graph.invoke_port(reader, "In").unwrap();
    }
    assert_eq!(seen(&graph, reader), vec![42, 42, 42]);

    graph.connect(source.output("Count"), reader.input("Value")).unwrap();
    graph.invoke_port(reader, "In").unwrap();
    assert_eq!(seen(&graph, reader), vec![42, 42, 42, 1]);
}

#[test]
fn test_diamond_pull_recomputes_shared_producer() {
    init_logger();
    let mut graph = Graph::new("diamond");
    let source = graph.add_node(Counter::new());
    let left = graph.add_node(Offset::new(10));
    let right = graph.add_node(Offset::new(100));
    let sum = graph.add_node(Add {
        left: ValueIn::new("Left"),
        right: ValueIn::new("Right"),
        sum: ValueOut::new("Sum"),
    });
    graph.connect(source.output("Count"), left.input("In")).unwrap();
    graph.connect(source.output("Count"), right.input("In")).unwrap();
    graph.connect(left.output("Out"), sum.input("Left")).unwrap();
    graph.connect(right.output("Out"), sum.input("Right")).unwrap();

    // (1 + 10) + (2 + 100): the counter ran once per consuming read
    assert_eq!(graph.evaluate_output(sum, "Sum").unwrap(), Value::Int(113));
    let counter = graph.node(source).unwrap().logic::<Counter>().unwrap();
    assert_eq!(counter.reads(), 2);
}

#[test]
fn test_counter_reads_are_not_memoized() {
    init_logger();
    let mut graph = Graph::new("counter");
    let tick = graph.add_node(OnUpdate::new());
    let steps = graph.add_node(Sequence::new(2));
    let source = graph.add_named_node("Source", Counter::new());
    let read_a = graph.add_named_node("ReadA", Reader::new());
    let read_b = graph.add_named_node("ReadB", Reader::new());
    graph.connect(tick.output("Out"), steps.input("In")).unwrap();
    graph.connect(steps.output("Then 0"), read_a.input("In")).unwrap();
    graph.connect(steps.output("Then 1"), read_b.input("In")).unwrap();
    graph.connect(source.output("Count"), read_a.input("Value")).unwrap();
    graph.connect(source.output("Count"), read_b.input("Value")).unwrap();

    graph.start();
    graph.tick().unwrap();
    assert_eq!(seen(&graph, read_a), vec![1]);
    assert_eq!(seen(&graph, read_b), vec![2]);

    graph.tick().unwrap();
    assert_eq!(seen(&graph, read_a), vec![1, 3]);
    assert_eq!(seen(&graph, read_b), vec![2, 4]);
}

#[test]
fn test_fail_sets_failure_without_error() {
    init_logger();
    let mut graph = Graph::new("fail");
    let node = graph.add_named_node("Picky", Faulty { message: Some("x") });
    let quiet = graph.add_node(Faulty { message: None });
    let tick = graph.add_node(OnUpdate::new());
    graph.start();

    assert_eq!(graph.invoke_port(node, "In"), Ok(Status::Failure));
    assert_eq!(graph.invoke_port(quiet, "In"), Ok(Status::Failure));

    // unaffected by unrelated ticks
    graph.tick().unwrap();
    assert_eq!(graph.node(node).unwrap().status(), Status::Failure);
    assert_eq!(graph.node(tick).unwrap().status(), Status::Success);
}

#[test]
fn test_fault_aborts_tick() {
    init_logger();
    let log = journal();
    let mut graph = Graph::new("fault");
    let first = graph.add_node(OnUpdate::new());
    let crash = graph.add_named_node("Crash", Crash);
    let second = graph.add_node(OnUpdate::new());
    let after = graph.add_node(Step::new("after", &log));
    graph.connect(first.output("Out"), crash.input("In")).unwrap();
    graph.connect(second.output("Out"), after.input("In")).unwrap();
    graph.start();

    let err = graph.tick().unwrap_err();
    assert_eq!(err, FlowError::fault("Crash", "boom"));
    assert!(entries(&log).is_empty());

    assert_eq!(graph.invoke_port(after, "In"), Ok(Status::Success));
}

#[test]
fn test_start_twice_keeps_single_discovery() {
    init_logger();
    let log = journal();
    let mut graph = Graph::new("start");
    let tick = graph.add_node(OnUpdate::new());
    let step = graph.add_node(Step::new("tick", &log));
    graph.connect(tick.output("Out"), step.input("In")).unwrap();

    graph.start();
    graph.start();
    assert_eq!(graph.updatable_nodes(), &[tick]);

    graph.stop();
    graph.start();
    assert_eq!(graph.updatable_nodes(), &[tick]);

    graph.tick().unwrap();
    assert_eq!(entries(&log), vec!["tick"]);
}

#[test]
fn test_stopped_graph_does_not_tick() {
    init_logger();
    let log = journal();
    let mut graph = Graph::new("stopped");
    let tick = graph.add_node(OnUpdate::new());
    let step = graph.add_node(Step::new("tick", &log));
    graph.connect(tick.output("Out"), step.input("In")).unwrap();

    graph.tick().unwrap();
    graph.start();
    graph.tick().unwrap();
    graph.stop();
    graph.tick().unwrap();
    assert_eq!(entries(&log), vec!["tick"]);

    // discovery only happens once, so late updatable nodes are not ticked
    let late = graph.add_node(OnUpdate::new());
    graph.connect(late.output("Out"), step.input("In")).unwrap();
    graph.start();
    graph.tick().unwrap();
    assert_eq!(entries(&log), vec!["tick", "tick"]);
}

#[test]
fn test_reject_policy_refuses_control_cycles() {
    init_logger();
    let log = journal();
    let config = GraphConfig::new().with_cycle_policy(CyclePolicy::Reject);
    let mut graph = Graph::with_config("acyclic", config);
    let a = graph.add_node(Step::new("A", &log));
    let b = graph.add_node(Step::new("B", &log));
    let c = graph.add_node(Step::new("C", &log));

    graph.connect(a.output("Out"), b.input("In")).unwrap();
    assert!(matches!(
        graph.connect(b.output("Out"), a.input("In")),
        Err(FlowError::ControlCycle { .. })
    ));
    assert!(matches!(
        graph.connect(c.output("Out"), c.input("In")),
        Err(FlowError::ControlCycle { .. })
    ));
    graph.connect(b.output("Out"), c.input("In")).unwrap();
    assert!(!graph.has_control_cycle());
}

#[test]
fn test_call_depth_limit_stops_runaway_cycle() {
    init_logger();
    let log = journal();
    let mut graph = Graph::with_config("cyclic", GraphConfig::new().with_max_call_depth(5));
    let a = graph.add_node(Step::new("A", &log));
    let b = graph.add_node(Step::new("B", &log));
    graph.connect(a.output("Out"), b.input("In")).unwrap();
    graph.connect(b.output("Out"), a.input("In")).unwrap();
    assert!(graph.has_control_cycle());
    graph.start();

    let err = graph.invoke_port(a, "In").unwrap_err();
    assert!(matches!(err, FlowError::CallDepthExceeded { limit: 5, .. }));
    assert_eq!(entries(&log), vec!["A", "B", "A", "B", "A"]);
}

#[test]
fn test_call_depth_limit_covers_value_pulls() {
    init_logger();
    let mut graph = Graph::with_config("pulls", GraphConfig::new().with_max_call_depth(3));
    let source = graph.add_node(Counter::new());
    let mut chain = vec![source];
    for _ in 0..4 {
        let next = graph.add_node(Offset::new(1));
        let last = chain[chain.len() - 1];
        let from = if last == source { "Count" } else { "Out" };
        graph.connect(last.output(from), next.input("In")).unwrap();
        chain.push(next);
    }

    // Offset, Offset, Counter: three levels fit the limit
    assert_eq!(graph.evaluate_output(chain[2], "Out").unwrap(), Value::Int(3));
    assert!(matches!(
        graph.evaluate_output(chain[4], "Out"),
        Err(FlowError::CallDepthExceeded { limit: 3, .. })
    ));
}

/// Uses ports it never declared
struct Sloppy;

impl NodeLogic for Sloppy {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("Call", |_, flow| flow.call(&ControlOut::new("Missing")));
        ports.control_in("Read", |_, flow| {
            flow.read(&ValueIn::<i64>::new("Missing"))?;
            Ok(())
        });
    }
}

#[test]
fn test_undeclared_ports_fault_through_invoke() {
    init_logger();
    let mut graph = Graph::new("undeclared");
    let sloppy = graph.add_named_node("Sloppy", Sloppy);
    graph.start();

    assert_eq!(
        graph.invoke_port(sloppy, "Call"),
        Err(FlowError::UnknownPort {
            node: "Sloppy".to_string(),
            port: "Missing".to_string(),
            kind: PortKind::ControlOut,
        })
    );
    assert_eq!(
        graph.invoke_port(sloppy, "Read"),
        Err(FlowError::UnknownPort {
            node: "Sloppy".to_string(),
            port: "Missing".to_string(),
            kind: PortKind::ValueIn,
        })
    );
}

/// Declares an int output but yields text
struct Liar;

impl NodeLogic for Liar {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        let getter: ValueGetter =
            Rc::new(|_: &mut Flow<'_>| Ok::<_, FlowError>(Value::Text("many".to_string())));
        ports
            .registry()
            .register_value_out("Out", "Out", ValueType::Int, getter);
    }
}

#[test]
fn test_pulled_value_of_wrong_type_faults_the_reader() {
    init_logger();
    let mut graph = Graph::new("mismatch");
    let liar = graph.add_node(Liar);
    let reader = graph.add_node(Reader::new());
    graph.connect(liar.output("Out"), reader.input("Value")).unwrap();
    graph.start();

    assert!(matches!(
        graph.invoke_port(reader, "In"),
        Err(FlowError::TypeMismatch {
            expected: ValueType::Int,
            found: ValueType::Text,
            ..
        })
    ));
    assert!(seen(&graph, reader).is_empty());
}

struct PlaySound {
    source: ValueIn<Option<ObjectRef>>,
}

impl NodeLogic for PlaySound {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        ports.control_in("Play", |node, flow| {
            match flow.read(&node.source)? {
                Some(_) => flow.set_status(Status::Success),
                None => flow.fail(Some("no audio source")),
            }
            Ok(())
        });
        ports.value_in_as(&self.source, ValueType::object("AudioSource"), None);
    }
}

fn play_sound() -> PlaySound {
    PlaySound {
        source: ValueIn::new("Source"),
    }
}

struct Speaker {
    audio: ObjectRef,
}

impl Agent for Speaker {
    fn name(&self) -> &str {
        "Speaker"
    }

    fn provide(&self, value_type: &ValueType) -> Option<Value> {
        match value_type {
            ValueType::Object(name) if name == "AudioSource" => {
                Some(Value::Object(self.audio.clone()))
            }
            _ => None,
        }
    }
}

#[test]
fn test_agent_fills_unconnected_leading_inputs_on_first_start() {
    init_logger();
    let audio = ObjectRef::new("AudioSource");
    let preset = ObjectRef::new("AudioSource");
    let mut graph = Graph::new("agent");
    graph.set_agent(Rc::new(Speaker {
        audio: audio.clone(),
    }));
    let fresh = graph.add_node(play_sound());
    let configured = graph.add_node(play_sound());
    graph
        .set_input_value(configured, "Source", Value::Object(preset.clone()))
        .unwrap();
    let late_source = graph.add_node(play_sound());

    graph.start();
    let source_of = |graph: &Graph, id: NodeId| {
        graph
            .get_input_port(id, "Source")
            .and_then(|port| port.default_value())
            .cloned()
    };
    assert_eq!(source_of(&graph, fresh), Some(Value::Object(audio.clone())));
    assert_eq!(source_of(&graph, configured), Some(Value::Object(preset)));
    assert_eq!(graph.invoke_port(fresh, "Play"), Ok(Status::Success));

    // added after the first start: never assigned
    graph.stop();
    let after = graph.add_node(play_sound());
    graph.start();
    assert_eq!(source_of(&graph, after), Some(Value::Null));
    assert_eq!(graph.invoke_port(after, "Play"), Ok(Status::Failure));
    assert_eq!(source_of(&graph, late_source), Some(Value::Object(audio)));
}

#[test]
fn test_descriptor_roundtrip_and_construction() {
    init_logger();
    let mut registry = NodeRegistry::new();
    rflow::nodes::register_stock_nodes(&mut registry);

    let descriptor = NodeDescriptor::new("flow.log_text")
        .with_name("Hello")
        .with_input_value("Text", Value::Text("hi".to_string()))
        .with_input_value("Stale", Value::Int(3));
    let json = serde_json::to_string(&descriptor).unwrap();
    let restored: NodeDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, descriptor);

    let minimal: NodeDescriptor = serde_json::from_str(r#"{"type_id":"flow.branch"}"#).unwrap();
    assert!(minimal.name.is_none());

    let mut graph = Graph::new("descriptors");
    let hello = graph.add_from_descriptor(&registry, &restored).unwrap();
    let node = graph.node(hello).unwrap();
    assert_eq!(node.name(), "Hello");
    assert_eq!(node.type_name(), "flow.log_text");
    assert_eq!(
        graph.read_input_value(hello, "Text").unwrap(),
        Value::Text("hi".to_string())
    );
    graph.add_from_descriptor(&registry, &minimal).unwrap();

    let missing = NodeDescriptor::new("flow.teleport");
    assert_eq!(
        graph.add_from_descriptor(&registry, &missing),
        Err(FlowError::UnknownNodeType("flow.teleport".to_string()))
    );
    assert_eq!(graph.node_count(), 2);
}

/// Hands out a fixed audio source
struct Microphone {
    audio: ObjectRef,
    typed: bool,
}

impl NodeLogic for Microphone {
    fn register_ports(&self, ports: &mut Ports<'_, Self>) {
        let port: ValueOut<Option<ObjectRef>> = ValueOut::new("Audio");
        if self.typed {
            ports.value_out_as(port, ValueType::object("AudioSource"), |node, _| {
                Ok(Some(node.audio.clone()))
            });
        } else {
            ports.value_out(port, |node, _| Ok(Some(node.audio.clone())));
        }
    }
}

#[test]
fn test_typed_object_output_feeds_object_input() {
    init_logger();
    let mut graph = Graph::new("objects");
    let player = graph.add_node(play_sound());
    let untyped = graph.add_node(Microphone {
        audio: ObjectRef::new("AudioSource"),
        typed: false,
    });
    let typed = graph.add_node(Microphone {
        audio: ObjectRef::new("AudioSource"),
        typed: true,
    });

    assert!(matches!(
        graph.connect(untyped.output("Audio"), player.input("Source")),
        Err(FlowError::TypeMismatch { .. })
    ));
    graph.connect(typed.output("Audio"), player.input("Source")).unwrap();
    assert_eq!(
        graph.get_output_port(typed, "Audio").unwrap().value_type(),
        Some(&ValueType::object("AudioSource"))
    );

    graph.start();
    assert_eq!(graph.invoke_port(player, "Play"), Ok(Status::Success));
}
