use crate::core::error::FlowResult;
use crate::core::execution::flow::Flow;
use crate::core::types::{NodeId, PortId, PortKind};
use crate::core::values::{Value, ValueType};
use log::warn;
use std::fmt;
use std::rc::Rc;

/// Handler run when a control input is invoked
pub type ControlHandler = Rc<dyn Fn(&mut Flow<'_>) -> FlowResult>;

/// Getter evaluated every time a value output is read
pub type ValueGetter = Rc<dyn Fn(&mut Flow<'_>) -> FlowResult<Value>>;

pub(crate) fn control_handler<F>(handler: F) -> ControlHandler
where
    F: Fn(&mut Flow<'_>) -> FlowResult + 'static,
{
    Rc::new(handler)
}

pub(crate) fn value_getter<F>(getter: F) -> ValueGetter
where
    F: Fn(&mut Flow<'_>) -> FlowResult<Value> + 'static,
{
    Rc::new(getter)
}

/// Runtime wiring of a control output: the downstream handler and its node
#[derive(Clone)]
pub(crate) struct ControlBinding {
    pub target: NodeId,
    pub handler: ControlHandler,
}

/// Runtime wiring of a value input: the upstream getter and its node
#[derive(Clone)]
pub(crate) struct ValueBinding {
    pub source: NodeId,
    pub getter: ValueGetter,
}

pub(crate) enum PortSlot {
    ControlIn {
        handler: ControlHandler,
    },
    ControlOut {
        binding: Option<ControlBinding>,
    },
    ValueIn {
        value_type: ValueType,
        default: Value,
        binding: Option<ValueBinding>,
    },
    ValueOut {
        value_type: ValueType,
        getter: ValueGetter,
    },
}

/// A named, typed endpoint on a node
pub struct Port {
    owner: NodeId,
    id: PortId,
    name: String,
    slot: PortSlot,
}

impl Port {
    pub(crate) fn control_in(owner: NodeId, id: &str, name: &str, handler: ControlHandler) -> Self {
        Self::with_slot(owner, id, name, PortSlot::ControlIn { handler })
    }

    pub(crate) fn control_out(owner: NodeId, id: &str, name: &str) -> Self {
        Self::with_slot(owner, id, name, PortSlot::ControlOut { binding: None })
    }

    /// Create a value input; a missing or ill-typed default falls back to the type's zero value
    pub(crate) fn value_in(
        owner: NodeId,
        id: &str,
        name: &str,
        value_type: ValueType,
        default: Option<Value>,
    ) -> Self {
        let default = match default {
            Some(value) => value_type.coerce(value.clone()).unwrap_or_else(|| {
                warn!(
                    "Default {} for value input '{}' is not a {}; using the zero value",
                    value, id, value_type
                );
                value_type.zero()
            }),
            None => value_type.zero(),
        };
        Self::with_slot(
            owner,
            id,
            name,
            PortSlot::ValueIn {
                value_type,
                default,
                binding: None,
            },
        )
    }

    pub(crate) fn value_out(
        owner: NodeId,
        id: &str,
        name: &str,
        value_type: ValueType,
        getter: ValueGetter,
    ) -> Self {
        Self::with_slot(owner, id, name, PortSlot::ValueOut { value_type, getter })
    }

    fn with_slot(owner: NodeId, id: &str, name: &str, slot: PortSlot) -> Self {
        Self {
            owner,
            id: id.to_string(),
            name: name.to_string(),
            slot,
        }
    }

    /// Get the owning node
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name; equals the ID unless the handle was given a separate ID
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PortKind {
        match self.slot {
            PortSlot::ControlIn { .. } => PortKind::ControlIn,
            PortSlot::ControlOut { .. } => PortKind::ControlOut,
            PortSlot::ValueIn { .. } => PortKind::ValueIn,
            PortSlot::ValueOut { .. } => PortKind::ValueOut,
        }
    }

    /// Value type of a value port, `None` for control ports
    pub fn value_type(&self) -> Option<&ValueType> {
        match &self.slot {
            PortSlot::ValueIn { value_type, .. } | PortSlot::ValueOut { value_type, .. } => {
                Some(value_type)
            }
            _ => None,
        }
    }

    /// Current default of a value input
    pub fn default_value(&self) -> Option<&Value> {
        match &self.slot {
            PortSlot::ValueIn { default, .. } => Some(default),
            _ => None,
        }
    }

    /// Check if a value input still holds its type's zero value
    pub fn is_default_value(&self) -> bool {
        match &self.slot {
            PortSlot::ValueIn {
                value_type,
                default,
                ..
            } => *default == value_type.zero(),
            _ => false,
        }
    }

    /// Check if this port currently carries a runtime binding.
    ///
    /// Bindings live on the calling side: control outputs and value inputs.
    pub fn is_bound(&self) -> bool {
        match &self.slot {
            PortSlot::ControlOut { binding } => binding.is_some(),
            PortSlot::ValueIn { binding, .. } => binding.is_some(),
            _ => false,
        }
    }

    pub(crate) fn control_handler(&self) -> Option<&ControlHandler> {
        match &self.slot {
            PortSlot::ControlIn { handler } => Some(handler),
            _ => None,
        }
    }

    pub(crate) fn value_getter(&self) -> Option<&ValueGetter> {
        match &self.slot {
            PortSlot::ValueOut { getter, .. } => Some(getter),
            _ => None,
        }
    }

    pub(crate) fn slot(&self) -> &PortSlot {
        &self.slot
    }

    /// Replace the default of a value input, converting it to the port's type.
    ///
    /// Values of the wrong type are rejected.
    pub(crate) fn set_default(&mut self, value: Value) -> bool {
        match &mut self.slot {
            PortSlot::ValueIn {
                value_type,
                default,
                ..
            } => match value_type.coerce(value) {
                Some(value) => {
                    *default = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub(crate) fn bind_control(&mut self, new_binding: ControlBinding) -> bool {
        match &mut self.slot {
            PortSlot::ControlOut { binding } => {
                *binding = Some(new_binding);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn bind_value(&mut self, new_binding: ValueBinding) -> bool {
        match &mut self.slot {
            PortSlot::ValueIn { binding, .. } => {
                *binding = Some(new_binding);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn unbind(&mut self) {
        match &mut self.slot {
            PortSlot::ControlOut { binding } => *binding = None,
            PortSlot::ValueIn { binding, .. } => *binding = None,
            _ => {}
        }
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("owner", &self.owner)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("value_type", &self.value_type())
            .field("default", &self.default_value())
            .field("bound", &self.is_bound())
            .finish()
    }
}
