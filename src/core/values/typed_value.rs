use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Type tag carried by every value port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Accepts any value
    Any,
    Bool,
    Int,
    Float,
    Text,
    List,
    /// Host object reference; an empty name accepts any object type
    Object(String),
}

impl ValueType {
    /// Create an object type tag
    pub fn object(type_name: impl Into<String>) -> Self {
        ValueType::Object(type_name.into())
    }

    /// Check whether a port of this type can receive values of `source` type.
    ///
    /// `Float` accepts `Int` (widening); `Any` accepts everything.
    pub fn is_assignable_from(&self, source: &ValueType) -> bool {
        match (self, source) {
            (ValueType::Any, _) => true,
            (ValueType::Float, ValueType::Int) => true,
            (ValueType::Object(target), ValueType::Object(source)) => {
                target.is_empty() || target == source
            }
            (target, source) => target == source,
        }
    }

    /// The zero/empty value of this type, used for value inputs without a default
    pub fn zero(&self) -> Value {
        match self {
            ValueType::Any | ValueType::Object(_) => Value::Null,
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Text => Value::Text(String::new()),
            ValueType::List => Value::List(Vec::new()),
        }
    }

    /// Convert `value` into this type's representation, `None` if it does not fit.
    ///
    /// Integers stored into a `Float` port become floats.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (ValueType::Float, Value::Int(i)) => Some(Value::Float(i as f64)),
            (ty, value) if value.is_instance_of(ty) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => f.write_str("any"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Int => f.write_str("int"),
            ValueType::Float => f.write_str("float"),
            ValueType::Text => f.write_str("text"),
            ValueType::List => f.write_str("list"),
            ValueType::Object(name) if name.is_empty() => f.write_str("object"),
            ValueType::Object(name) => write!(f, "object<{}>", name),
        }
    }
}

/// Reference to an object owned by the host, e.g. handed out by an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    type_name: String,
    id: Uuid,
}

impl ObjectRef {
    /// Create a reference with a fresh random ID
    pub fn new(type_name: impl Into<String>) -> Self {
        Self::with_id(type_name, Uuid::new_v4())
    }

    pub fn with_id(type_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Dynamically typed value flowing through value ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Get the type tag of this value (`Null` reports `Any`)
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Any,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::Text,
            Value::List(_) => ValueType::List,
            Value::Object(object) => ValueType::Object(object.type_name.clone()),
        }
    }

    /// Check if this value may be stored in a port of type `ty`.
    ///
    /// `Null` is accepted by `Any` and object ports only.
    pub fn is_instance_of(&self, ty: &ValueType) -> bool {
        match self {
            Value::Null => matches!(ty, ValueType::Any | ValueType::Object(_)),
            other => ty.is_assignable_from(&other.value_type()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get a float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(object) => write!(f, "{}({})", object.type_name, object.id),
        }
    }
}
