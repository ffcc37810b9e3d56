use super::typed_value::{ObjectRef, Value, ValueType};

/// Rust types that can travel through typed value ports.
///
/// Typed handles (`ValueIn<T>`, `ValueOut<T>`) use this to fix the port's
/// [`ValueType`] at registration and to convert on every read.
pub trait PortValue: Clone + 'static {
    /// Type tag of ports carrying this type
    fn value_type() -> ValueType;

    fn into_value(self) -> Value;

    /// Convert back from a dynamic value, `None` if the value does not fit
    fn from_value(value: &Value) -> Option<Self>;
}

impl PortValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl PortValue for i64 {
    fn value_type() -> ValueType {
        ValueType::Int
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl PortValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl PortValue for String {
    fn value_type() -> ValueType {
        ValueType::Text
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl PortValue for Vec<Value> {
    fn value_type() -> ValueType {
        ValueType::List
    }

    fn into_value(self) -> Value {
        Value::List(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl PortValue for Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

// Object ports hold `Null` until something (usually an agent) assigns a reference.
impl PortValue for Option<ObjectRef> {
    fn value_type() -> ValueType {
        ValueType::object("")
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, Value::Object)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            Value::Object(object) => Some(Some(object.clone())),
            _ => None,
        }
    }
}
