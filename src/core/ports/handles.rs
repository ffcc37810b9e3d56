//! Typed port handles.
//!
//! A handle is a cheap key naming one of a node's ports. Nodes keep their
//! handles as ordinary fields and hand them to [`Flow`](crate::core::execution::Flow)
//! (`flow.call(&self.out)`, `flow.read(&self.amount)`), which resolves them against
//! the node currently executing.

use crate::core::types::{PortId, PortKind};
use std::fmt;
use std::marker::PhantomData;

macro_rules! control_handle {
    ($(#[$meta:meta])* $handle:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $handle {
            id: PortId,
            name: String,
        }

        impl $handle {
            pub const KIND: PortKind = $kind;

            /// Create a handle whose ID equals its display name
            pub fn new(name: impl Into<String>) -> Self {
                let name = name.into();
                Self { id: name.clone(), name }
            }

            /// Use an ID distinct from the display name
            pub fn with_id(mut self, id: impl Into<PortId>) -> Self {
                self.id = id.into();
                self
            }

            pub fn id(&self) -> &str {
                &self.id
            }

            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl From<&str> for $handle {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<&$handle> for $handle {
            fn from(handle: &$handle) -> Self {
                handle.clone()
            }
        }

        impl AsRef<str> for $handle {
            fn as_ref(&self) -> &str {
                &self.id
            }
        }
    };
}

macro_rules! value_handle {
    ($(#[$meta:meta])* $handle:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $handle<T> {
            id: PortId,
            name: String,
            _marker: PhantomData<fn() -> T>,
        }

        impl<T> $handle<T> {
            pub const KIND: PortKind = $kind;

            /// Create a handle whose ID equals its display name
            pub fn new(name: impl Into<String>) -> Self {
                let name = name.into();
                Self {
                    id: name.clone(),
                    name,
                    _marker: PhantomData,
                }
            }

            /// Use an ID distinct from the display name
            pub fn with_id(mut self, id: impl Into<PortId>) -> Self {
                self.id = id.into();
                self
            }

            pub fn id(&self) -> &str {
                &self.id
            }

            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl<T> Clone for $handle<T> {
            fn clone(&self) -> Self {
                Self {
                    id: self.id.clone(),
                    name: self.name.clone(),
                    _marker: PhantomData,
                }
            }
        }

        impl<T> fmt::Debug for $handle<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("id", &self.id)
                    .field("name", &self.name)
                    .field("type", &std::any::type_name::<T>())
                    .finish()
            }
        }

        impl<T> PartialEq for $handle<T> {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id && self.name == other.name
            }
        }

        impl<T> Eq for $handle<T> {}

        impl<T> From<&str> for $handle<T> {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl<T> From<&$handle<T>> for $handle<T> {
            fn from(handle: &$handle<T>) -> Self {
                handle.clone()
            }
        }

        impl<T> AsRef<str> for $handle<T> {
            fn as_ref(&self) -> &str {
                &self.id
            }
        }
    };
}

control_handle!(
    /// Handle to a control input; used to invoke a node from outside the graph
    ControlIn,
    PortKind::ControlIn
);

control_handle!(
    /// Handle to a control output; `flow.call(&handle)` runs the bound downstream input
    ControlOut,
    PortKind::ControlOut
);

value_handle!(
    /// Handle to a value input carrying `T`; `flow.read(&handle)` pulls the value
    ValueIn,
    PortKind::ValueIn
);

value_handle!(
    /// Handle to a value output carrying `T`
    ValueOut,
    PortKind::ValueOut
);
