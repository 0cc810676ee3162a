//! Values as they cross the remote boundary

use super::{Handle, ProxyRegistry, RemoteObject};
use crate::error::{ErrorKind, GuiError, GuiResult};
use crate::location::Location;
use crate::matches::Match;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Serializable result of a remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum RemoteValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Object(Handle),
    List(Vec<RemoteValue>),
}

impl RemoteValue {
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            RemoteValue::Object(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RemoteValue]> {
        match self {
            RemoteValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Error as seen by the remote caller, still distinguishable by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFault {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RemoteFault {}

impl From<&GuiError> for RemoteFault {
    fn from(err: &GuiError) -> Self {
        RemoteFault {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<GuiError> for RemoteFault {
    fn from(err: GuiError) -> Self {
        RemoteFault::from(&err)
    }
}

pub type RemoteResult = Result<RemoteValue, RemoteFault>;

/// Conversion of a return value into its remote form. Objects get
/// registered, primitives are copied.
pub trait Proxify {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue>;
}

impl Proxify for () {
    fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Ok(RemoteValue::Null)
    }
}

impl Proxify for bool {
    fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Ok(RemoteValue::Bool(self))
    }
}

macro_rules! proxify_int {
    ($($t:ty),*) => {
        $(impl Proxify for $t {
            fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
                Ok(RemoteValue::Int(i64::from(self)))
            }
        })*
    };
}

proxify_int!(i32, i64, u32);

impl Proxify for f64 {
    fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Ok(RemoteValue::Float(self))
    }
}

impl Proxify for String {
    fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Ok(RemoteValue::Text(self))
    }
}

impl Proxify for &str {
    fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Ok(RemoteValue::Text(self.to_string()))
    }
}

impl<T: Proxify> Proxify for Option<T> {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        match self {
            Some(value) => value.proxify(registry),
            None => Ok(RemoteValue::Null),
        }
    }
}

impl<T: Proxify> Proxify for Vec<T> {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        self.into_iter()
            .map(|item| item.proxify(registry))
            .collect::<GuiResult<Vec<_>>>()
            .map(RemoteValue::List)
    }
}

impl Proxify for Handle {
    fn proxify(self, _: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Ok(RemoteValue::Object(self))
    }
}

impl Proxify for RemoteObject {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        registry.register(self).map(RemoteValue::Object)
    }
}

impl Proxify for Arc<Region> {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        RemoteObject::Region(self).proxify(registry)
    }
}

impl Proxify for Arc<Match> {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        RemoteObject::Match(self).proxify(registry)
    }
}

impl Proxify for Arc<Location> {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        RemoteObject::Location(self).proxify(registry)
    }
}

// A bare location is a new object every time it is returned
impl Proxify for Location {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Arc::new(self).proxify(registry)
    }
}

impl Proxify for Region {
    fn proxify(self, registry: &ProxyRegistry) -> GuiResult<RemoteValue> {
        Arc::new(self).proxify(registry)
    }
}
