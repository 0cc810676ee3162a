//! Remote-transparent access to regions and matches
//!
//! Values returned across a process boundary are either primitives, which
//! pass through, or objects, which are replaced by a `Handle`. The registry
//! hands out at most one handle per live object so a remote caller holding
//! two handles to "the same" match really talks to one object.

pub mod remote;
pub mod value;

#[cfg(test)]
mod tests;

pub use remote::{Remote, RegionLike};
pub use value::{Proxify, RemoteFault, RemoteResult, RemoteValue};

use crate::error::{GuiError, GuiResult};
use crate::location::Location;
use crate::matches::Match;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Opaque remote reference to a registered object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj_{:x}", self.0)
    }
}

/// Identity of a live object: the address of its shared allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Objects that can be handed out by reference
#[derive(Debug, Clone)]
pub enum RemoteObject {
    Region(Arc<Region>),
    Match(Arc<Match>),
    Location(Arc<Location>),
}

impl RemoteObject {
    pub fn identity(&self) -> ObjectId {
        let addr = match self {
            RemoteObject::Region(r) => Arc::as_ptr(r) as *const () as usize,
            RemoteObject::Match(m) => Arc::as_ptr(m) as *const () as usize,
            RemoteObject::Location(l) => Arc::as_ptr(l) as *const () as usize,
        };
        ObjectId(addr)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RemoteObject::Region(_) => "region",
            RemoteObject::Match(_) => "match",
            RemoteObject::Location(_) => "location",
        }
    }
}

// The side of the remote boundary that actually exports objects.
// Registering the same identity twice is the caller's bug, not the transport's.
pub trait Transport: Send + Sync {
    fn register(&self, object: RemoteObject) -> GuiResult<Handle>;
    fn is_registered(&self, object: &RemoteObject) -> bool;
}

#[derive(Default)]
struct LocalExports {
    objects: HashMap<Handle, RemoteObject>,
    by_identity: HashMap<ObjectId, Handle>,
}

/// In-process transport: exports live in a table that can be queried back
#[derive(Default)]
pub struct LocalTransport {
    next: AtomicU64,
    exports: Mutex<LocalExports>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LocalExports> {
        self.exports.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Object exported under `handle`
    pub fn lookup(&self, handle: Handle) -> Option<RemoteObject> {
        self.lock().objects.get(&handle).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Transport for LocalTransport {
    fn register(&self, object: RemoteObject) -> GuiResult<Handle> {
        let handle = Handle(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        let mut exports = self.lock();
        exports.by_identity.insert(object.identity(), handle);
        exports.objects.insert(handle, object);
        Ok(handle)
    }

    fn is_registered(&self, object: &RemoteObject) -> bool {
        self.lock().by_identity.contains_key(&object.identity())
    }
}

struct Registration {
    handle: Handle,
    // Keeps the object alive so its address cannot be reused by another one
    #[allow(dead_code)]
    object: RemoteObject,
}

/// Identity-keyed registration table in front of a transport
pub struct ProxyRegistry {
    transport: Arc<dyn Transport>,
    entries: Mutex<HashMap<ObjectId, Registration>>,
}

impl ProxyRegistry {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Registry over a fresh in-process transport
    pub fn local() -> (Self, Arc<LocalTransport>) {
        let transport = Arc::new(LocalTransport::new());
        (Self::new(transport.clone()), transport)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectId, Registration>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle for `object`, registering it on first sight.
    ///
    /// The lookup and the registration happen under one lock so concurrent
    /// sessions sharing the registry never export an object twice.
    pub fn register(&self, object: RemoteObject) -> GuiResult<Handle> {
        let id = object.identity();
        let mut entries = self.lock();

        if let Some(existing) = entries.get(&id) {
            log::debug!("Reusing {} for {}", existing.handle, object.kind());
            return Ok(existing.handle);
        }

        if self.transport.is_registered(&object) {
            return Err(GuiError::Transport {
                description: format!(
                    "{} already exported by the transport but unknown to the registry",
                    object.kind()
                ),
            });
        }

        let handle = self.transport.register(object.clone())?;
        log::debug!("Registered {} as {}", object.kind(), handle);
        entries.insert(id, Registration { handle, object });
        Ok(handle)
    }

    /// Wrap any returned value for the remote side
    pub fn proxify<T: Proxify>(&self, value: T) -> GuiResult<RemoteValue> {
        value.proxify(self)
    }

    /// Handle already issued for `object`, if any
    pub fn handle_of(&self, object: &RemoteObject) -> Option<Handle> {
        self.lock().get(&object.identity()).map(|r| r.handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ProxyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
