use std::collections::HashMap;
use std::fmt;

use crate::error::HandleError;

/// Raw id of a content buffer as it crosses the wasm boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u32);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Move-only reference to a text buffer held by the host's registry.
///
/// Reading borrows the handle; saving or logging takes it by value, which is
/// the only way the buffer gets released. Dropping a handle without consuming
/// it leaves the buffer with whoever holds the registry.
#[derive(Debug, PartialEq, Eq)]
pub struct ContentHandle(HandleId);

impl ContentHandle {
    /// Adopt a raw id handed over by the host module
    pub fn from_raw(id: u32) -> Self {
        Self(HandleId(id))
    }

    pub fn id(&self) -> HandleId {
        self.0
    }

    /// Give up the handle as a raw id, e.g. when passing it to the host
    pub fn into_raw(self) -> u32 {
        self.0.0
    }
}

/// Registry of live text buffers.
///
/// Ids start at 1 and count upwards. Once the counter wraps, ids that are
/// still live are skipped, so a new buffer never overwrites a live one.
pub struct HandleTable {
    buffers: HashMap<HandleId, String>,
    next: u32,
    released: usize,
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next: 1,
            released: 0,
        }
    }

    /// Register a buffer and hand out the only handle to it
    pub fn wrap(&mut self, text: String) -> ContentHandle {
        let mut id = HandleId(self.next);
        while self.buffers.contains_key(&id) {
            id = HandleId(next_id(id.0));
        }
        self.next = next_id(id.0);
        self.buffers.insert(id, text);
        ContentHandle(id)
    }

    pub fn text(&self, handle: &ContentHandle) -> Option<&str> {
        self.buffers.get(&handle.0).map(String::as_str)
    }

    /// Release the buffer behind `handle` and return its text
    pub fn consume(&mut self, handle: ContentHandle) -> Result<String, HandleError> {
        match self.buffers.remove(&handle.0) {
            Some(text) => {
                self.released += 1;
                Ok(text)
            }
            None => Err(HandleError::Unknown(handle.0)),
        }
    }

    /// Release by raw id, for callers on the JS side of the boundary
    pub fn take_raw(&mut self, id: u32) -> Option<String> {
        self.consume(ContentHandle::from_raw(id)).ok()
    }

    /// Number of buffers still registered
    pub fn live(&self) -> usize {
        self.buffers.len()
    }

    /// Number of successful releases so far
    pub fn released(&self) -> usize {
        self.released
    }
}

// 0 is never handed out
fn next_id(id: u32) -> u32 {
    id.wrapping_add(1).max(1)
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
