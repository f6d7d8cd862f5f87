//! In-process document collection.
//!
//! `MemoryStore` is a cheap handle; clones share the same collection, so a
//! test can keep one handle to inspect writes (or play the "other client")
//! while the engine owns another.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::remote::{Document, RemoteError, RemoteStore, Snapshot, Subscription, stamped};

/// A write the store accepted, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Upsert(String),
    Delete(String),
}

#[derive(Default)]
struct Inner {
    docs: IndexMap<String, Map<String, Value>>,
    subscribers: Vec<mpsc::Sender<Result<Snapshot, RemoteError>>>,
    ops: Vec<StoreOp>,
    fail_writes: bool,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            docs: self
                .docs
                .iter()
                .map(|(id, body)| Document {
                    id: id.clone(),
                    body: body.clone(),
                })
                .collect(),
        }
    }

    /// Push the current contents to every live subscriber
    fn broadcast(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| tx.send(Ok(snapshot.clone())).is_ok());
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reject every subsequent upsert/delete while set
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Writes accepted so far
    pub fn ops(&self) -> Vec<StoreOp> {
        self.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    /// Stored body of one document, metadata included
    pub fn doc(&self, id: &str) -> Option<Map<String, Value>> {
        self.lock().docs.get(id).cloned()
    }

    pub fn doc_ids(&self) -> Vec<String> {
        self.lock().docs.keys().cloned().collect()
    }

    /// Deliver an error to every subscriber, as a dropped connection would
    pub fn emit_error(&self, reason: &str) {
        let mut inner = self.lock();
        inner.subscribers.retain(|tx| {
            tx.send(Err(RemoteError::Rejected {
                id: "*".to_string(),
                reason: reason.to_string(),
            }))
            .is_ok()
        });
    }
}

impl RemoteStore for MemoryStore {
    fn subscribe(&mut self) -> Result<Subscription, RemoteError> {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.lock();
        // Initial snapshot, like a fresh listener
        tx.send(Ok(inner.snapshot()))
            .map_err(|_| RemoteError::Closed)?;
        inner.subscribers.push(tx);
        Ok(Subscription::new(rx))
    }

    fn upsert(&mut self, id: &str, body: &Map<String, Value>) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(RemoteError::Rejected {
                id: id.to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        inner.docs.insert(id.to_string(), stamped(body));
        inner.ops.push(StoreOp::Upsert(id.to_string()));
        inner.broadcast();
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(RemoteError::Rejected {
                id: id.to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        inner.docs.shift_remove(id);
        inner.ops.push(StoreOp::Delete(id.to_string()));
        inner.broadcast();
        Ok(())
    }
}
