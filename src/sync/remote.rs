use std::sync::mpsc;
use std::time::Duration;

use serde_json::{Map, Value};

/// Document id reserved for the profile list. Never a trip.
pub const PROFILES_DOC_ID: &str = "_profiles";

/// Server-stamped modification time added to every write.
pub const UPDATED_AT_FIELD: &str = "_updatedAt";

/// Error type for remote store operations
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
    #[error("write rejected for {id}: {reason}")]
    Rejected { id: String, reason: String },
    #[error("subscription closed")]
    Closed,
}

/// One document in a snapshot: id plus its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Map<String, Value>,
}

/// The full contents of the collection at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub docs: Vec<Document>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Receiving end of a collection subscription.
///
/// The store delivers a snapshot right after subscribing and one after
/// every change, possibly from another thread.
pub struct Subscription {
    rx: mpsc::Receiver<Result<Snapshot, RemoteError>>,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<Result<Snapshot, RemoteError>>) -> Self {
        Subscription { rx }
    }

    /// Non-blocking poll. Returns all queued events (may be empty).
    pub fn drain(&self) -> Vec<Result<Snapshot, RemoteError>> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block until the next event or the timeout. `None` on timeout.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Result<Snapshot, RemoteError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(evt) => Some(evt),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(RemoteError::Closed)),
        }
    }
}

/// A shared document collection that pushes snapshots to subscribers.
pub trait RemoteStore {
    fn subscribe(&mut self) -> Result<Subscription, RemoteError>;

    /// Create or replace a document. The store adds `_updatedAt`.
    fn upsert(&mut self, id: &str, body: &Map<String, Value>) -> Result<(), RemoteError>;

    fn delete(&mut self, id: &str) -> Result<(), RemoteError>;
}

/// Drop server metadata (keys starting with `_`) from a document body.
pub fn strip_metadata(mut body: Map<String, Value>) -> Map<String, Value> {
    body.retain(|key, _| !key.starts_with('_'));
    body
}

/// Copy of `body` stamped with the current time, as stores write it.
pub fn stamped(body: &Map<String, Value>) -> Map<String, Value> {
    let mut out = body.clone();
    out.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    out
}
