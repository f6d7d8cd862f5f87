//! A document collection kept as one JSON file per document.
//!
//! Several processes may point at the same directory; each subscriber gets
//! a fresh snapshot whenever a document file is created, replaced or removed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::sync::remote::{Document, RemoteError, RemoteStore, Snapshot, Subscription, stamped};

/// Write `content` to `path` through a temp file in the same directory and
/// a rename, so readers never see a partial document.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub struct DirStore {
    dir: PathBuf,
    // Dropping a watcher ends its subscription
    watchers: Vec<RecommendedWatcher>,
}

impl DirStore {
    /// Open (creating if needed) a collection directory
    pub fn open(dir: &Path) -> Result<Self, RemoteError> {
        fs::create_dir_all(dir)?;
        Ok(DirStore {
            dir: dir.to_path_buf(),
            watchers: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, RemoteError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(RemoteError::Rejected {
                id: id.to_string(),
                reason: "document ids may only contain letters, digits, '_' and '-'".to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

/// Document id for a path, if it is a document file at all.
/// Temp files and other dotfiles are not documents.
fn doc_id(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') {
        return None;
    }
    Some(stem)
}

/// Read every document in `dir`, ordered by id. Unreadable files are
/// logged and left out.
pub fn read_snapshot(dir: &Path) -> Result<Snapshot, RemoteError> {
    let mut docs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(id) = doc_id(&path) else {
            continue;
        };
        let parsed = fs::read_to_string(&path)
            .map_err(RemoteError::from)
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(RemoteError::from));
        match parsed {
            Ok(Value::Object(body)) => docs.push(Document {
                id: id.to_string(),
                body,
            }),
            Ok(_) => warn!(path = %path.display(), "document is not a JSON object"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not read document"),
        }
    }
    docs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Snapshot { docs })
}

impl RemoteStore for DirStore {
    fn subscribe(&mut self) -> Result<Subscription, RemoteError> {
        let (tx, rx) = mpsc::channel();
        tx.send(read_snapshot(&self.dir))
            .map_err(|_| RemoteError::Closed)?;

        let dir = self.dir.clone();
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        let _ = tx.send(Err(e.into()));
                        return;
                    }
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                if !event.paths.iter().any(|p| doc_id(p).is_some()) {
                    return;
                }
                debug!(paths = ?event.paths, "collection changed");
                let _ = tx.send(read_snapshot(&dir));
            },
            Config::default(),
        )?;
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;
        self.watchers.push(watcher);
        Ok(Subscription::new(rx))
    }

    fn upsert(&mut self, id: &str, body: &Map<String, Value>) -> Result<(), RemoteError> {
        let path = self.path_for(id)?;
        let json = serde_json::to_vec_pretty(&stamped(body))?;
        atomic_write(&path, &json)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), RemoteError> {
        match fs::remove_file(self.path_for(id)?) {
            Ok(()) => Ok(()),
            // Deleting a missing document is not an error
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
