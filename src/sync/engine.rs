//! Two-way synchronization between the reducer state and a remote store.
//!
//! Inbound snapshots replace the trips map wholesale. Outbound, after every
//! local dispatch, trips are diffed against the last synced map and only the
//! ones that changed are written. The state produced by applying a snapshot
//! is never written back: the engine is in [`SyncMode::ApplyingRemote`] for
//! exactly that one transition. Between issuing writes and the next snapshot
//! it is in [`SyncMode::WritingLocal`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::model::new_id;
use crate::model::profile::{Profile, ProfileList, ProfilePatch};
use crate::model::state::{AppState, TripMap};
use crate::model::trip::Trip;
use crate::ops::{Action, reduce};

use super::cache::{CacheError, LocalCache, MIGRATED_KEY, PersistedState};
use super::remote::{
    PROFILES_DOC_ID, RemoteError, RemoteStore, Snapshot, Subscription, strip_metadata,
};
use super::seed::example_trip;

/// Receives the dark-mode flag whenever it changes (and once at start).
pub trait ThemePort {
    fn apply_dark_mode(&mut self, dark: bool);
}

/// Where the engine is in the echo-suppression cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncMode {
    #[default]
    Idle,
    /// The current state came from a snapshot and must not be written back.
    ApplyingRemote,
    /// Writes for these ids were accepted by the store and no snapshot has
    /// arrived since. Failed writes are not listed.
    WritingLocal { pending_ids: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Write the example trip when the collection starts out empty
    pub seed_example: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions { seed_example: true }
    }
}

#[derive(Debug, thiserror::Error)]
enum BootstrapError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct SyncEngine<R: RemoteStore, C: LocalCache> {
    remote: R,
    cache: C,
    theme: Option<Box<dyn ThemePort>>,
    options: SyncOptions,
    state: AppState,
    profiles: Vec<Profile>,
    subscription: Option<Subscription>,
    last_synced: TripMap,
    mode: SyncMode,
    loading: bool,
    first_snapshot_seen: bool,
}

impl<R: RemoteStore, C: LocalCache> SyncEngine<R, C> {
    /// Build an engine. The dark-mode preference is restored from the cache;
    /// trips arrive with the first snapshot after [`SyncEngine::start`].
    pub fn new(remote: R, cache: C, options: SyncOptions) -> Self {
        let dark_mode = match PersistedState::load(&cache) {
            Ok(saved) => saved.map(|s| s.dark_mode).unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "could not read cached state");
                false
            }
        };
        SyncEngine {
            remote,
            cache,
            theme: None,
            options,
            state: AppState::with_dark_mode(dark_mode),
            profiles: Vec::new(),
            subscription: None,
            last_synced: TripMap::new(),
            mode: SyncMode::Idle,
            loading: true,
            first_snapshot_seen: false,
        }
    }

    pub fn with_theme(mut self, mut theme: Box<dyn ThemePort>) -> Self {
        theme.apply_dark_mode(self.state.dark_mode);
        self.theme = Some(theme);
        self
    }

    /// Subscribe to the collection. Snapshots are processed by `poll`.
    pub fn start(&mut self) -> Result<(), RemoteError> {
        self.subscription = Some(self.remote.subscribe()?);
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn mode(&self) -> &SyncMode {
        &self.mode
    }

    /// True until the first snapshot is applied or the subscription fails
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Local changes
    // -----------------------------------------------------------------------

    /// Apply an action, then push the resulting trip changes out.
    pub fn dispatch(&mut self, action: Action) {
        let was_dark = self.state.dark_mode;
        self.state = reduce(&self.state, action);
        if self.state.dark_mode != was_dark {
            self.dark_mode_changed();
        }
        self.sync_outbound();
    }

    fn sync_outbound(&mut self) {
        if self.mode == SyncMode::ApplyingRemote {
            self.mode = SyncMode::Idle;
            return;
        }

        let current = self.state.trips.clone();
        let changed: Vec<String> = current
            .iter()
            .filter(|(id, trip)| match self.last_synced.get(id.as_str()) {
                Some(prev) => !Arc::ptr_eq(prev, *trip) && prev != *trip,
                None => true,
            })
            .map(|(id, _)| id.clone())
            .collect();
        let removed: Vec<String> = self
            .last_synced
            .keys()
            .filter(|id| !current.contains_key(id.as_str()))
            .cloned()
            .collect();

        let mut written = Vec::new();
        for id in &changed {
            let result =
                trip_body(&current[id.as_str()]).and_then(|body| self.remote.upsert(id, &body));
            match result {
                Ok(()) => {
                    debug!(id = %id, "wrote trip");
                    written.push(id.clone());
                }
                Err(e) => error!(id = %id, error = %e, "failed to write trip"),
            }
        }
        for id in &removed {
            match self.remote.delete(id) {
                Ok(()) => {
                    debug!(id = %id, "deleted trip");
                    written.push(id.clone());
                }
                Err(e) => error!(id = %id, error = %e, "failed to delete trip"),
            }
        }
        if !written.is_empty() {
            self.mark_pending(written);
        }

        // Recorded even when writes failed
        self.last_synced = current;
    }

    fn mark_pending(&mut self, ids: Vec<String>) {
        match &mut self.mode {
            SyncMode::WritingLocal { pending_ids } => {
                for id in ids {
                    if !pending_ids.contains(&id) {
                        pending_ids.push(id);
                    }
                }
            }
            mode => *mode = SyncMode::WritingLocal { pending_ids: ids },
        }
    }

    // -----------------------------------------------------------------------
    // Remote changes
    // -----------------------------------------------------------------------

    /// Process every queued subscription event without blocking.
    /// Returns the number of snapshots applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let events = match &self.subscription {
                Some(sub) => sub.drain(),
                None => return applied,
            };
            if events.is_empty() {
                return applied;
            }
            for event in events {
                if self.handle_event(event) {
                    applied += 1;
                }
            }
        }
    }

    /// Block until a snapshot has been applied or `timeout` elapses.
    /// Returns whether one was applied.
    pub fn wait_for_snapshot(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.poll() > 0 {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let event = match &self.subscription {
                Some(sub) => sub.next_timeout(remaining),
                None => return false,
            };
            match event {
                Some(event) => {
                    if self.handle_event(event) {
                        // Settle anything the snapshot triggered
                        self.poll();
                        return true;
                    }
                }
                None => return false,
            }
        }
    }

    fn handle_event(&mut self, event: Result<Snapshot, RemoteError>) -> bool {
        match event {
            Ok(snapshot) => self.apply_snapshot(snapshot),
            Err(e) => {
                error!(error = %e, "subscription error");
                self.loading = false;
                false
            }
        }
    }

    /// Returns false when the snapshot was consumed by first-run bootstrap.
    fn apply_snapshot(&mut self, snapshot: Snapshot) -> bool {
        // Judged on raw documents: a trip that fails to decode still counts
        let has_trip_docs = snapshot.docs.iter().any(|doc| doc.id != PROFILES_DOC_ID);
        let mut trips: IndexMap<String, Trip> = IndexMap::new();
        for doc in snapshot.docs {
            let body = Value::Object(strip_metadata(doc.body));
            if doc.id == PROFILES_DOC_ID {
                match serde_json::from_value::<ProfileList>(body) {
                    Ok(list) => self.profiles = list.profiles,
                    Err(e) => warn!(error = %e, "skipping undecodable profile list"),
                }
                continue;
            }
            match serde_json::from_value::<Trip>(body) {
                Ok(mut trip) => {
                    if trip.id.is_empty() {
                        trip.id = doc.id.clone();
                    }
                    trips.insert(doc.id, trip);
                }
                Err(e) => warn!(id = %doc.id, error = %e, "skipping undecodable trip document"),
            }
        }

        if !self.first_snapshot_seen {
            self.first_snapshot_seen = true;
            if !has_trip_docs && self.bootstrap_empty_collection() {
                // The writes produce the next snapshot
                return false;
            }
        }

        let count = trips.len();
        self.mode = SyncMode::ApplyingRemote;
        self.state = reduce(&self.state, Action::SetTripsFromRemote(trips));
        self.last_synced = self.state.trips.clone();
        self.loading = false;
        self.persist_trips();
        info!(trips = count, "applied remote snapshot");

        self.sync_outbound();
        true
    }

    /// Fill an empty collection: migrate cached trips, or else seed the
    /// example trip. Returns true when something was written.
    fn bootstrap_empty_collection(&mut self) -> bool {
        match self.migrate_from_cache() {
            Ok(0) => {}
            Ok(n) => {
                info!(trips = n, "migrated cached trips to remote store");
                return true;
            }
            Err(e) => warn!(error = %e, "migration failed"),
        }

        if !self.options.seed_example {
            return false;
        }
        let trip = example_trip();
        match trip_body(&trip).and_then(|body| self.remote.upsert(&trip.id, &body)) {
            Ok(()) => {
                info!(id = %trip.id, "seeded example trip");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to seed example trip");
                false
            }
        }
    }

    /// Push cached trips to the remote store once. Returns how many were
    /// written; the marker is only set when all writes succeeded.
    fn migrate_from_cache(&mut self) -> Result<usize, BootstrapError> {
        if self.cache.get(MIGRATED_KEY)?.is_some() {
            return Ok(0);
        }
        let Some(saved) = PersistedState::load(&self.cache)? else {
            return Ok(0);
        };
        if saved.trips.is_empty() {
            return Ok(0);
        }

        for (id, trip) in &saved.trips {
            let body = match serde_json::to_value(trip)? {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            self.remote.upsert(id, &body)?;
        }
        self.cache.set(MIGRATED_KEY, "true")?;
        Ok(saved.trips.len())
    }

    // -----------------------------------------------------------------------
    // Cache and theme
    // -----------------------------------------------------------------------

    fn persisted(&self) -> PersistedState {
        PersistedState {
            trips: self.state.trips_snapshot(),
            active_trip_id: self.state.active_trip_id.clone(),
            dark_mode: self.state.dark_mode,
        }
    }

    /// Mirror remote trips into the cache. Best effort.
    fn persist_trips(&mut self) {
        let saved = self.persisted();
        if let Err(e) = saved.save(&mut self.cache) {
            warn!(error = %e, "could not cache trips");
            return;
        }
        // Cached trips now mirror the remote; never migrate them back.
        if let Err(e) = self.cache.set(MIGRATED_KEY, "true") {
            debug!(error = %e, "could not set migration marker");
        }
    }

    fn dark_mode_changed(&mut self) {
        let dark = self.state.dark_mode;
        if let Some(theme) = self.theme.as_mut() {
            theme.apply_dark_mode(dark);
        }
        let mut saved = match PersistedState::load(&self.cache) {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "replacing unreadable cached state");
                PersistedState::default()
            }
        };
        saved.dark_mode = dark;
        if let Err(e) = saved.save(&mut self.cache) {
            warn!(error = %e, "could not persist dark mode");
        }
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    /// Add a traveler profile and write the list. Returns the new id.
    pub fn add_profile(&mut self, name: &str, photo: Option<String>) -> Result<String, RemoteError> {
        let id = new_id();
        self.profiles.push(Profile {
            id: id.clone(),
            name: name.trim().to_string(),
            photo,
        });
        self.write_profiles()?;
        Ok(id)
    }

    pub fn update_profile(&mut self, id: &str, patch: &ProfilePatch) -> Result<(), RemoteError> {
        let Some(profile) = self.profiles.iter_mut().find(|p| p.id == id) else {
            return Err(RemoteError::Rejected {
                id: id.to_string(),
                reason: "no such profile".to_string(),
            });
        };
        patch.apply(profile);
        self.write_profiles()
    }

    /// Remove a profile. Trips that list it in `traveler_ids` are left as-is.
    pub fn delete_profile(&mut self, id: &str) -> Result<(), RemoteError> {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        if self.profiles.len() == before {
            return Err(RemoteError::Rejected {
                id: id.to_string(),
                reason: "no such profile".to_string(),
            });
        }
        self.write_profiles()
    }

    fn write_profiles(&mut self) -> Result<(), RemoteError> {
        let list = ProfileList {
            profiles: self.profiles.clone(),
        };
        let body = match serde_json::to_value(&list)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.remote.upsert(PROFILES_DOC_ID, &body).inspect_err(|e| {
            error!(error = %e, "failed to write profiles");
        })
    }
}

fn trip_body(trip: &Trip) -> Result<Map<String, Value>, RemoteError> {
    match serde_json::to_value(trip)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::cache::{DATA_KEY, MemoryCache};
    use crate::sync::memory::{MemoryStore, StoreOp};
    use crate::sync::seed::EXAMPLE_TRIP_ID;
    use std::sync::Mutex;

    fn engine_with(store: &MemoryStore) -> SyncEngine<MemoryStore, MemoryCache> {
        let mut engine = SyncEngine::new(store.clone(), MemoryCache::new(), SyncOptions::default());
        engine.start().unwrap();
        engine
    }

    #[test]
    fn empty_collection_is_seeded_then_applied() {
        let store = MemoryStore::new();
        let mut engine = engine_with(&store);
        assert!(engine.is_loading());

        engine.poll();
        assert_eq!(store.ops(), vec![StoreOp::Upsert(EXAMPLE_TRIP_ID.into())]);
        assert!(!engine.is_loading());
        assert_eq!(
            engine.state().active_trip_id.as_deref(),
            Some(EXAMPLE_TRIP_ID)
        );
        // Applying the seeded snapshot must not echo it back
        assert_eq!(store.ops().len(), 1);
    }

    #[test]
    fn seeding_can_be_disabled() {
        let store = MemoryStore::new();
        let mut engine = SyncEngine::new(
            store.clone(),
            MemoryCache::new(),
            SyncOptions {
                seed_example: false,
            },
        );
        engine.start().unwrap();
        engine.poll();
        assert!(store.ops().is_empty());
        assert!(engine.state().trips.is_empty());
        assert!(!engine.is_loading());
    }

    #[test]
    fn cached_trips_are_migrated_once() {
        let store = MemoryStore::new();
        let mut cache = MemoryCache::new();
        let mut saved = PersistedState::default();
        saved.trips.insert("old".into(), Trip::new("old", "Old trip"));
        saved.save(&mut cache).unwrap();

        let mut engine = SyncEngine::new(store.clone(), cache, SyncOptions::default());
        engine.start().unwrap();
        engine.poll();

        assert_eq!(store.ops(), vec![StoreOp::Upsert("old".into())]);
        assert_eq!(engine.state().trips["old"].name, "Old trip");
        assert!(engine.cache().get(MIGRATED_KEY).unwrap().is_some());
    }

    #[test]
    fn metadata_and_profiles_are_routed() {
        let mut store = MemoryStore::new();
        let trip = Trip::new("t1", "Japan");
        store.upsert("t1", &trip_body(&trip).unwrap()).unwrap();
        let profiles = serde_json::json!({"profiles": [{"id": "p1", "name": "Ana"}]});
        if let Value::Object(body) = profiles {
            store.upsert(PROFILES_DOC_ID, &body).unwrap();
        }
        store.clear_ops();

        let mut engine = engine_with(&store);
        engine.poll();
        assert_eq!(engine.state().trips.len(), 1);
        assert_eq!(*engine.state().trips["t1"], trip);
        assert_eq!(engine.profiles()[0].name, "Ana");
        assert!(store.ops().is_empty());
    }

    #[test]
    fn undecodable_documents_are_skipped() {
        let mut store = MemoryStore::new();
        store
            .upsert("good", &trip_body(&Trip::new("good", "Good")).unwrap())
            .unwrap();
        if let Value::Object(body) = serde_json::json!({"itinerary": "not a list"}) {
            store.upsert("bad", &body).unwrap();
        }

        let mut engine = engine_with(&store);
        engine.poll();
        assert_eq!(
            engine.state().trips.keys().collect::<Vec<_>>(),
            vec!["good"]
        );
    }

    #[test]
    fn undecodable_trips_do_not_count_as_empty() {
        let mut store = MemoryStore::new();
        if let Value::Object(body) = serde_json::json!({"id": "t1", "todos": "not a list"}) {
            store.upsert("t1", &body).unwrap();
        }
        store.clear_ops();

        let mut engine = engine_with(&store);
        engine.poll();
        assert!(store.ops().is_empty());
        assert!(engine.state().trips.is_empty());
        assert!(!engine.is_loading());
    }

    #[test]
    fn string_priorities_decode_without_seeding() {
        let mut store = MemoryStore::new();
        let doc = serde_json::json!({
            "id": "t1",
            "name": "Seoul",
            "todos": [{"id": "td1", "text": "eSIM", "priority": "high", "dueDate": ""}],
        });
        if let Value::Object(body) = doc {
            store.upsert("t1", &body).unwrap();
        }
        store.clear_ops();

        let mut engine = engine_with(&store);
        engine.poll();
        assert!(store.ops().is_empty());
        assert_eq!(engine.state().trips.keys().collect::<Vec<_>>(), vec!["t1"]);
        assert!(engine.state().trips["t1"].todos[0].priority.is_high());
    }

    #[test]
    fn profiles_alone_count_as_empty() {
        let mut store = MemoryStore::new();
        if let Value::Object(body) = serde_json::json!({"profiles": []}) {
            store.upsert(PROFILES_DOC_ID, &body).unwrap();
        }
        store.clear_ops();

        let mut engine = engine_with(&store);
        engine.poll();
        assert_eq!(store.ops(), vec![StoreOp::Upsert(EXAMPLE_TRIP_ID.into())]);
    }

    #[test]
    fn unknown_fields_survive_a_local_edit() {
        let mut store = MemoryStore::new();
        let doc = serde_json::json!({
            "id": "t1",
            "name": "Lisbon",
            "heroImage": "lisbon.jpg",
            "bookings": [{"id": "b1", "name": "Hotel", "currency": "EUR"}],
        });
        if let Value::Object(body) = doc {
            store.upsert("t1", &body).unwrap();
        }
        store.clear_ops();

        let mut engine = engine_with(&store);
        engine.poll();
        engine.dispatch(Action::UpdateNotes("Pastel de nata".into()));

        let written = store.doc("t1").unwrap();
        assert_eq!(written["heroImage"], "lisbon.jpg");
        assert_eq!(written["bookings"][0]["currency"], "EUR");
        assert_eq!(written["notes"], "Pastel de nata");
    }

    #[test]
    fn writes_stay_pending_until_the_next_snapshot() {
        let mut store = MemoryStore::new();
        store
            .upsert("a", &trip_body(&Trip::new("a", "A")).unwrap())
            .unwrap();
        let mut engine = engine_with(&store);
        engine.poll();

        engine.dispatch(Action::UpdateNotes("first".into()));
        engine.dispatch(Action::AddTrip(Box::new(Trip::new("b", "B"))));
        assert_eq!(
            *engine.mode(),
            SyncMode::WritingLocal {
                pending_ids: vec!["a".into(), "b".into()]
            }
        );

        engine.poll();
        assert_eq!(*engine.mode(), SyncMode::Idle);
    }

    #[test]
    fn failed_writes_are_not_pending() {
        let mut store = MemoryStore::new();
        store
            .upsert("a", &trip_body(&Trip::new("a", "A")).unwrap())
            .unwrap();
        let mut engine = engine_with(&store);
        engine.poll();

        store.set_fail_writes(true);
        engine.dispatch(Action::UpdateNotes("lost".into()));
        assert_eq!(*engine.mode(), SyncMode::Idle);
    }

    #[test]
    fn subscription_error_clears_loading() {
        let store = MemoryStore::new();
        let mut engine = engine_with(&store);
        assert!(engine.is_loading());
        let applied = engine.handle_event(Err(RemoteError::Closed));
        assert!(!applied);
        assert!(!engine.is_loading());
        assert!(engine.state().trips.is_empty());
    }

    #[test]
    fn mode_returns_to_idle_after_remote_apply() {
        let store = MemoryStore::new();
        let mut engine = engine_with(&store);
        engine.poll();
        assert_eq!(*engine.mode(), SyncMode::Idle);
    }

    struct RecordingTheme(Arc<Mutex<Vec<bool>>>);

    impl ThemePort for RecordingTheme {
        fn apply_dark_mode(&mut self, dark: bool) {
            self.0.lock().unwrap().push(dark);
        }
    }

    #[test]
    fn dark_mode_is_persisted_and_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = MemoryStore::new();
        let mut engine = SyncEngine::new(store.clone(), MemoryCache::new(), SyncOptions::default())
            .with_theme(Box::new(RecordingTheme(Arc::clone(&seen))));

        engine.dispatch(Action::ToggleDarkMode);
        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
        let raw = engine.cache().get(DATA_KEY).unwrap().unwrap();
        assert!(raw.contains("\"darkMode\":true"));

        // A new engine on the same cache starts dark
        let cache = engine.cache().clone();
        let restored = SyncEngine::new(store, cache, SyncOptions::default());
        assert!(restored.state().dark_mode);
    }

    #[test]
    fn profile_operations_write_the_whole_list() {
        let store = MemoryStore::new();
        let mut engine = engine_with(&store);
        engine.poll();
        store.clear_ops();

        let ana = engine.add_profile("  Ana ", None).unwrap();
        engine.add_profile("Ben", None).unwrap();
        engine
            .update_profile(
                &ana,
                &ProfilePatch {
                    name: Some("Ana M.".into()),
                    photo: None,
                },
            )
            .unwrap();
        engine.delete_profile(&ana).unwrap();

        assert_eq!(store.ops().len(), 4);
        let doc = store.doc(PROFILES_DOC_ID).unwrap();
        let list: ProfileList =
            serde_json::from_value(Value::Object(strip_metadata(doc))).unwrap();
        assert_eq!(list.profiles.len(), 1);
        assert_eq!(list.profiles[0].name, "Ben");
        assert!(engine.delete_profile(&ana).is_err());
    }
}
