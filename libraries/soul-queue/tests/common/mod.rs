//! Shared fixtures for soul-queue integration tests
//!
//! `InMemoryLibrary` stands in for the SQLite-backed store. Playlists are
//! mutable so tests can simulate deletions and smart-playlist drift between
//! calls.

#![allow(dead_code)]

use async_trait::async_trait;
use soul_core::storage::{QueueStateStore, TrackMetadataStore};
use soul_core::types::{PlaybackContext, TrackId, TrackRecord};
use soul_core::{Result, SoulError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryLibrary {
    records: Mutex<HashMap<TrackId, TrackRecord>>,
    contexts: Mutex<HashMap<String, Vec<TrackId>>>,
    resolve_calls: AtomicUsize,
    fail_resolve: AtomicBool,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tracks` under the context id `context_id`
    pub fn add_context(&self, context_id: &str, tracks: Vec<TrackRecord>) {
        let ids = tracks.iter().map(|t| t.id.clone()).collect();
        let mut records = self.records.lock().unwrap();
        for track in tracks {
            records.insert(track.id.clone(), track);
        }
        self.contexts
            .lock()
            .unwrap()
            .insert(context_id.to_string(), ids);
    }

    pub fn remove_context(&self, context_id: &str) {
        self.contexts.lock().unwrap().remove(context_id);
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_resolve(&self, fail: bool) {
        self.fail_resolve.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrackMetadataStore for InMemoryLibrary {
    async fn resolve_context(&self, context: &PlaybackContext) -> Result<HashSet<TrackId>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(SoulError::storage("library unavailable"));
        }
        Ok(self
            .contexts
            .lock()
            .unwrap()
            .get(&context.id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_metadata(
        &self,
        ids: &[TrackId],
        _preserve_order: bool,
    ) -> Result<Vec<TrackRecord>> {
        let records = self.records.lock().unwrap();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }
}

/// Queue state store backed by a map
#[derive(Default)]
pub struct MemoryStateStore {
    rows: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, session_key: &str) -> Option<String> {
        self.rows.lock().unwrap().get(session_key).cloned()
    }

    pub fn put_raw(&self, session_key: &str, json: &str) {
        self.rows
            .lock()
            .unwrap()
            .insert(session_key.to_string(), json.to_string());
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueStateStore for MemoryStateStore {
    async fn write_queue_state(&self, session_key: &str, snapshot_json: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.put_raw(session_key, snapshot_json);
        Ok(())
    }

    async fn read_queue_state(&self, session_key: &str) -> Result<Option<String>> {
        Ok(self.raw(session_key))
    }
}

/// Tracks `t001..=tNNN` with track numbers `1..=n`
pub fn numbered_tracks(n: usize) -> Vec<TrackRecord> {
    (1..=n)
        .map(|i| TrackRecord {
            track_number: Some(i as i32),
            ..TrackRecord::new(track_id(i))
        })
        .collect()
}

pub fn track_id(i: usize) -> TrackId {
    TrackId::new(format!("t{:03}", i))
}

pub fn assert_unique(ids: &[TrackId]) {
    let unique: HashSet<&TrackId> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {:?}", ids);
}
