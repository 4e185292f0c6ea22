//! Queue session - lookahead refill controller
//!
//! Owns the one mutable queue of a listening session and serializes every
//! mutation through a single lock:
//!
//! ```text
//! Empty ──play──▶ Playing ◀──resume/pause──▶ Initialized ◀──restore── Empty
//!                   │  ▲                          │
//!        set_order  ▼  │                          │ advance past end
//!               Rebuilding                        ▼
//!                   │                         Exhausted
//!                   └──────── advance past end ──▲
//! ```
//!
//! Resolver and metadata I/O always runs with the lock released. After the
//! I/O the lock is taken again and the pure step (build, pick, rebuild) is
//! applied to whatever the state is *now*; an epoch counter detects a context
//! that was replaced in the meantime. Snapshots are saved after the lock is
//! released and a failed save never undoes a committed transition.

use crate::error::{QueueError, Result};
use crate::events::QueueEvent;
use crate::persist::StatePersister;
use crate::queue::Queue;
use crate::rebuild::rebuild_window;
use crate::resolver::resolve_candidates;
use crate::sampler::pick_after;
use crate::types::{Advance, QueueConfig, QueueOrder, QueuePhase};
use crate::window::build_queue;
use serde::Serialize;
use soul_core::storage::TrackMetadataStore;
use soul_core::types::{PlaybackContext, QueueSnapshot, SortSpec, TrackId, TrackRecord};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Read-only view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub phase: QueuePhase,
    pub context: Option<PlaybackContext>,
    pub order: Option<QueueOrder>,
    pub track_ids: Vec<TrackId>,
    pub cursor: usize,
    pub current: Option<TrackId>,
    pub is_playing: bool,
}

impl QueueView {
    /// Tracks from the cursor to the end, current track included
    pub fn upcoming(&self) -> &[TrackId] {
        let start = self.cursor.min(self.track_ids.len());
        &self.track_ids[start..]
    }
}

/// Result of restoring a persisted queue
#[derive(Debug, Clone)]
pub struct RestoredQueue {
    pub view: QueueView,

    /// Metadata for the restored ids, in queue order
    ///
    /// Tracks deleted since the snapshot was written are missing here.
    pub tracks: Vec<TrackRecord>,
}

struct SessionState {
    queue: Option<Queue>,
    phase: QueuePhase,
    /// Playback flag; never persisted, so a restore always starts paused
    playback_active: bool,
    /// Bumped whenever a new context replaces the queue
    epoch: u64,
    /// Bumped on every queue mutation; orders snapshot saves
    revision: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            queue: None,
            phase: QueuePhase::Empty,
            playback_active: false,
            epoch: 0,
            revision: 0,
        }
    }

    /// Phase implied by the queue and the playback flag
    fn settled_phase(&self) -> QueuePhase {
        match &self.queue {
            None => QueuePhase::Empty,
            Some(queue) if queue.is_exhausted() => QueuePhase::Exhausted,
            Some(_) if self.playback_active => QueuePhase::Playing,
            Some(_) => QueuePhase::Initialized,
        }
    }

    fn enter(&mut self, phase: QueuePhase, events: &broadcast::Sender<QueueEvent>) {
        if self.phase == phase {
            return;
        }
        tracing::debug!("Queue phase {:?} -> {:?}", self.phase, phase);
        let _ = events.send(QueueEvent::PhaseChanged {
            from: self.phase,
            to: phase,
        });
        self.phase = phase;
    }

    fn settle(&mut self, events: &broadcast::Sender<QueueEvent>) {
        let phase = self.settled_phase();
        self.enter(phase, events);
    }

    /// Record a mutation and capture the snapshot to persist
    fn commit(&mut self) -> Option<(u64, QueueSnapshot)> {
        let snapshot = self.queue.as_ref()?.to_snapshot();
        self.revision += 1;
        Some((self.revision, snapshot))
    }

    fn view(&self) -> QueueView {
        match &self.queue {
            Some(queue) => QueueView {
                phase: self.phase,
                context: Some(queue.context().clone()),
                order: Some(queue.order()),
                track_ids: queue.track_ids().to_vec(),
                cursor: queue.cursor(),
                current: queue.current().cloned(),
                is_playing: self.phase == QueuePhase::Playing,
            },
            None => QueueView {
                phase: self.phase,
                context: None,
                order: None,
                track_ids: Vec::new(),
                cursor: 0,
                current: None,
                is_playing: false,
            },
        }
    }
}

/// What a refill needs to know after the lock is released
struct RefillRequest {
    epoch: u64,
    context: PlaybackContext,
    order: QueueOrder,
}

/// Owned queue state for one listening session
///
/// Share it as `Arc<QueueSession>`; every method takes `&self`.
pub struct QueueSession {
    library: Arc<dyn TrackMetadataStore>,
    persister: StatePersister,
    config: QueueConfig,
    state: Mutex<SessionState>,
    events: broadcast::Sender<QueueEvent>,
}

impl QueueSession {
    /// Create a session with no queue (`Empty`)
    pub fn new(
        library: Arc<dyn TrackMetadataStore>,
        persister: StatePersister,
        config: QueueConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            library,
            persister,
            config,
            state: Mutex::new(SessionState::new()),
            events,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Subscribe to queue events
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    fn state(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|_| QueueError::StatePoisoned)
    }

    fn emit(&self, event: QueueEvent) {
        let _ = self.events.send(event);
    }

    async fn persist(&self, committed: Option<(u64, QueueSnapshot)>) {
        if let Some((revision, snapshot)) = committed {
            self.persister.save_revision(revision, &snapshot).await;
        }
    }

    pub fn phase(&self) -> Result<QueuePhase> {
        Ok(self.state()?.phase)
    }

    pub fn view(&self) -> Result<QueueView> {
        Ok(self.state()?.view())
    }

    pub fn current_track(&self) -> Result<Option<TrackId>> {
        Ok(self
            .state()?
            .queue
            .as_ref()
            .and_then(|queue| queue.current().cloned()))
    }

    /// Start playing `context`, replacing any existing queue
    ///
    /// An empty or deleted context produces an exhausted queue rather than an
    /// error.
    pub async fn play(&self, context: PlaybackContext) -> Result<QueueView> {
        context
            .validate()
            .map_err(|e| QueueError::InvalidContext(e.to_string()))?;

        let order = QueueOrder::for_context(&context);
        let candidates = resolve_candidates(self.library.as_ref(), &context, &order).await?;

        let (view, committed) = {
            let mut guard = self.state()?;
            let state = &mut *guard;
            let mut rng = rand::thread_rng();

            state.queue = Some(build_queue(
                context.clone(),
                candidates,
                self.config.window_size,
                order,
                &mut rng,
            ));
            state.epoch += 1;
            state.playback_active = true;
            state.settle(&self.events);
            (state.view(), state.commit())
        };

        tracing::info!(
            "Started {} ({}) with {} tracks",
            context,
            order,
            view.track_ids.len()
        );
        self.emit(QueueEvent::QueueStarted {
            context,
            tracks: view.track_ids.len(),
        });
        if view.phase == QueuePhase::Exhausted {
            self.emit(QueueEvent::QueueExhausted);
        }
        self.persist(committed).await;
        Ok(view)
    }

    /// Move to the next track (track finished or skipped)
    ///
    /// When fewer than `lookahead_threshold` tracks remain ahead, samples one
    /// more track for the end of the queue. A failed refill is logged; the
    /// advance itself has already been committed.
    pub async fn advance(&self) -> Result<Advance> {
        let (outcome, previous, refill, committed) = {
            let mut guard = self.state()?;
            let state = &mut *guard;
            let epoch = state.epoch;
            let queue = state.queue.as_mut().ok_or(QueueError::NoActiveQueue)?;

            if queue.is_exhausted() {
                return Ok(Advance::Exhausted);
            }

            let previous = queue.current().cloned();
            let outcome = match queue.advance() {
                Some(id) => Advance::Track(id.clone()),
                None => Advance::Exhausted,
            };

            let refill = match outcome {
                Advance::Track(_) if queue.tracks_ahead() < self.config.lookahead_threshold => {
                    Some(RefillRequest {
                        epoch,
                        context: queue.context().clone(),
                        order: queue.order(),
                    })
                }
                _ => None,
            };

            state.settle(&self.events);
            (outcome, previous, refill, state.commit())
        };

        match &outcome {
            Advance::Track(id) => self.emit(QueueEvent::TrackChanged {
                track_id: id.clone(),
                previous_track_id: previous,
            }),
            Advance::Exhausted => {
                tracing::info!("Queue exhausted");
                self.emit(QueueEvent::QueueExhausted);
            }
        }
        self.persist(committed).await;

        if let Some(request) = refill {
            self.refill(request).await;
        }

        Ok(outcome)
    }

    /// Append at most one sampled track
    async fn refill(&self, request: RefillRequest) {
        let candidates =
            match resolve_candidates(self.library.as_ref(), &request.context, &request.order).await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("Skipping queue refill: {}", e);
                    return;
                }
            };

        let (track_id, committed) = {
            let Ok(mut guard) = self.state() else {
                return;
            };
            let state = &mut *guard;
            if state.epoch != request.epoch {
                tracing::debug!("Context replaced before refill completed");
                return;
            }
            let Some(queue) = state.queue.as_mut() else {
                return;
            };
            // An ordering change or a concurrent refill may have landed meanwhile.
            if queue.order() != request.order
                || queue.is_exhausted()
                || queue.tracks_ahead() >= self.config.lookahead_threshold
            {
                return;
            }

            let exclusion: HashSet<TrackId> = queue.unplayed().iter().cloned().collect();
            let fallback_hint = match request.order {
                QueueOrder::Sorted(_) => Some(queue.len()),
                QueueOrder::Shuffle => None,
            };
            let mut rng = rand::thread_rng();
            let Some(track_id) = pick_after(
                candidates,
                &exclusion,
                &request.order,
                queue.track_ids().last(),
                fallback_hint,
                &mut rng,
            ) else {
                tracing::debug!("No candidate left to refill {}", request.context);
                return;
            };

            queue.push(track_id.clone());
            (track_id, state.commit())
        };

        tracing::debug!("Refilled queue with {}", track_id);
        self.emit(QueueEvent::QueueRefilled { track_id });
        self.persist(committed).await;
    }

    /// Switch ordering, regenerating everything after the current track
    ///
    /// An exhausted queue becomes playable again when the context has tracks
    /// that were not already queued.
    pub async fn set_order(&self, order: QueueOrder) -> Result<QueueView> {
        loop {
            let (epoch, context) = {
                let state = self.state()?;
                let queue = state.queue.as_ref().ok_or(QueueError::NoActiveQueue)?;
                (state.epoch, queue.context().clone())
            };

            let candidates = resolve_candidates(self.library.as_ref(), &context, &order).await?;

            let (view, committed) = {
                let mut guard = self.state()?;
                let state = &mut *guard;
                if state.epoch != epoch {
                    tracing::debug!("Context replaced during rebuild, resolving again");
                    continue;
                }

                state.enter(QueuePhase::Rebuilding, &self.events);
                let mut rng = rand::thread_rng();
                let rebuilt = match state.queue.as_ref() {
                    Some(queue) => rebuild_window(
                        queue,
                        candidates,
                        self.config.window_size,
                        order,
                        &mut rng,
                    ),
                    None => return Err(QueueError::NoActiveQueue),
                };
                state.queue = Some(rebuilt);
                state.settle(&self.events);
                (state.view(), state.commit())
            };

            tracing::info!("Queue reordered: {}", order);
            self.emit(QueueEvent::QueueRebuilt {
                order,
                tracks: view.track_ids.len(),
            });
            self.persist(committed).await;
            return Ok(view);
        }
    }

    /// Flip between shuffle and sorted
    ///
    /// Sorted uses the context's requested spec, else track number ascending.
    pub async fn toggle_shuffle(&self) -> Result<QueueView> {
        let next = {
            let state = self.state()?;
            let queue = state.queue.as_ref().ok_or(QueueError::NoActiveQueue)?;
            match queue.order() {
                QueueOrder::Shuffle => {
                    QueueOrder::Sorted(queue.context().sort_spec.unwrap_or_default())
                }
                QueueOrder::Sorted(_) => QueueOrder::Shuffle,
            }
        };
        self.set_order(next).await
    }

    /// Sort the rest of the queue by `spec`
    pub async fn set_sort(&self, spec: SortSpec) -> Result<QueueView> {
        self.set_order(QueueOrder::Sorted(spec)).await
    }

    pub fn pause(&self) -> Result<QueuePhase> {
        self.set_playback_active(false)
    }

    pub fn resume(&self) -> Result<QueuePhase> {
        self.set_playback_active(true)
    }

    fn set_playback_active(&self, active: bool) -> Result<QueuePhase> {
        let mut guard = self.state()?;
        let state = &mut *guard;
        if state.queue.is_none() {
            return Err(QueueError::NoActiveQueue);
        }
        state.playback_active = active;
        state.settle(&self.events);
        Ok(state.phase)
    }

    /// Load the persisted queue at startup
    ///
    /// Only position is restored: the session comes back `Initialized`
    /// (paused) or `Exhausted`, never `Playing`. Metadata for the restored ids
    /// is fetched in queue order for display. Does nothing once a queue exists.
    pub async fn restore(&self) -> Result<Option<RestoredQueue>> {
        if self.state()?.queue.is_some() {
            tracing::debug!("Queue already active, skipping restore");
            return Ok(None);
        }

        let Some(snapshot) = self.persister.load().await else {
            return Ok(None);
        };
        let queue = match Queue::from_snapshot(snapshot) {
            Ok(queue) => queue,
            Err(e) => {
                tracing::warn!("Discarding persisted queue: {}", e);
                return Ok(None);
            }
        };

        let tracks = self.library.fetch_metadata(queue.track_ids(), true).await?;

        let view = {
            let mut guard = self.state()?;
            let state = &mut *guard;
            if state.queue.is_some() {
                tracing::debug!("Queue started while restoring, keeping it");
                return Ok(None);
            }
            state.queue = Some(queue);
            state.epoch += 1;
            state.playback_active = false;
            state.settle(&self.events);
            state.view()
        };

        tracing::info!(
            "Restored {} at position {} of {} (paused)",
            view.context
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
            view.cursor,
            view.track_ids.len()
        );
        self.emit(QueueEvent::QueueRestored {
            cursor: view.cursor,
            tracks: view.track_ids.len(),
        });
        Ok(Some(RestoredQueue { view, tracks }))
    }
}
