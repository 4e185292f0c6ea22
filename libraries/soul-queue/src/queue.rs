//! Rolling-window queue
//!
//! A queue is an ordered list of track ids plus a cursor:
//!
//! ```text
//!   history        current    unplayed suffix
//! [ t0  t1  t2 ] [   t3   ] [ t4  t5  t6 ... ]
//!                    ^ cursor
//! ```
//!
//! `queue[..=cursor]` is never rewritten except by advancing; ids in
//! `queue[cursor..]` are unique. `cursor == len` means exhausted.

use crate::error::{QueueError, Result};
use crate::types::QueueOrder;
use soul_core::types::{PlaybackContext, QueueSnapshot, TrackId};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Queue {
    context: PlaybackContext,
    track_ids: Vec<TrackId>,
    cursor: usize,
    order: QueueOrder,
}

impl Queue {
    /// Create a queue positioned on its first track
    pub(crate) fn new(context: PlaybackContext, track_ids: Vec<TrackId>, order: QueueOrder) -> Self {
        Self {
            context,
            track_ids,
            cursor: 0,
            order,
        }
    }

    /// Rebuild a queue from its persisted form
    ///
    /// Rejects snapshots whose cursor is out of range or whose unplayed suffix
    /// contains duplicates.
    pub fn from_snapshot(snapshot: QueueSnapshot) -> Result<Self> {
        snapshot
            .context
            .validate()
            .map_err(|e| QueueError::InvalidSnapshot(e.to_string()))?;

        if snapshot.cursor > snapshot.track_ids.len() {
            return Err(QueueError::InvalidSnapshot(format!(
                "cursor {} beyond queue of {} tracks",
                snapshot.cursor,
                snapshot.track_ids.len()
            )));
        }

        let duplicate = {
            let mut seen = HashSet::new();
            snapshot.track_ids[snapshot.cursor..]
                .iter()
                .find(|id| !seen.insert(*id))
                .cloned()
        };
        if let Some(dup) = duplicate {
            return Err(QueueError::InvalidSnapshot(format!(
                "track {} queued twice ahead of the cursor",
                dup
            )));
        }

        Ok(Self {
            order: QueueOrder::from_parts(snapshot.mode, snapshot.sort_spec),
            context: snapshot.context,
            track_ids: snapshot.track_ids,
            cursor: snapshot.cursor,
        })
    }

    /// Persisted form of this queue
    pub fn to_snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            context: self.context.clone(),
            track_ids: self.track_ids.clone(),
            cursor: self.cursor,
            mode: self.order.mode(),
            sort_spec: self.order.sort_spec(),
        }
    }

    pub fn context(&self) -> &PlaybackContext {
        &self.context
    }

    pub fn track_ids(&self) -> &[TrackId] {
        &self.track_ids
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.track_ids.len()
    }

    /// Currently playing track
    pub fn current(&self) -> Option<&TrackId> {
        self.track_ids.get(self.cursor)
    }

    /// History plus the current track (`queue[..=cursor]`)
    ///
    /// The whole queue once exhausted.
    pub fn preserved(&self) -> &[TrackId] {
        let end = (self.cursor + 1).min(self.track_ids.len());
        &self.track_ids[..end]
    }

    /// Current track and everything after it (`queue[cursor..]`)
    pub fn unplayed(&self) -> &[TrackId] {
        let start = self.cursor.min(self.track_ids.len());
        &self.track_ids[start..]
    }

    /// Tracks from the cursor to the end, current track included
    pub fn tracks_ahead(&self) -> usize {
        self.track_ids.len().saturating_sub(self.cursor)
    }

    /// Move the cursor forward by one
    ///
    /// Returns the new current track, or `None` once the queue is exhausted.
    /// Advancing an exhausted queue leaves the cursor at `len`.
    pub fn advance(&mut self) -> Option<&TrackId> {
        if self.cursor < self.track_ids.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Append a track to the unplayed suffix
    ///
    /// Returns `false` (and leaves the queue untouched) when the id is already
    /// queued ahead of the cursor.
    pub(crate) fn push(&mut self, id: TrackId) -> bool {
        if self.unplayed().contains(&id) {
            return false;
        }
        self.track_ids.push(id);
        true
    }

    /// Replace everything after the preserved prefix
    pub(crate) fn replace_future(&mut self, future: Vec<TrackId>, order: QueueOrder) {
        let keep = self.preserved().len();
        self.track_ids.truncate(keep);
        self.track_ids.extend(future);
        self.order = order;
    }
}
