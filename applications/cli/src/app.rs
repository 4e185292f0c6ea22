//! Queue session wiring for the command line
//!
//! Each invocation opens the database, restores the persisted queue (paused)
//! and applies one command. `shell` keeps a single session alive across many
//! commands so pause and resume mean something.

use crate::cli::{sort_spec, BuilderCommand, PlaylistCommand, QueueCommand, ShellLine, SmartCommand};
use crate::config::CliConfig;
use crate::error::Result;
use clap::Parser;
use soul_core::storage::TrackMetadataStore;
use soul_core::types::{TrackId, TrackRecord};
use soul_queue::{Advance, QueueConfig, QueuePhase, QueueSession, QueueView, StatePersister};
use soul_storage::smart_playlists::SmartRule;
use soul_storage::{builder_sessions, playlists, smart_playlists, tracks, LocalStorageContext};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub struct App {
    storage: Arc<LocalStorageContext>,
    session: Arc<QueueSession>,
}

impl App {
    /// Open the configured database and build a session over it
    pub async fn open(config: &CliConfig) -> Result<Self> {
        let pool = soul_storage::create_pool(&config.storage.database_url).await?;
        soul_storage::run_migrations(&pool).await?;
        Ok(Self::new(LocalStorageContext::new(pool), config.queue.clone()))
    }

    pub fn new(storage: LocalStorageContext, queue_config: QueueConfig) -> Self {
        let storage = Arc::new(storage);
        let session = Arc::new(QueueSession::new(
            storage.clone(),
            StatePersister::new(storage.clone()),
            queue_config,
        ));
        Self { storage, session }
    }

    pub fn storage(&self) -> &LocalStorageContext {
        &self.storage
    }

    pub fn session(&self) -> &Arc<QueueSession> {
        &self.session
    }

    /// Restore the persisted queue, if any
    pub async fn restore(&self) -> Result<Option<String>> {
        let Some(restored) = self.session.restore().await? else {
            return Ok(None);
        };

        let current = restored
            .view
            .current
            .as_ref()
            .and_then(|id| restored.tracks.iter().find(|t| &t.id == id))
            .map_or_else(|| "end of queue".to_string(), describe);

        Ok(Some(format!(
            "Restored {} at {} (paused)",
            context_label(&restored.view),
            current
        )))
    }

    /// Apply one queue command and describe the outcome
    pub async fn run(&self, command: QueueCommand) -> Result<String> {
        match command {
            QueueCommand::Play(args) => {
                let context = args.context();
                let view = self.session.play(context.clone()).await?;
                if view.phase == QueuePhase::Exhausted {
                    return Ok(format!("Nothing to play in {}", context));
                }
                Ok(format!(
                    "Playing {} ({}), {} tracks queued\n{}",
                    context,
                    order_label(&view),
                    view.track_ids.len(),
                    self.now_playing(&view).await?
                ))
            }
            QueueCommand::Next => match self.session.advance().await? {
                Advance::Track(id) => Ok(format!("Now playing {}", self.describe_id(&id).await?)),
                Advance::Exhausted => Ok("End of queue".to_string()),
            },
            QueueCommand::Shuffle => {
                let view = self.session.toggle_shuffle().await?;
                Ok(format!("Queue is now {}", order_label(&view)))
            }
            QueueCommand::Sort { field, desc } => {
                let view = self.session.set_sort(sort_spec(&field, desc)).await?;
                Ok(format!("Queue is now {}", order_label(&view)))
            }
            QueueCommand::Pause => {
                self.session.pause()?;
                Ok("Paused".to_string())
            }
            QueueCommand::Resume => {
                self.session.resume()?;
                Ok("Playing".to_string())
            }
            QueueCommand::Status { limit } => {
                let view = self.session.view()?;
                self.render(&view, limit).await
            }
        }
    }

    /// Run queue commands read line by line until `quit` or end of input
    pub async fn run_shell<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            if matches!(words[0], "quit" | "exit") {
                break;
            }

            let reply = match ShellLine::try_parse_from(words.iter().copied()) {
                Ok(parsed) => match self.run(parsed.command).await {
                    Ok(reply) => reply,
                    Err(e) => format!("error: {}", e),
                },
                Err(e) => e.to_string().trim_end().to_string(),
            };

            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        output.flush().await?;
        Ok(())
    }

    /// Import track records from a JSON file
    pub async fn import(&self, path: &Path) -> Result<usize> {
        let json = tokio::fs::read_to_string(path).await?;
        let records: Vec<TrackRecord> = serde_json::from_str(&json)?;
        let imported = tracks::upsert_many(self.storage.pool(), &records).await?;
        tracing::info!("Imported {} tracks from {}", imported, path.display());
        Ok(imported)
    }

    pub async fn playlist(&self, command: PlaylistCommand) -> Result<String> {
        let pool = self.storage.pool();
        match command {
            PlaylistCommand::Create { id, name, tracks } => {
                playlists::create(pool, &id, &name).await?;
                let added = playlists::add_tracks(pool, &id, &to_ids(tracks)).await?;
                Ok(format!("Created playlist {} with {} tracks", id, added))
            }
            PlaylistCommand::Add { id, tracks } => {
                let added = playlists::add_tracks(pool, &id, &to_ids(tracks)).await?;
                Ok(format!("Added {} tracks to {}", added, id))
            }
            PlaylistCommand::Delete { id } => Ok(if playlists::delete(pool, &id).await? {
                format!("Deleted playlist {}", id)
            } else {
                format!("No playlist {}", id)
            }),
            PlaylistCommand::List => {
                let all = playlists::get_all(pool).await?;
                Ok(all
                    .iter()
                    .map(|p| format!("{}  {} ({} tracks)", p.id, p.name, p.track_count))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    pub async fn smart(&self, command: SmartCommand) -> Result<String> {
        let pool = self.storage.pool();
        match command {
            SmartCommand::Create { id, name, rules } => {
                let rules = rules
                    .iter()
                    .map(|rule| SmartRule::parse(rule))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let playlist = smart_playlists::create(pool, &id, &name, rules).await?;
                let matched = smart_playlists::resolve(pool, &id).await?;
                Ok(format!(
                    "Created smart playlist {} ({} rules, {} tracks match)",
                    playlist.id,
                    playlist.rules.len(),
                    matched.len()
                ))
            }
            SmartCommand::Delete { id } => Ok(if smart_playlists::delete(pool, &id).await? {
                format!("Deleted smart playlist {}", id)
            } else {
                format!("No smart playlist {}", id)
            }),
        }
    }

    pub async fn builder(&self, command: BuilderCommand) -> Result<String> {
        let pool = self.storage.pool();
        match command {
            BuilderCommand::Create { name } => {
                let session = builder_sessions::create(pool, &name).await?;
                Ok(session.id)
            }
            BuilderCommand::Add { session, tracks } => {
                let mut added = 0;
                for id in to_ids(tracks) {
                    if builder_sessions::add_track(pool, &session, &id).await? {
                        added += 1;
                    }
                }
                Ok(format!("Added {} tracks to builder session {}", added, session))
            }
            BuilderCommand::Delete { session } => {
                Ok(if builder_sessions::delete(pool, &session).await? {
                    format!("Discarded builder session {}", session)
                } else {
                    format!("No builder session {}", session)
                })
            }
        }
    }

    async fn now_playing(&self, view: &QueueView) -> Result<String> {
        match &view.current {
            Some(id) => Ok(format!("Now playing {}", self.describe_id(id).await?)),
            None => Ok("End of queue".to_string()),
        }
    }

    async fn describe_id(&self, id: &TrackId) -> Result<String> {
        let records = self
            .storage
            .fetch_metadata(std::slice::from_ref(id), true)
            .await?;
        Ok(records.first().map_or_else(|| id.to_string(), describe))
    }

    async fn render(&self, view: &QueueView, limit: usize) -> Result<String> {
        if view.context.is_none() {
            return Ok("No queue".to_string());
        }

        let state = match view.phase {
            QueuePhase::Playing => "playing",
            QueuePhase::Exhausted => "finished",
            _ => "paused",
        };
        let mut lines = vec![format!(
            "{} - {} - {}",
            context_label(view),
            order_label(view),
            state
        )];
        if view.phase == QueuePhase::Exhausted {
            lines.push(format!("Played all {} queued tracks", view.track_ids.len()));
            return Ok(lines.join("\n"));
        }
        lines.push(format!(
            "Track {} of {}",
            view.cursor + 1,
            view.track_ids.len()
        ));

        let shown: Vec<TrackId> = view.upcoming().iter().take(limit.max(1)).cloned().collect();
        let metadata: HashMap<TrackId, TrackRecord> = self
            .storage
            .fetch_metadata(&shown, false)
            .await?
            .into_iter()
            .map(|track| (track.id.clone(), track))
            .collect();

        for (offset, id) in shown.iter().enumerate() {
            let marker = if offset == 0 { ">" } else { " " };
            let label = metadata.get(id).map_or_else(|| id.to_string(), describe);
            lines.push(format!("{} {:>4}. {}", marker, view.cursor + offset + 1, label));
        }

        Ok(lines.join("\n"))
    }
}

fn to_ids(ids: Vec<String>) -> Vec<TrackId> {
    ids.into_iter().map(TrackId::new).collect()
}

fn describe(track: &TrackRecord) -> String {
    match (&track.title, &track.artist) {
        (Some(title), Some(artist)) => format!("{} - {}", title, artist),
        (Some(title), None) => title.clone(),
        _ => track.id.to_string(),
    }
}

fn context_label(view: &QueueView) -> String {
    view.context
        .as_ref()
        .map_or_else(|| "no context".to_string(), ToString::to_string)
}

fn order_label(view: &QueueView) -> String {
    view.order
        .as_ref()
        .map_or_else(|| "no order".to_string(), ToString::to_string)
}

