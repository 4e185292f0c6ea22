//! Command-line definitions

use clap::{ArgGroup, Args, Parser, Subcommand};
use soul_core::types::{PlaybackContext, SortDirection, SortField, SortSpec};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "soul-queue")]
#[command(about = "Rolling-window playback queue for Soul Player", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Queue(QueueCommand),

    /// Import tracks from a JSON array of track records
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },

    /// Manage playlists
    #[command(subcommand)]
    Playlist(PlaylistCommand),

    /// Manage smart playlists
    #[command(subcommand)]
    Smart(SmartCommand),

    /// Manage playlist builder sessions
    #[command(subcommand)]
    Builder(BuilderCommand),

    /// Read queue commands from stdin, one per line
    Shell,
}

/// Commands that act on the queue session
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum QueueCommand {
    /// Start playing a playlist, smart playlist or builder session
    Play(PlayArgs),

    /// Skip to the next track
    Next,

    /// Toggle between shuffle and sorted order
    Shuffle,

    /// Sort the upcoming tracks
    Sort {
        /// title, artist, album, year, bpm, key, elo_rating or track_number
        field: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Pause playback
    Pause,

    /// Resume playback
    Resume,

    /// Show the current and upcoming tracks
    Status {
        /// Number of upcoming tracks to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Args)]
#[command(group(
    ArgGroup::new("context")
        .required(true)
        .args(["playlist", "smart", "builder"])
))]
pub struct PlayArgs {
    /// Playlist id
    #[arg(long)]
    pub playlist: Option<String>,

    /// Smart playlist id
    #[arg(long)]
    pub smart: Option<String>,

    /// Builder session id
    #[arg(long)]
    pub builder: Option<String>,

    /// Shuffle instead of sorting
    #[arg(long, conflicts_with = "sort")]
    pub shuffle: bool,

    /// Sort field (defaults to track_number)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl PlayArgs {
    pub fn context(&self) -> PlaybackContext {
        let context = match (&self.playlist, &self.smart, &self.builder) {
            (Some(id), _, _) => PlaybackContext::playlist(id.clone()),
            (None, Some(id), _) => PlaybackContext::smart_playlist(id.clone()),
            (None, None, Some(id)) => PlaybackContext::builder_session(id.clone()),
            // clap enforces one of the three
            (None, None, None) => PlaybackContext::playlist(""),
        };

        match &self.sort {
            Some(field) => context.sorted_by(sort_spec(field, self.desc)),
            None if self.shuffle => context.shuffled(),
            None => context,
        }
    }
}

/// Build a sort spec; unknown fields fall back to track number
pub fn sort_spec(field: &str, desc: bool) -> SortSpec {
    let direction = if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    SortSpec::new(SortField::from_str_or_default(field), direction)
}

#[derive(Debug, Subcommand)]
pub enum PlaylistCommand {
    /// Create a playlist, optionally with tracks
    Create {
        id: String,
        name: String,
        /// Track ids, in order
        tracks: Vec<String>,
    },
    /// Append tracks to a playlist
    Add { id: String, tracks: Vec<String> },
    /// Delete a playlist
    Delete { id: String },
    /// List playlists
    List,
}

#[derive(Debug, Subcommand)]
pub enum SmartCommand {
    /// Create a smart playlist from rules such as `bpm>=120` or `artist~daft`
    Create {
        id: String,
        name: String,
        #[arg(short, long = "rule")]
        rules: Vec<String>,
    },
    /// Delete a smart playlist
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum BuilderCommand {
    /// Start a builder session and print its id
    Create { name: String },
    /// Add tracks to a builder session
    Add { session: String, tracks: Vec<String> },
    /// Discard a builder session
    Delete { session: String },
}

/// One line of `shell` input
#[derive(Debug, Parser)]
#[command(name = "soul-queue", no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: QueueCommand,
}
