//! Soul Queue command-line front end
//!
//! Thin wiring over [`soul_queue::QueueSession`] backed by the SQLite store
//! in `soul-storage`.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;

pub use app::App;
pub use cli::{Cli, Commands, QueueCommand};
pub use config::CliConfig;
pub use error::{CliError, Result};
