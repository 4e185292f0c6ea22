//! Soul Queue Core
//!
//! Platform-agnostic types, collaborator traits and error handling shared by the
//! queue engine and its storage backends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlaybackContext`, `SortSpec`, `TrackRecord`, `QueueSnapshot`
//! - **Collaborator Traits**: `TrackMetadataStore`, `QueueStateStore`
//! - **Error Handling**: Unified `SoulError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use soul_core::types::{PlaybackContext, SortField, SortSpec};
//!
//! // Play a playlist sorted by tempo
//! let context = PlaybackContext::playlist("road-trip").sorted_by(SortSpec::asc(SortField::Bpm));
//! assert!(context.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SoulError};
pub use storage::{QueueStateStore, TrackMetadataStore, DEFAULT_SESSION_KEY};

pub use types::{
    ContextKind, PlaybackContext, QueueMode, QueueSnapshot, SortDirection, SortField, SortKey,
    SortSpec, TrackId, TrackRecord,
};
