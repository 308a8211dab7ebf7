//! Error types for playback, media backends and the dubbing service

use thiserror::Error;

use crate::types::playback_state::TransportPhase;

/// Errors returned by transport operations on the synchronizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// No asset is attached yet
    #[error("No asset loaded")]
    NotReady,

    /// Track index outside the asset's track list
    #[error("Track index {index} out of range (asset has {len} tracks)")]
    InvalidTrack { index: usize, len: usize },

    /// Operation not allowed from the current transport phase
    #[error("Cannot {op} while {phase:?}")]
    InvalidTransition {
        op: &'static str,
        phase: TransportPhase,
    },

    /// The video source failed to load
    #[error("Media unavailable: {0}")]
    ResourceUnavailable(String),

    /// The requested audio track failed to load
    #[error("Audio track {index} unavailable: {reason}")]
    TrackUnavailable { index: usize, reason: String },

    /// A selection made against an older asset snapshot
    #[error("Stale selection: track {index} is no longer '{language}'")]
    StaleSelection { index: usize, language: String },

    /// No track of the current asset has this language code
    #[error("No audio track for language '{0}'")]
    UnknownLanguage(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised by a media backend while building or driving handles
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to build pipeline for {uri}: {reason}")]
    Pipeline { uri: String, reason: String },

    #[error("State change failed for {uri}: {reason}")]
    StateChange { uri: String, reason: String },
}

pub type MediaResult<T> = Result<T, MediaError>;

/// Errors fetching project metadata
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Project '{0}' not found")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid project metadata: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether polling again could produce a different answer
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Http(_) | ServiceError::Io(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
