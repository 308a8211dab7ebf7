use crate::error::{SyncError, SyncResult};
use crate::ops::synchronizer::PlaybackSynchronizer;
use crate::types::media::{AudioHandle, VideoSurface};

/// A language picked in the selector, as the selector saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSelection {
    pub index: usize,
    pub language: String,
}

/// What the selector needs to draw one language entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOption {
    pub selection: TrackSelection,
    pub available: bool,
    pub active: bool,
}

/// Selector entries for the synchronizer's current asset.
pub fn track_options<V: VideoSurface, A: AudioHandle>(
    sync: &PlaybackSynchronizer<V, A>,
) -> Vec<TrackOption> {
    let Some(asset) = sync.asset() else {
        return Vec::new();
    };
    asset
        .bus
        .iter()
        .enumerate()
        .map(|(index, track)| TrackOption {
            selection: TrackSelection {
                index,
                language: track.language.clone(),
            },
            available: track.readiness().failure().is_none(),
            active: index == sync.active_track(),
        })
        .collect()
}

/// Forward a selection to `switch_track`, checking it against the asset as
/// it is now. A selection made against a replaced asset is rejected.
pub fn select<V: VideoSurface, A: AudioHandle>(
    sync: &mut PlaybackSynchronizer<V, A>,
    selection: &TrackSelection,
) -> SyncResult<()> {
    let asset = sync.asset().ok_or(SyncError::NotReady)?;
    let track = asset.bus.get(selection.index).ok_or(SyncError::InvalidTrack {
        index: selection.index,
        len: asset.track_count(),
    })?;
    if track.language != selection.language {
        return Err(SyncError::StaleSelection {
            index: selection.index,
            language: selection.language.clone(),
        });
    }
    sync.switch_track(selection.index)
}

/// Switch by language code. Returns the index that became active.
pub fn select_language<V: VideoSurface, A: AudioHandle>(
    sync: &mut PlaybackSynchronizer<V, A>,
    language: &str,
) -> SyncResult<usize> {
    let asset = sync.asset().ok_or(SyncError::NotReady)?;
    let index = asset
        .bus
        .index_of(language)
        .ok_or_else(|| SyncError::UnknownLanguage(language.to_string()))?;
    sync.switch_track(index)?;
    Ok(index)
}
