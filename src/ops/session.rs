use crate::error::SyncResult;
use crate::ops::registry::TrackRegistry;
use crate::ops::selector_bridge::{self, TrackOption, TrackSelection};
use crate::ops::synchronizer::{PlaybackSynchronizer, StartOutcome};
use crate::services::dubbing::DubbingUrls;
use crate::services::metadata_poller::MetadataUpdate;
use crate::types::media::{MediaFactory, VideoSurface};
use crate::types::project::{ProjectMetadata, ProjectStatus};

/// What the watch page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellStatus {
    /// No asset yet.
    Loading,
    /// The service is still dubbing the project.
    Processing,
    Ready,
    Failed(String),
}

/// Glue between metadata updates, the registry, and the synchronizer for
/// one watch page.
pub struct WatchSession<F: MediaFactory, V: VideoSurface> {
    factory: F,
    urls: DubbingUrls,
    registry: TrackRegistry,
    metadata: Option<ProjectMetadata>,
    fetch_error: Option<String>,
    preferred_language: Option<String>,
    sync: PlaybackSynchronizer<V, F::Audio>,
}

impl<F: MediaFactory, V: VideoSurface> WatchSession<F, V> {
    pub fn new(factory: F, urls: DubbingUrls, registry: TrackRegistry, video: V) -> Self {
        Self {
            factory,
            urls,
            registry,
            metadata: None,
            fetch_error: None,
            preferred_language: None,
            sync: PlaybackSynchronizer::new(video),
        }
    }

    /// Select `language` whenever a new asset is attached.
    pub fn with_preferred_language(mut self, language: Option<String>) -> Self {
        self.preferred_language = language;
        self
    }

    /// Apply a metadata update. Returns true when a new asset was attached.
    pub fn apply_update(&mut self, update: MetadataUpdate) -> bool {
        match update {
            MetadataUpdate::Fetched(metadata) => {
                self.fetch_error = None;
                let needs_asset = metadata.status.is_ready()
                    && self
                        .sync
                        .asset()
                        .is_none_or(|asset| asset.project_id != metadata.id);
                self.metadata = Some(metadata);
                if !needs_asset {
                    return false;
                }
                match self
                    .registry
                    .resolve(self.metadata.as_ref(), &self.urls, &self.factory)
                {
                    Some(asset) => {
                        self.sync.attach(asset);
                        self.apply_preferred_language();
                        true
                    }
                    None => false,
                }
            }
            MetadataUpdate::Failed(reason) => {
                self.fetch_error = Some(reason);
                false
            }
        }
    }

    fn apply_preferred_language(&mut self) {
        let Some(language) = self.preferred_language.as_deref() else {
            return;
        };
        match selector_bridge::select_language(&mut self.sync, language) {
            Ok(index) => log::info!("Selected {} audio (track {})", language, index),
            Err(err) => log::warn!("Keeping original audio: {}", err),
        }
    }

    pub fn status(&self) -> ShellStatus {
        if self.sync.asset().is_some() {
            return ShellStatus::Ready;
        }
        match (&self.metadata, &self.fetch_error) {
            (Some(meta), _) if meta.status == ProjectStatus::Dubbing => ShellStatus::Processing,
            (_, Some(reason)) => ShellStatus::Failed(reason.clone()),
            _ => ShellStatus::Loading,
        }
    }

    pub fn sync(&self) -> &PlaybackSynchronizer<V, F::Audio> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut PlaybackSynchronizer<V, F::Audio> {
        &mut self.sync
    }

    /// The play button: start on whichever track is currently selected.
    pub fn play(&mut self) -> SyncResult<StartOutcome> {
        let index = self.sync.active_track();
        self.sync.start(index)
    }

    pub fn select(&mut self, selection: &TrackSelection) -> SyncResult<()> {
        selector_bridge::select(&mut self.sync, selection)
    }

    pub fn track_options(&self) -> Vec<TrackOption> {
        selector_bridge::track_options(&self.sync)
    }
}
