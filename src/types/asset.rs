use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::media::{AudioHandle, Readiness};

static NEXT_ASSET_KEY: AtomicU64 = AtomicU64::new(1);

/// Distinguishes one resolved asset from any other, including a rebuild of
/// the same project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetKey(pub u64);

impl AssetKey {
    /// A key no other asset in this process has.
    pub fn next() -> Self {
        AssetKey(NEXT_ASSET_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// A language code paired with the handle that plays it.
#[derive(Debug)]
pub struct AudioTrack<A> {
    pub language: String,
    pub source: String,
    handle: Option<A>,
    readiness: Readiness,
}

impl<A: AudioHandle> AudioTrack<A> {
    pub fn new(language: impl Into<String>, handle: A) -> Self {
        Self {
            language: language.into(),
            source: handle.source().to_string(),
            handle: Some(handle),
            readiness: Readiness::Pending,
        }
    }

    /// A track whose handle could not be built. It stays listed so the
    /// selector can show it as disabled.
    pub fn unavailable(
        language: impl Into<String>,
        source: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            source: source.into(),
            handle: None,
            readiness: Readiness::Failed(reason.into()),
        }
    }

    pub fn handle(&self) -> Option<&A> {
        self.handle.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn handle_mut(&mut self) -> Option<&mut A> {
        self.handle.as_mut()
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub(crate) fn set_readiness(&mut self, readiness: Readiness) {
        self.readiness = readiness;
    }

    pub fn is_audible(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_playing())
    }

    pub(crate) fn load(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.load();
        }
    }

    /// Seek to `position` and play.
    pub(crate) fn start_at(&mut self, position: f64) {
        if let Some(handle) = self.handle.as_mut() {
            handle.seek(position);
            handle.play();
        }
    }

    pub(crate) fn poll_load(&mut self) -> Option<Readiness> {
        self.handle.as_mut().and_then(|h| h.poll_load())
    }
}

/// Owns every audio handle of an asset. All audio stop/pause goes through here.
#[derive(Debug)]
pub struct AudioBus<A> {
    tracks: Vec<AudioTrack<A>>,
}

impl<A: AudioHandle> AudioBus<A> {
    pub fn new(tracks: Vec<AudioTrack<A>>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&AudioTrack<A>> {
        self.tracks.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut AudioTrack<A>> {
        self.tracks.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AudioTrack<A>> {
        self.tracks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AudioTrack<A>> {
        self.tracks.iter_mut()
    }

    pub fn languages(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.language.as_str()).collect()
    }

    pub fn index_of(&self, language: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.language == language)
    }

    pub fn audible_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_audible()).count()
    }

    pub fn stop_all(&mut self) {
        for handle in self.tracks.iter_mut().filter_map(|t| t.handle.as_mut()) {
            handle.stop();
        }
    }

    pub fn pause_all(&mut self) {
        for handle in self.tracks.iter_mut().filter_map(|t| t.handle.as_mut()) {
            if handle.is_playing() {
                handle.pause();
            }
        }
    }

    /// Stop every handle and free its resources.
    pub fn release_all(&mut self) {
        for handle in self.tracks.iter_mut().filter_map(|t| t.handle.as_mut()) {
            handle.stop();
            handle.unload();
        }
    }
}

/// One dubbing project: a video stream plus its language tracks.
/// Track 0 is always the original-language track.
#[derive(Debug)]
pub struct Asset<A> {
    pub key: AssetKey,
    pub project_id: String,
    pub video_source: String,
    pub bus: AudioBus<A>,
}

impl<A: AudioHandle> Asset<A> {
    pub fn new(
        key: AssetKey,
        project_id: impl Into<String>,
        video_source: impl Into<String>,
        bus: AudioBus<A>,
    ) -> Self {
        Self {
            key,
            project_id: project_id.into(),
            video_source: video_source.into(),
            bus,
        }
    }

    pub fn track_count(&self) -> usize {
        self.bus.len()
    }
}
