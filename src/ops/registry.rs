use std::collections::HashSet;

use crate::services::dubbing::{DubbingUrls, ORIGINAL_TRACK};
use crate::types::asset::{Asset, AssetKey, AudioBus, AudioTrack};
use crate::types::media::MediaFactory;
use crate::types::project::ProjectMetadata;

/// Turns ready project metadata into an [`Asset`].
///
/// Track 0 is always the original-language track, followed by one track per
/// target language in the order the service lists them.
#[derive(Debug)]
pub struct TrackRegistry {
    original_language: String,
}

impl TrackRegistry {
    pub fn new(original_language: impl Into<String>) -> Self {
        Self {
            original_language: original_language.into(),
        }
    }

    /// Returns `None` while metadata is absent or the project is not dubbed yet.
    pub fn resolve<F: MediaFactory>(
        &self,
        metadata: Option<&ProjectMetadata>,
        urls: &DubbingUrls,
        factory: &F,
    ) -> Option<Asset<F::Audio>> {
        let metadata = metadata?;
        if !metadata.status.is_ready() {
            return None;
        }

        let mut seen = HashSet::new();
        seen.insert(self.original_language.as_str());
        let mut tracks = vec![build_track(
            factory,
            &self.original_language,
            urls.audio_url(&metadata.id, ORIGINAL_TRACK),
        )];
        for language in &metadata.target_languages {
            if !seen.insert(language.as_str()) {
                log::warn!(
                    "Project {} lists language '{}' twice, skipping duplicate",
                    metadata.id,
                    language
                );
                continue;
            }
            tracks.push(build_track(
                factory,
                language,
                urls.audio_url(&metadata.id, language),
            ));
        }

        let asset = Asset::new(
            AssetKey::next(),
            metadata.id.clone(),
            urls.stream_url(&metadata.id),
            AudioBus::new(tracks),
        );
        log::info!(
            "Resolved project {} with tracks {:?}",
            asset.project_id,
            asset.bus.languages()
        );
        Some(asset)
    }
}

fn build_track<F: MediaFactory>(factory: &F, language: &str, uri: String) -> AudioTrack<F::Audio> {
    match factory.audio(&uri) {
        Ok(handle) => AudioTrack::new(language, handle),
        Err(err) => {
            log::warn!("Audio track '{}' unavailable: {}", language, err);
            AudioTrack::unavailable(language, uri, err.to_string())
        }
    }
}
