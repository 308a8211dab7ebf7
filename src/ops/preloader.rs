use crate::types::asset::{Asset, AssetKey};
use crate::types::media::{AudioHandle, VideoSurface};

/// Requests decodable data for every track and the video once per asset.
#[derive(Debug, Default)]
pub struct MediaPreloader {
    primed: Option<AssetKey>,
}

impl MediaPreloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all media of `asset` without starting playback. Returns false when
    /// this asset has already been primed.
    pub fn prime<A: AudioHandle, V: VideoSurface>(
        &mut self,
        asset: &mut Asset<A>,
        video: &mut V,
    ) -> bool {
        if self.primed == Some(asset.key) {
            log::debug!("Asset {:?} already preloaded", asset.key);
            return false;
        }
        for track in asset.bus.iter_mut() {
            track.load();
        }
        video.load();
        self.primed = Some(asset.key);
        log::info!(
            "Preloading {} audio tracks and video for project {}",
            asset.track_count(),
            asset.project_id
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::registry::TrackRegistry;
    use crate::renderer::fake::{FakeFactory, FakeVideo, MediaCall, journal};
    use crate::services::dubbing::DubbingUrls;
    use crate::types::project::{ProjectMetadata, ProjectStatus};

    #[test]
    fn test_primes_every_track_and_video_once() {
        let log = journal();
        let factory = FakeFactory::new(log.clone());
        let meta = ProjectMetadata {
            id: "p1".into(),
            status: ProjectStatus::Dubbed,
            target_languages: vec!["fr".into(), "es".into()],
        };
        let mut asset = TrackRegistry::new("en")
            .resolve(Some(&meta), &DubbingUrls::new("http://dub"), &factory)
            .unwrap();
        let mut video = FakeVideo::new(log.clone());
        let mut preloader = MediaPreloader::new();

        assert!(preloader.prime(&mut asset, &mut video));
        assert!(!preloader.prime(&mut asset, &mut video));
        assert_eq!(preloader.primed, Some(asset.key));

        assert!(asset.bus.iter().all(|t| t.handle().unwrap().loads == 1));
        let video_loads = log
            .borrow()
            .iter()
            .filter(|c| **c == MediaCall::VideoLoad)
            .count();
        assert_eq!(video_loads, 1);
        // Loading never starts playback.
        assert_eq!(asset.bus.audible_count(), 0);
    }
}
