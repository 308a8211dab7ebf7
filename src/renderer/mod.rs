pub mod gst_audio;
pub mod gst_video;

#[cfg(test)]
pub mod fake;

use crate::error::MediaResult;
use crate::types::media::MediaFactory;

use gst_audio::GstAudioTrack;

/// Builds GStreamer-backed audio tracks.
#[derive(Debug, Default, Clone, Copy)]
pub struct GstMediaFactory;

impl MediaFactory for GstMediaFactory {
    type Audio = GstAudioTrack;

    fn audio(&self, uri: &str) -> MediaResult<GstAudioTrack> {
        GstAudioTrack::new(uri)
    }
}
