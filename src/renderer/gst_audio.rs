use gst::prelude::*;
use gstreamer as gst;

use crate::error::{MediaError, MediaResult};
use crate::types::media::{AudioHandle, Readiness};

/// One language track played through its own `playbin`.
pub struct GstAudioTrack {
    uri: String,
    playbin: gst::Element,
    bus: gst::Bus,
    playing: bool,
    load_reported: bool,
    outcome: Option<Readiness>,
}

impl GstAudioTrack {
    pub fn new(uri: &str) -> MediaResult<Self> {
        let pipeline_error = |reason: String| MediaError::Pipeline {
            uri: uri.to_string(),
            reason,
        };
        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", uri)
            .build()
            .map_err(|e| pipeline_error(e.to_string()))?;
        // Audio-only: discard any video the container carries.
        let video_sink = gst::ElementFactory::make("fakesink")
            .build()
            .map_err(|e| pipeline_error(e.to_string()))?;
        playbin.set_property("video-sink", &video_sink);
        let bus = playbin
            .bus()
            .ok_or_else(|| pipeline_error("pipeline has no bus".to_string()))?;

        Ok(Self {
            uri: uri.to_string(),
            playbin,
            bus,
            playing: false,
            load_reported: false,
            outcome: None,
        })
    }

    fn set_state(&mut self, state: gst::State) -> bool {
        match self.playbin.set_state(state) {
            Ok(_) => true,
            Err(err) => {
                log::warn!("{}: state change to {:?} failed: {}", self.uri, state, err);
                self.report(Readiness::Failed(err.to_string()));
                false
            }
        }
    }

    fn report(&mut self, readiness: Readiness) {
        self.load_reported = true;
        self.outcome = Some(readiness);
    }
}

impl AudioHandle for GstAudioTrack {
    fn source(&self) -> &str {
        &self.uri
    }

    fn load(&mut self) {
        self.set_state(gst::State::Paused);
    }

    fn play(&mut self) {
        self.playing = self.set_state(gst::State::Playing);
    }

    fn pause(&mut self) {
        self.playing = false;
        self.set_state(gst::State::Paused);
    }

    fn stop(&mut self) {
        let was_playing = self.playing;
        self.playing = false;
        if was_playing {
            self.set_state(gst::State::Paused);
        }
        if self.load_reported {
            self.seek(0.0);
        }
    }

    fn seek(&mut self, position: f64) {
        let target = gst::ClockTime::from_nseconds((position.max(0.0) * 1_000_000_000.0) as u64);
        if let Err(err) = self
            .playbin
            .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE, target)
        {
            log::warn!("{}: seek to {:.3}s failed: {}", self.uri, position, err);
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn unload(&mut self) {
        self.playing = false;
        let _ = self.playbin.set_state(gst::State::Null);
    }

    fn poll_load(&mut self) -> Option<Readiness> {
        while let Some(msg) = self.bus.pop() {
            use gst::MessageView;
            match msg.view() {
                MessageView::AsyncDone(_) if !self.load_reported => {
                    log::debug!("Audio prerolled: {}", self.uri);
                    self.report(Readiness::Ready);
                }
                MessageView::Error(err) => {
                    let reason = err.error().to_string();
                    log::warn!("{}: pipeline error: {}", self.uri, reason);
                    self.playing = false;
                    self.report(Readiness::Failed(reason));
                }
                _ => {}
            }
        }
        self.outcome.take()
    }
}

impl Drop for GstAudioTrack {
    fn drop(&mut self) {
        let _ = self.playbin.set_state(gst::State::Null);
    }
}
