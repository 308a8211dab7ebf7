use std::collections::VecDeque;

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use gstreamer_video::VideoFrameExt;

use crate::error::{MediaError, MediaResult};
use crate::types::media::{PlayTicket, VideoEvent, VideoSurface};

#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>, // Tightly packed RGBA
    pub width: u32,
    pub height: u32,
    pub timestamp: f64, // Time in seconds
}

struct VideoPipeline {
    playbin: gst::Element,
    frames: gst_app::AppSink,
    bus: gst::Bus,
}

/// Bus messages the surface reacts to.
#[derive(Debug, Clone, PartialEq)]
enum BusSignal {
    Prerolled,
    Playing,
    Error(String),
}

/// Turns bus signals into `VideoEvent`s for the current source.
#[derive(Debug, Default)]
struct PlayTracker {
    load_reported: bool,
    pending_play: Option<PlayTicket>,
    events: VecDeque<VideoEvent>,
}

impl PlayTracker {
    fn observe(&mut self, signal: BusSignal) {
        match signal {
            BusSignal::Prerolled if !self.load_reported => {
                self.load_reported = true;
                self.events.push_back(VideoEvent::Loaded);
            }
            BusSignal::Prerolled => {}
            BusSignal::Playing => {
                if let Some(ticket) = self.pending_play.take() {
                    self.events.push_back(VideoEvent::PlayStarted(ticket));
                }
            }
            BusSignal::Error(reason) => {
                if let Some(ticket) = self.pending_play.take() {
                    self.events
                        .push_back(VideoEvent::PlayRejected { ticket, reason });
                } else if !self.load_reported {
                    self.load_failed(reason);
                } else {
                    self.events.push_back(VideoEvent::PlaybackError(reason));
                }
            }
        }
    }

    fn load_failed(&mut self, reason: String) {
        if !self.load_reported {
            self.load_reported = true;
            self.events.push_back(VideoEvent::LoadFailed(reason));
        }
    }

    /// Settle `leftover` against whatever was pending, then wait for `ticket`.
    fn request(&mut self, ticket: PlayTicket, leftover: Vec<BusSignal>) {
        self.cancel(leftover);
        self.pending_play = Some(ticket);
    }

    /// Settle `leftover` against the pending request, then drop it. A
    /// confirmation still queued on the bus can't match a later ticket.
    fn cancel(&mut self, leftover: Vec<BusSignal>) {
        for signal in leftover {
            self.observe(signal);
        }
        self.pending_play = None;
    }

    fn new_source(&mut self) {
        self.load_reported = false;
        self.pending_play = None;
    }
}

/// The project stream played through `playbin` with its own audio muted.
/// Frames are scaled to the preview size and pulled from an appsink.
pub struct GstVideoSurface {
    pipeline: Option<VideoPipeline>,
    uri: String,
    width: u32,
    height: u32,
    tracker: PlayTracker,
    frame: Option<VideoFrame>,
}

impl GstVideoSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pipeline: None,
            uri: String::new(),
            width,
            height,
            tracker: PlayTracker::default(),
            frame: None,
        }
    }

    fn build_pipeline(&self, uri: &str) -> MediaResult<VideoPipeline> {
        let pipeline_error = |reason: String| MediaError::Pipeline {
            uri: uri.to_string(),
            reason,
        };
        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", uri)
            .property("mute", true)
            .build()
            .map_err(|e| pipeline_error(e.to_string()))?;

        let sink_desc = format!(
            "videoconvert ! videoscale ! video/x-raw,format=RGBA,width={},height={} ! \
             appsink name=frames max-buffers=1 drop=true",
            self.width, self.height
        );
        let sink_bin = gst::parse::bin_from_description(&sink_desc, true)
            .map_err(|e| pipeline_error(e.to_string()))?;
        let frames = sink_bin
            .by_name("frames")
            .and_then(|e| e.downcast::<gst_app::AppSink>().ok())
            .ok_or_else(|| pipeline_error("appsink missing from sink bin".to_string()))?;
        playbin.set_property("video-sink", &sink_bin);

        let bus = playbin
            .bus()
            .ok_or_else(|| pipeline_error("pipeline has no bus".to_string()))?;
        Ok(VideoPipeline {
            playbin,
            frames,
            bus,
        })
    }

    fn set_state(&self, state: gst::State) -> MediaResult<()> {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return Err(MediaError::StateChange {
                uri: self.uri.clone(),
                reason: "no pipeline".to_string(),
            });
        };
        pipeline
            .playbin
            .set_state(state)
            .map(|_| ())
            .map_err(|e| MediaError::StateChange {
                uri: self.uri.clone(),
                reason: e.to_string(),
            })
    }

    fn teardown(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            let _ = pipeline.playbin.set_state(gst::State::Null);
        }
        self.frame = None;
        self.tracker.new_source();
    }

    /// Pop every queued bus message and keep the ones that matter.
    fn pop_signals(&self) -> Vec<BusSignal> {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return Vec::new();
        };
        let mut signals = Vec::new();
        while let Some(msg) = pipeline.bus.pop() {
            use gst::MessageView;
            match msg.view() {
                MessageView::AsyncDone(_) => signals.push(BusSignal::Prerolled),
                MessageView::StateChanged(change)
                    if change.current() == gst::State::Playing
                        && msg.src() == Some(pipeline.playbin.upcast_ref::<gst::Object>()) =>
                {
                    signals.push(BusSignal::Playing);
                }
                MessageView::Error(err) => {
                    let reason = err.error().to_string();
                    log::warn!("Video pipeline error on {}: {}", self.uri, reason);
                    signals.push(BusSignal::Error(reason));
                }
                _ => {}
            }
        }
        signals
    }

    fn drain_bus(&mut self) {
        for signal in self.pop_signals() {
            self.tracker.observe(signal);
        }
    }

    /// Latest decoded frame, falling back to the prerolled one while paused.
    pub fn pull_frame(&mut self) -> Option<&VideoFrame> {
        if let Some(pipeline) = self.pipeline.as_ref() {
            let sample = pipeline
                .frames
                .try_pull_sample(gst::ClockTime::ZERO)
                .or_else(|| {
                    if self.frame.is_none() {
                        pipeline.frames.try_pull_preroll(gst::ClockTime::ZERO)
                    } else {
                        None
                    }
                });
            if let Some(frame) = sample.as_ref().and_then(sample_to_frame) {
                self.frame = Some(frame);
            }
        }
        self.frame.as_ref()
    }
}

fn sample_to_frame(sample: &gst::Sample) -> Option<VideoFrame> {
    let buffer = sample.buffer()?;
    let info = gst_video::VideoInfo::from_caps(sample.caps()?).ok()?;
    let frame = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &info).ok()?;
    let width = frame.width();
    let height = frame.height();
    let stride = frame.plane_stride()[0] as usize;
    let plane = frame.plane_data(0).ok()?;

    let row_len = width as usize * 4;
    let mut data = Vec::with_capacity(row_len * height as usize);
    for row in plane.chunks(stride).take(height as usize) {
        data.extend_from_slice(&row[..row_len.min(row.len())]);
    }
    let timestamp = buffer
        .pts()
        .map(|pts| pts.nseconds() as f64 / 1_000_000_000.0)
        .unwrap_or(0.0);

    Some(VideoFrame {
        data,
        width,
        height,
        timestamp,
    })
}

impl VideoSurface for GstVideoSurface {
    fn set_source(&mut self, uri: &str) {
        self.teardown();
        self.uri = uri.to_string();
        match self.build_pipeline(uri) {
            Ok(pipeline) => self.pipeline = Some(pipeline),
            Err(err) => {
                log::warn!("{}", err);
                self.tracker.load_failed(err.to_string());
            }
        }
    }

    fn load(&mut self) {
        if self.pipeline.is_none() {
            return;
        }
        if let Err(err) = self.set_state(gst::State::Paused) {
            self.tracker.load_failed(err.to_string());
        }
    }

    fn request_play(&mut self, ticket: PlayTicket) {
        let leftover = self.pop_signals();
        self.tracker.request(ticket, leftover);
        if let Err(err) = self.set_state(gst::State::Playing) {
            self.tracker.observe(BusSignal::Error(err.to_string()));
        }
    }

    fn pause(&mut self) {
        let leftover = self.pop_signals();
        self.tracker.cancel(leftover);
        if let Err(err) = self.set_state(gst::State::Paused) {
            log::debug!("Video pause: {}", err);
        }
    }

    fn reload(&mut self) {
        let leftover = self.pop_signals();
        self.tracker.cancel(leftover);
        self.frame = None;
        // READY drops buffers and rewinds; PAUSED prerolls the first frame again.
        let rewound = self
            .set_state(gst::State::Ready)
            .and_then(|_| self.set_state(gst::State::Paused));
        if let Err(err) = rewound {
            log::warn!("Video reload failed: {}", err);
        }
    }

    fn current_time(&self) -> f64 {
        self.pipeline
            .as_ref()
            .and_then(|p| p.playbin.query_position::<gst::ClockTime>())
            .map(|pos| pos.nseconds() as f64 / 1_000_000_000.0)
            .unwrap_or(0.0)
    }

    fn poll_event(&mut self) -> Option<VideoEvent> {
        self.drain_bus();
        self.tracker.events.pop_front()
    }
}

impl Drop for GstVideoSurface {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(tracker: &mut PlayTracker) -> Vec<VideoEvent> {
        tracker.events.drain(..).collect()
    }

    #[test]
    fn test_cancelled_request_does_not_confirm_next_ticket() {
        let mut tracker = PlayTracker::default();
        tracker.observe(BusSignal::Prerolled);
        tracker.request(PlayTicket(1), Vec::new());
        // Confirmation of the first request arrives while pausing.
        tracker.cancel(vec![BusSignal::Playing]);
        // A second Playing change still queued when the next play is requested.
        tracker.request(PlayTicket(2), vec![BusSignal::Playing]);

        assert_eq!(
            events(&mut tracker),
            vec![VideoEvent::Loaded, VideoEvent::PlayStarted(PlayTicket(1))]
        );
        assert_eq!(tracker.pending_play, Some(PlayTicket(2)));

        tracker.observe(BusSignal::Playing);
        assert_eq!(
            events(&mut tracker),
            vec![VideoEvent::PlayStarted(PlayTicket(2))]
        );
    }

    #[test]
    fn test_errors_are_classified_by_stage() {
        let mut tracker = PlayTracker::default();
        tracker.observe(BusSignal::Error("no such file".into()));
        assert_eq!(
            events(&mut tracker),
            vec![VideoEvent::LoadFailed("no such file".into())]
        );

        tracker.new_source();
        tracker.observe(BusSignal::Prerolled);
        tracker.request(PlayTicket(4), Vec::new());
        tracker.observe(BusSignal::Error("not allowed".into()));
        tracker.observe(BusSignal::Error("decoder crashed".into()));
        assert_eq!(
            events(&mut tracker),
            vec![
                VideoEvent::Loaded,
                VideoEvent::PlayRejected {
                    ticket: PlayTicket(4),
                    reason: "not allowed".into(),
                },
                VideoEvent::PlaybackError("decoder crashed".into()),
            ]
        );
    }

    #[test]
    fn test_preroll_after_reload_is_not_reported_twice() {
        let mut tracker = PlayTracker::default();
        tracker.observe(BusSignal::Prerolled);
        tracker.cancel(vec![BusSignal::Prerolled]);
        assert_eq!(events(&mut tracker), vec![VideoEvent::Loaded]);
    }
}
