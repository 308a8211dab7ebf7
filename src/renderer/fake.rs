//! In-memory media handles that record every call, for driving the
//! synchronizer in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{MediaError, MediaResult};
use crate::types::media::{
    AudioHandle, MediaFactory, PlayTicket, Readiness, VideoEvent, VideoSurface,
};

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    VideoSource(String),
    VideoLoad,
    VideoPlay(PlayTicket),
    VideoPause,
    VideoReload,
    AudioLoad(String),
    AudioPlay(String),
    AudioPause(String),
    AudioStop(String),
    AudioSeek(String, f64),
    AudioUnload(String),
}

pub type Journal = Rc<RefCell<Vec<MediaCall>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug)]
pub struct FakeVideo {
    journal: Journal,
    pub time: f64,
    pub events: VecDeque<VideoEvent>,
}

impl FakeVideo {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            time: 0.0,
            events: VecDeque::new(),
        }
    }
}

impl VideoSurface for FakeVideo {
    fn set_source(&mut self, uri: &str) {
        self.journal
            .borrow_mut()
            .push(MediaCall::VideoSource(uri.to_string()));
    }

    fn load(&mut self) {
        self.journal.borrow_mut().push(MediaCall::VideoLoad);
    }

    fn request_play(&mut self, ticket: PlayTicket) {
        self.journal.borrow_mut().push(MediaCall::VideoPlay(ticket));
    }

    fn pause(&mut self) {
        self.journal.borrow_mut().push(MediaCall::VideoPause);
    }

    fn reload(&mut self) {
        self.time = 0.0;
        self.journal.borrow_mut().push(MediaCall::VideoReload);
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn poll_event(&mut self) -> Option<VideoEvent> {
        self.events.pop_front()
    }
}

#[derive(Debug)]
pub struct FakeAudio {
    uri: String,
    journal: Journal,
    pub playing: bool,
    pub position: f64,
    pub loads: u32,
    pub pending_load: Option<Readiness>,
}

impl AudioHandle for FakeAudio {
    fn source(&self) -> &str {
        &self.uri
    }

    fn load(&mut self) {
        self.loads += 1;
        self.journal
            .borrow_mut()
            .push(MediaCall::AudioLoad(self.uri.clone()));
    }

    fn play(&mut self) {
        self.playing = true;
        self.journal
            .borrow_mut()
            .push(MediaCall::AudioPlay(self.uri.clone()));
    }

    fn pause(&mut self) {
        self.playing = false;
        self.journal
            .borrow_mut()
            .push(MediaCall::AudioPause(self.uri.clone()));
    }

    fn stop(&mut self) {
        self.playing = false;
        self.position = 0.0;
        self.journal
            .borrow_mut()
            .push(MediaCall::AudioStop(self.uri.clone()));
    }

    fn seek(&mut self, position: f64) {
        self.position = position;
        self.journal
            .borrow_mut()
            .push(MediaCall::AudioSeek(self.uri.clone(), position));
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn unload(&mut self) {
        self.playing = false;
        self.journal
            .borrow_mut()
            .push(MediaCall::AudioUnload(self.uri.clone()));
    }

    fn poll_load(&mut self) -> Option<Readiness> {
        self.pending_load.take()
    }
}

/// Builds `FakeAudio` handles; URIs listed in `broken` fail construction.
#[derive(Debug)]
pub struct FakeFactory {
    pub journal: Journal,
    pub broken: Vec<String>,
}

impl FakeFactory {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            broken: Vec::new(),
        }
    }
}

impl MediaFactory for FakeFactory {
    type Audio = FakeAudio;

    fn audio(&self, uri: &str) -> MediaResult<FakeAudio> {
        if self.broken.iter().any(|b| b == uri) {
            return Err(MediaError::Pipeline {
                uri: uri.to_string(),
                reason: "no decoder".to_string(),
            });
        }
        Ok(FakeAudio {
            uri: uri.to_string(),
            journal: self.journal.clone(),
            playing: false,
            position: 0.0,
            loads: 0,
            pending_load: None,
        })
    }
}
