use crate::error::MediaResult;

/// Preload outcome of a single media resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Readiness {
    #[default]
    Pending,
    Ready,
    Failed(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Readiness::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Correlates a video play request with its asynchronous outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayTicket(pub u64);

/// Completion events a video surface reports back on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoEvent {
    Loaded,
    LoadFailed(String),
    PlayStarted(PlayTicket),
    PlayRejected { ticket: PlayTicket, reason: String },
    /// The stream broke after it had loaded, outside any play request.
    PlaybackError(String),
}

/// The visual stream. Its position is the only clock audio is aligned to.
pub trait VideoSurface {
    fn set_source(&mut self, uri: &str);
    /// Begin fetching decodable data without starting playback.
    fn load(&mut self);
    /// Ask playback to begin; the outcome arrives later as
    /// `VideoEvent::PlayStarted` or `VideoEvent::PlayRejected` with the same ticket.
    fn request_play(&mut self, ticket: PlayTicket);
    fn pause(&mut self);
    /// Rewind to zero and drop decoded buffers.
    fn reload(&mut self);
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
    fn poll_event(&mut self) -> Option<VideoEvent>;
}

/// One independently seekable, independently playable language track.
pub trait AudioHandle {
    fn source(&self) -> &str;
    fn load(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    /// Halt playback and rewind to zero.
    fn stop(&mut self);
    fn seek(&mut self, position: f64);
    fn is_playing(&self) -> bool;
    /// Stop and free decoder resources.
    fn unload(&mut self);
    /// Returns the load outcome once, when loading has finished, and
    /// `Failed` again whenever the track breaks later on.
    fn poll_load(&mut self) -> Option<Readiness>;
}

/// Builds audio handles bound to a source URL.
pub trait MediaFactory {
    type Audio: AudioHandle;

    fn audio(&self, uri: &str) -> MediaResult<Self::Audio>;
}
