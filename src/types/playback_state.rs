use crate::types::media::PlayTicket;

/// Where the transport is in its play/pause lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportPhase {
    /// Never started since the asset was attached or last reset.
    Idle,
    /// Start requested while the video or the selected track is still preloading.
    Queued,
    /// Video play requested, waiting for confirmation. `resume` is set when
    /// coming from `Paused`.
    Starting { ticket: PlayTicket, resume: bool },
    Playing,
    Paused,
}

impl TransportPhase {
    /// A start or resume has been asked for but audio has not begun.
    pub fn is_waiting(&self) -> bool {
        matches!(self, TransportPhase::Queued | TransportPhase::Starting { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub active_track: usize,
    pub phase: TransportPhase,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            active_track: 0,
            phase: TransportPhase::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == TransportPhase::Playing
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}
