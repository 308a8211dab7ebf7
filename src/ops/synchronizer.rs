//! Transport state machine keeping one audio track aligned to the video clock.
//!
//! The video position is the only time authority. Audio is aligned to it at
//! start, resume, and track switch; there is no continuous drift correction.
//!
//! Ordering rules:
//! - audio starts only after the video confirms playback
//! - all audio stops before a newly selected track is seeked and started
//! - reset zeroes the active track index last

use crate::error::{SyncError, SyncResult};
use crate::ops::preloader::MediaPreloader;
use crate::types::asset::{Asset, AudioTrack};
use crate::types::media::{AudioHandle, PlayTicket, Readiness, VideoEvent, VideoSurface};
use crate::types::playback_state::{PlaybackState, TransportPhase};

/// Something the viewer should learn about, produced while applying media events.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    PlaybackStarted,
    PlaybackRejected(String),
    VideoUnavailable(String),
    /// The video broke mid-playback; transport is paused.
    PlaybackInterrupted(String),
    TrackUnavailable {
        index: usize,
        language: String,
        reason: String,
    },
    /// The active track failed and playback moved to the original track.
    FellBackToDefault { from: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Video play was requested; audio follows on confirmation.
    Requested,
    /// Media still preloading; play is requested once it is ready.
    Queued,
}

pub struct PlaybackSynchronizer<V: VideoSurface, A: AudioHandle> {
    video: V,
    video_readiness: Readiness,
    asset: Option<Asset<A>>,
    state: PlaybackState,
    preloader: MediaPreloader,
    last_ticket: u64,
}

impl<V: VideoSurface, A: AudioHandle> PlaybackSynchronizer<V, A> {
    pub fn new(video: V) -> Self {
        Self {
            video,
            video_readiness: Readiness::Pending,
            asset: None,
            state: PlaybackState::new(),
            preloader: MediaPreloader::new(),
            last_ticket: 0,
        }
    }

    /// Install a new asset, releasing the previous one, and preload it.
    pub fn attach(&mut self, mut asset: Asset<A>) {
        self.detach();
        log::info!(
            "Attaching project {} ({} tracks)",
            asset.project_id,
            asset.track_count()
        );
        self.video.set_source(&asset.video_source);
        self.preloader.prime(&mut asset, &mut self.video);
        self.asset = Some(asset);
    }

    /// Stop and release everything owned by the current asset.
    pub fn detach(&mut self) {
        if let Some(mut asset) = self.asset.take() {
            log::info!("Releasing project {}", asset.project_id);
            asset.bus.release_all();
            self.video.pause();
        }
        self.video_readiness = Readiness::Pending;
        self.state = PlaybackState::new();
    }

    pub fn asset(&self) -> Option<&Asset<A>> {
        self.asset.as_ref()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> TransportPhase {
        self.state.phase
    }

    pub fn active_track(&self) -> usize {
        self.state.active_track
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Rendering access to the surface. Transport changes go through the
    /// synchronizer, not through this handle.
    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    pub fn video_position(&self) -> f64 {
        self.video.current_time()
    }

    pub fn video_readiness(&self) -> &Readiness {
        &self.video_readiness
    }

    fn require_track(&self, index: usize) -> SyncResult<&AudioTrack<A>> {
        let asset = self.asset.as_ref().ok_or(SyncError::NotReady)?;
        asset.bus.get(index).ok_or(SyncError::InvalidTrack {
            index,
            len: asset.track_count(),
        })
    }

    fn require_available(&self, index: usize) -> SyncResult<()> {
        let track = self.require_track(index)?;
        match track.readiness().failure() {
            Some(reason) => Err(SyncError::TrackUnavailable {
                index,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Begin playback on `index`. Audio starts from zero once the video
    /// confirms it is playing.
    pub fn start(&mut self, index: usize) -> SyncResult<StartOutcome> {
        self.require_available(index)?;
        let phase = self.state.phase;
        if !matches!(phase, TransportPhase::Idle | TransportPhase::Queued) {
            return Err(SyncError::InvalidTransition { op: "start", phase });
        }
        if let Some(reason) = self.video_readiness.failure() {
            return Err(SyncError::ResourceUnavailable(reason.to_string()));
        }

        self.state.active_track = index;
        if self.start_ready() {
            self.request_play(false);
            Ok(StartOutcome::Requested)
        } else {
            log::debug!("Start on track {} queued until media is ready", index);
            self.state.phase = TransportPhase::Queued;
            Ok(StartOutcome::Queued)
        }
    }

    /// Make `index` the active track. While playing, the new track picks up
    /// at the video's current position.
    pub fn switch_track(&mut self, index: usize) -> SyncResult<()> {
        self.require_available(index)?;
        self.state.active_track = index;
        if self.state.is_playing() {
            let elapsed = self.video.current_time();
            log::debug!("Switching to track {} at {:.3}s", index, elapsed);
            self.engage_active(elapsed);
        } else if self.state.phase == TransportPhase::Queued {
            self.flush_queued_start();
        }
        Ok(())
    }

    pub fn pause(&mut self) -> SyncResult<()> {
        let asset = self.asset.as_mut().ok_or(SyncError::NotReady)?;
        match self.state.phase {
            TransportPhase::Playing => {
                self.video.pause();
                asset.bus.pause_all();
                self.state.phase = TransportPhase::Paused;
            }
            TransportPhase::Starting { resume, .. } => {
                self.video.pause();
                self.state.phase = if resume {
                    TransportPhase::Paused
                } else {
                    TransportPhase::Idle
                };
            }
            TransportPhase::Queued => self.state.phase = TransportPhase::Idle,
            phase => return Err(SyncError::InvalidTransition { op: "pause", phase }),
        }
        log::debug!("Paused ({:?})", self.state.phase);
        Ok(())
    }

    /// Continue from `Paused`. The active track is realigned to the video on confirmation.
    pub fn resume(&mut self) -> SyncResult<()> {
        if self.asset.is_none() {
            return Err(SyncError::NotReady);
        }
        match self.state.phase {
            TransportPhase::Paused => {
                self.request_play(true);
                Ok(())
            }
            phase => Err(SyncError::InvalidTransition { op: "resume", phase }),
        }
    }

    /// Stop all audio, rewind the video, and return to `Idle` on track 0.
    pub fn reset(&mut self) -> SyncResult<()> {
        let asset = self.asset.as_mut().ok_or(SyncError::NotReady)?;
        asset.bus.stop_all();
        self.video.pause();
        self.video.reload();
        self.state.phase = TransportPhase::Idle;
        self.state.active_track = 0;
        log::debug!("Transport reset");
        Ok(())
    }

    /// Drain pending media completions and apply them.
    pub fn poll(&mut self) -> Vec<SyncNotice> {
        let mut notices = Vec::new();
        while let Some(event) = self.video.poll_event() {
            notices.extend(self.apply_video_event(event));
        }
        let loads: Vec<(usize, Readiness)> = match self.asset.as_mut() {
            Some(asset) => asset
                .bus
                .iter_mut()
                .enumerate()
                .filter_map(|(index, track)| track.poll_load().map(|r| (index, r)))
                .collect(),
            None => Vec::new(),
        };
        for (index, readiness) in loads {
            notices.extend(self.apply_track_load(index, readiness));
        }
        notices
    }

    pub fn apply_video_event(&mut self, event: VideoEvent) -> Vec<SyncNotice> {
        match event {
            VideoEvent::Loaded => {
                self.video_readiness = Readiness::Ready;
                self.flush_queued_start();
                Vec::new()
            }
            VideoEvent::LoadFailed(reason) => {
                log::warn!("Video failed to load: {}", reason);
                self.video_readiness = Readiness::Failed(reason.clone());
                if self.state.phase == TransportPhase::Queued {
                    self.state.phase = TransportPhase::Idle;
                }
                vec![SyncNotice::VideoUnavailable(reason)]
            }
            VideoEvent::PlayStarted(ticket) => match self.state.phase {
                TransportPhase::Starting { ticket: pending, resume } if pending == ticket => {
                    self.state.phase = TransportPhase::Playing;
                    let from = if resume { self.video.current_time() } else { 0.0 };
                    self.engage_active(from);
                    log::debug!("Playing track {} from {:.3}s", self.state.active_track, from);
                    vec![SyncNotice::PlaybackStarted]
                }
                _ => {
                    log::debug!("Ignoring stale play confirmation {:?}", ticket);
                    Vec::new()
                }
            },
            VideoEvent::PlayRejected { ticket, reason } => match self.state.phase {
                TransportPhase::Starting { ticket: pending, resume } if pending == ticket => {
                    log::warn!("Video playback rejected: {}", reason);
                    self.state.phase = if resume {
                        TransportPhase::Paused
                    } else {
                        TransportPhase::Idle
                    };
                    vec![SyncNotice::PlaybackRejected(reason)]
                }
                _ => Vec::new(),
            },
            VideoEvent::PlaybackError(reason) => {
                log::warn!("Video playback error: {}", reason);
                if self.state.is_playing() {
                    self.video.pause();
                    if let Some(asset) = self.asset.as_mut() {
                        asset.bus.pause_all();
                    }
                    self.state.phase = TransportPhase::Paused;
                }
                vec![SyncNotice::PlaybackInterrupted(reason)]
            }
        }
    }

    pub fn apply_track_load(&mut self, index: usize, readiness: Readiness) -> Vec<SyncNotice> {
        let Some(track) = self.asset.as_mut().and_then(|a| a.bus.get_mut(index)) else {
            return Vec::new();
        };
        let was_ready = track.readiness().is_ready();
        if track.readiness().failure().is_some() && readiness.failure().is_some() {
            return Vec::new();
        }
        track.set_readiness(readiness.clone());
        let language = track.language.clone();
        let is_active = index == self.state.active_track;

        match readiness {
            Readiness::Pending => Vec::new(),
            Readiness::Ready => {
                if is_active && !was_ready {
                    if self.state.is_playing() {
                        let elapsed = self.video.current_time();
                        self.engage_active(elapsed);
                    } else {
                        self.flush_queued_start();
                    }
                }
                Vec::new()
            }
            Readiness::Failed(reason) => {
                log::warn!("Audio track {} ({}) failed: {}", index, language, reason);
                let mut notices = vec![SyncNotice::TrackUnavailable {
                    index,
                    language,
                    reason,
                }];
                if is_active {
                    if index != 0 {
                        self.state.active_track = 0;
                        notices.push(SyncNotice::FellBackToDefault { from: index });
                        if self.state.is_playing() {
                            let elapsed = self.video.current_time();
                            self.engage_active(elapsed);
                        } else {
                            self.flush_queued_start();
                        }
                    } else if self.state.phase == TransportPhase::Queued {
                        self.state.phase = TransportPhase::Idle;
                    }
                }
                notices
            }
        }
    }

    fn start_ready(&self) -> bool {
        let track_ready = self
            .asset
            .as_ref()
            .and_then(|a| a.bus.get(self.state.active_track))
            .is_some_and(|t| t.readiness().is_ready());
        self.video_readiness.is_ready() && track_ready
    }

    fn flush_queued_start(&mut self) {
        if self.state.phase != TransportPhase::Queued {
            return;
        }
        if self.start_ready() {
            self.request_play(false);
        }
    }

    fn request_play(&mut self, resume: bool) {
        self.last_ticket += 1;
        let ticket = PlayTicket(self.last_ticket);
        self.state.phase = TransportPhase::Starting { ticket, resume };
        self.video.request_play(ticket);
    }

    /// Silence every track, then start the active one at `position` if it is loaded.
    fn engage_active(&mut self, position: f64) {
        let index = self.state.active_track;
        let Some(asset) = self.asset.as_mut() else {
            return;
        };
        asset.bus.stop_all();
        if let Some(track) = asset.bus.get_mut(index) {
            if track.readiness().is_ready() {
                track.start_at(position);
            } else {
                log::debug!("Track {} not loaded yet, audio follows when ready", index);
            }
        }
    }
}

impl<V: VideoSurface, A: AudioHandle> Drop for PlaybackSynchronizer<V, A> {
    fn drop(&mut self) {
        self.detach();
    }
}
