use std::time::Duration;

use eframe::egui;

use crate::error::SyncError;
use crate::ops::session::{ShellStatus, WatchSession};
use crate::ops::synchronizer::{StartOutcome, SyncNotice};
use crate::renderer::GstMediaFactory;
use crate::renderer::gst_video::GstVideoSurface;
use crate::services::metadata_poller::MetadataPoller;
use crate::types::playback_state::TransportPhase;
use crate::ui::language_toggle::language_toggle;
use crate::ui::video_player::VideoView;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

pub type GstWatchSession = WatchSession<GstMediaFactory, GstVideoSurface>;

/// The watch page for one project.
pub struct WatchApp {
    pub session: GstWatchSession,
    pub poller: MetadataPoller,
    pub view: VideoView,
    project_id: String,
    message: Option<String>,
}

impl WatchApp {
    pub fn new(
        project_id: String,
        session: GstWatchSession,
        poller: MetadataPoller,
        view: VideoView,
    ) -> Self {
        Self {
            session,
            poller,
            view,
            project_id,
            message: None,
        }
    }

    fn pump(&mut self) {
        for update in self.poller.drain() {
            if self.session.apply_update(update) {
                self.message = None;
            }
        }
        for notice in self.session.sync_mut().poll() {
            if let Some(text) = describe_notice(&notice) {
                log::info!("{}", text);
                self.message = Some(text);
            }
        }
    }

    fn report(&mut self, result: Result<(), SyncError>) {
        match result {
            Ok(()) => {}
            Err(err @ (SyncError::NotReady | SyncError::InvalidTrack { .. })) => {
                log::debug!("{}", err);
            }
            Err(err) => {
                log::debug!("{}", err);
                self.message = Some(err.to_string());
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let phase = self.session.sync().phase();
        ui.horizontal(|ui| {
            let control = primary_control(phase);
            if ui.button(control.label()).clicked() {
                let result = match control {
                    PrimaryControl::Play => self.session.play().map(|outcome| {
                        if outcome == StartOutcome::Queued {
                            log::debug!("Play queued until media is ready");
                        }
                    }),
                    PrimaryControl::Cancel | PrimaryControl::Pause => {
                        self.session.sync_mut().pause()
                    }
                    PrimaryControl::Resume => self.session.sync_mut().resume(),
                };
                self.report(result);
            }
            if control == PrimaryControl::Cancel {
                ui.spinner();
            }
            if ui
                .add_enabled(restart_enabled(phase), egui::Button::new("Restart"))
                .clicked()
            {
                let result = self.session.sync_mut().reset();
                self.report(result);
            }
            ui.label(format_time(self.session.sync().video_position()));
        });

        let options = self.session.track_options();
        if let Some(selection) = language_toggle(ui, &options) {
            let result = self.session.select(&selection);
            self.report(result);
        }
    }
}

impl eframe::App for WatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump();

        let status = self.session.status();
        if status == ShellStatus::Ready {
            self.view
                .update_texture(self.session.sync_mut().video_mut(), ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("Project {}", self.project_id));
            ui.separator();
            match &status {
                ShellStatus::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading...");
                    });
                }
                ShellStatus::Processing => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Video still processing. Please wait.");
                    });
                }
                ShellStatus::Failed(reason) => {
                    ui.colored_label(egui::Color32::LIGHT_RED, reason.as_str());
                }
                ShellStatus::Ready => {
                    self.view.show(ui);
                    ui.add_space(6.0);
                    self.controls(ui);
                }
            }
            if let Some(message) = &self.message {
                ui.add_space(6.0);
                ui.colored_label(egui::Color32::YELLOW, message.as_str());
            }
        });

        let busy = self.session.sync().is_playing() || self.session.sync().phase().is_waiting();
        ctx.request_repaint_after(if busy { FRAME_INTERVAL } else { IDLE_INTERVAL });
    }
}

/// The main transport button for each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimaryControl {
    Play,
    /// Withdraw a start that is waiting for media or for the video.
    Cancel,
    Pause,
    Resume,
}

impl PrimaryControl {
    fn label(self) -> &'static str {
        match self {
            PrimaryControl::Play => "Play",
            PrimaryControl::Cancel => "Cancel",
            PrimaryControl::Pause => "Pause",
            PrimaryControl::Resume => "Resume",
        }
    }
}

fn primary_control(phase: TransportPhase) -> PrimaryControl {
    match phase {
        phase if phase.is_waiting() => PrimaryControl::Cancel,
        TransportPhase::Playing => PrimaryControl::Pause,
        TransportPhase::Paused => PrimaryControl::Resume,
        _ => PrimaryControl::Play,
    }
}

/// Restart is offered whenever there is something to undo, including a
/// start still waiting on media.
fn restart_enabled(phase: TransportPhase) -> bool {
    phase != TransportPhase::Idle
}

/// User-facing text for a notice. Playback starting needs no message.
fn describe_notice(notice: &SyncNotice) -> Option<String> {
    match notice {
        SyncNotice::PlaybackStarted => None,
        SyncNotice::PlaybackRejected(reason) => Some(format!("Playback was blocked: {}", reason)),
        SyncNotice::VideoUnavailable(reason) => Some(format!("Video unavailable: {}", reason)),
        SyncNotice::PlaybackInterrupted(reason) => {
            Some(format!("Playback stopped by a video error: {}", reason))
        }
        SyncNotice::TrackUnavailable {
            language, reason, ..
        } => Some(format!("{} audio unavailable: {}", language.to_uppercase(), reason)),
        SyncNotice::FellBackToDefault { .. } => {
            Some("Switched back to the original audio".to_string())
        }
    }
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::media::PlayTicket;

    #[test]
    fn test_waiting_start_can_be_cancelled_or_restarted() {
        let starting = TransportPhase::Starting {
            ticket: PlayTicket(3),
            resume: false,
        };
        for phase in [TransportPhase::Queued, starting] {
            assert_eq!(primary_control(phase), PrimaryControl::Cancel);
            assert!(restart_enabled(phase));
        }
        assert_eq!(primary_control(TransportPhase::Idle), PrimaryControl::Play);
        assert!(!restart_enabled(TransportPhase::Idle));
        assert_eq!(primary_control(TransportPhase::Playing), PrimaryControl::Pause);
        assert_eq!(primary_control(TransportPhase::Paused), PrimaryControl::Resume);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(75.9), "01:15");
        assert_eq!(format_time(-3.0), "00:00");
    }

    #[test]
    fn test_describe_notice() {
        assert_eq!(describe_notice(&SyncNotice::PlaybackStarted), None);
        assert_eq!(
            describe_notice(&SyncNotice::TrackUnavailable {
                index: 1,
                language: "fr".into(),
                reason: "404".into(),
            }),
            Some("FR audio unavailable: 404".to_string())
        );
        assert!(describe_notice(&SyncNotice::FellBackToDefault { from: 2 }).is_some());
    }
}
