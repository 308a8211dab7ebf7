use eframe::egui;

use crate::ops::selector_bridge::{TrackOption, TrackSelection};

/// Draws one toggle per language. Returns the entry the user clicked, if any.
/// Tracks that failed to load are shown but can't be selected.
pub fn language_toggle(ui: &mut egui::Ui, options: &[TrackOption]) -> Option<TrackSelection> {
    let mut picked = None;
    ui.horizontal_wrapped(|ui| {
        ui.label("Audio:");
        for option in options {
            let label = egui::RichText::new(option.selection.language.to_uppercase());
            let label = if option.available {
                label
            } else {
                label.strikethrough().color(egui::Color32::GRAY)
            };
            let response = ui
                .add_enabled(option.available, egui::SelectableLabel::new(option.active, label))
                .on_disabled_hover_text("Track failed to load");
            if response.clicked() {
                picked = Some(option.selection.clone());
            }
        }
    });
    picked
}
