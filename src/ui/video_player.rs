use eframe::egui;

use crate::renderer::gst_video::{GstVideoSurface, VideoFrame};

/// Displays the latest frame pulled from the video surface.
pub struct VideoView {
    texture: Option<egui::TextureHandle>,
    shown_timestamp: Option<f64>,
    width: u32,
    height: u32,
}

impl VideoView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            texture: None,
            shown_timestamp: None,
            width,
            height,
        }
    }

    /// Pull a frame from the surface and upload it if it changed.
    pub fn update_texture(&mut self, surface: &mut GstVideoSurface, ctx: &egui::Context) {
        let Some(frame) = surface.pull_frame() else {
            self.texture = None;
            self.shown_timestamp = None;
            return;
        };
        if self.needs_upload(frame.timestamp) {
            self.upload(frame, ctx);
        }
    }

    fn needs_upload(&self, timestamp: f64) -> bool {
        self.texture.is_none() || self.shown_timestamp != Some(timestamp)
    }

    fn upload(&mut self, frame: &VideoFrame, ctx: &egui::Context) {
        let expected = frame.width as usize * frame.height as usize * 4;
        if frame.data.len() != expected {
            log::warn!(
                "Dropping frame with {} bytes, expected {} for {}x{}",
                frame.data.len(),
                expected,
                frame.width,
                frame.height
            );
            return;
        }
        let color_img = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.data,
        );
        match self.texture.as_mut() {
            Some(texture) => texture.set(color_img, egui::TextureOptions::default()),
            None => {
                self.texture = Some(ctx.load_texture(
                    "dubbed_video_frame",
                    color_img,
                    egui::TextureOptions::default(),
                ))
            }
        }
        self.shown_timestamp = Some(frame.timestamp);
    }

    /// Show the frame scaled to fit, keeping the preview aspect ratio.
    pub fn show(&self, ui: &mut egui::Ui) {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let avail = ui.available_width();
        let size = egui::vec2(avail, avail / aspect);
        match &self.texture {
            Some(texture) => {
                ui.add(egui::Image::new((texture.id(), size)));
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter().rect_filled(rect, 4.0, egui::Color32::BLACK);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No frame loaded",
                    egui::FontId::proportional(14.0),
                    egui::Color32::GRAY,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, timestamp: f64) -> VideoFrame {
        VideoFrame {
            data: vec![255; (width * height * 4) as usize],
            width,
            height,
            timestamp,
        }
    }

    #[test]
    fn test_same_frame_is_uploaded_once() {
        let ctx = egui::Context::default();
        let mut view = VideoView::new(4, 2);
        assert!(view.needs_upload(0.0));

        view.upload(&frame(4, 2, 0.5), &ctx);
        assert!(view.texture.is_some());
        assert!(!view.needs_upload(0.5));
        assert!(view.needs_upload(0.54));
    }

    #[test]
    fn test_malformed_frame_is_dropped() {
        let ctx = egui::Context::default();
        let mut view = VideoView::new(4, 2);
        let mut bad = frame(4, 2, 1.0);
        bad.data.truncate(10);
        view.upload(&bad, &ctx);
        assert!(view.texture.is_none());
        assert_eq!(view.shown_timestamp, None);
    }
}
