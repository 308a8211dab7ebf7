pub mod app;
pub mod language_toggle;
pub mod video_player;
