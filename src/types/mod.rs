pub mod asset;
pub mod media;
pub mod playback_state;
pub mod project;
