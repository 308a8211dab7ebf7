pub mod dubbing;
pub mod metadata_poller;
