pub mod preloader;
pub mod registry;
pub mod selector_bridge;
pub mod session;
pub mod synchronizer;
