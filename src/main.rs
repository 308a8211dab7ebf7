mod config;
mod error;
mod ops;
mod renderer;
mod services;
mod types;
mod ui;

use crate::config::{USAGE, default_config_path, load_config, parse_args, save_config};
use crate::ops::registry::TrackRegistry;
use crate::ops::session::WatchSession;
use crate::renderer::GstMediaFactory;
use crate::renderer::gst_video::GstVideoSurface;
use crate::services::dubbing::{DubbingUrls, client_for};
use crate::services::metadata_poller::MetadataPoller;
use crate::ui::app::WatchApp;
use crate::ui::video_player::VideoView;
use gstreamer as gst;

fn main() -> eframe::Result<()> {
    // RUST_LOG=debug for pipeline and transport detail
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            std::process::exit(2);
        }
    };

    let config_path = args.config_path.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path);
    if !config_path.exists() {
        if let Err(e) = save_config(&config, &config_path) {
            log::warn!("Could not write default config to {:?}: {}", config_path, e);
        }
    }
    if let Some(api) = args.api_base_url {
        config.api_base_url = api;
    }

    if let Err(e) = gst::init() {
        log::error!("GStreamer initialization failed: {}", e);
        std::process::exit(1);
    }

    let urls = DubbingUrls::new(config.api_base_url.clone());
    log::info!("Watching project {} via {}", args.project_id, urls.base());

    let poller = match MetadataPoller::spawn(
        client_for(&urls),
        args.project_id.clone(),
        config.poll_interval(),
    ) {
        Ok(poller) => poller,
        Err(e) => {
            log::error!("Could not start metadata poller: {}", e);
            std::process::exit(1);
        }
    };

    let session = WatchSession::new(
        GstMediaFactory,
        urls,
        TrackRegistry::new(config.original_language.clone()),
        GstVideoSurface::new(config.preview_width, config.preview_height),
    )
    .with_preferred_language(args.language);
    let view = VideoView::new(config.preview_width, config.preview_height);
    let app = WatchApp::new(args.project_id, session, poller, view);

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Dubview",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
