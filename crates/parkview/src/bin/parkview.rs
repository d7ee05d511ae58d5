//! # PARKVIEW Viewer
//!
//! Headless driver: loads the park models, connects to the simulation
//! server and runs the frame loop, logging each frame.
//!
//! ```bash
//! # defaults: assets/ next to the working directory, server on :8585
//! parkview
//!
//! # with a config file
//! RUST_LOG=debug parkview parkview.toml
//! ```

use std::process::ExitCode;

use parkview::assets::AssetCatalog;
use parkview::sync::HttpTransport;
use parkview::{LogSink, ParkviewConfig, Viewer, ViewerResult};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "parkview stopped");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ViewerResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading config");
            ParkviewConfig::load(path)?
        }
        None => ParkviewConfig::default(),
    };

    let manifest = config.assets.manifest()?;
    let catalog = AssetCatalog::load(&manifest, &config.assets.parser())?;

    let transport = HttpTransport::new(config.server.base_url.as_str(), config.server.request_timeout())?;
    info!(server = transport.base_url(), "connecting");

    let mut viewer = Viewer::new(&config, catalog, transport, LogSink::default())?;
    let init = viewer.bootstrap()?;
    info!(message = %init.message, width = init.width, height = init.height, "model ready");

    let reason = viewer.run();
    info!(?reason, "viewer exiting");
    viewer.frame_stats().log_summary();
    viewer.shutdown();
    Ok(())
}
