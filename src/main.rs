//! Hand gesture recognition from a live camera feed.

use anyhow::Result;
use clap::Parser;
use hand_gesture_recognition::app::GestureApp;
use hand_gesture_recognition::config::{Config, EXAMPLE_CONFIG};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Inference backend (local, remote)
    #[arg(short, long)]
    backend: Option<String>,

    /// Remote inference endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Capture interval in milliseconds
    #[arg(long)]
    interval: Option<u64>,

    /// Thumb-to-index pinch threshold for the OK gesture
    #[arg(long)]
    pinch_threshold: Option<f32>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Hand Gesture Recognition");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Apply command line overrides
    if let Some(cam) = args.cam {
        config.camera.index = cam;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(endpoint) = args.endpoint {
        config.remote.endpoint = endpoint;
    }
    if let Some(interval) = args.interval {
        config.pipeline.interval_ms = interval;
    }
    if let Some(threshold) = args.pinch_threshold {
        config.classifier.pinch_threshold = threshold;
    }

    // Create and run application
    let app = GestureApp::new(config)?;
    app.run().await?;

    Ok(())
}
