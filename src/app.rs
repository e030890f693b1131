//! Main application module for hand gesture recognition.
//!
//! Wires the configured camera and inference backend into an acquisition
//! pipeline, logs gesture changes as they are published, and tears the
//! pipeline down on Ctrl-C.

use log::{debug, info};
use tokio::signal;

use crate::camera::Camera;
use crate::classifier::Gesture;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Main application struct
pub struct GestureApp {
    config: Config,
}

impl GestureApp {
    /// Create the application from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the recognition pipeline until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns an error if the camera cannot be opened or the backend cannot
    /// be constructed. Failures after startup degrade the pipeline instead
    /// of returning.
    pub async fn run(self) -> Result<()> {
        info!("Initializing hand gesture recognition");

        let camera = Camera::open(
            self.config.camera.index,
            self.config.camera.width,
            self.config.camera.height,
        )?;
        let source = self.config.create_source()?;
        info!("Using {} inference backend", self.config.backend);

        let pipeline = Pipeline::new(
            camera,
            source,
            self.config.classifier.clone(),
            self.config.pipeline.clone(),
        );
        let handle = pipeline.start();

        // Log each gesture change with its meaning, the way the lesson UI
        // would present it
        let mut labels = handle.labels();
        let watcher = tokio::spawn(async move {
            let mut last = labels.borrow().clone();
            while labels.changed().await.is_ok() {
                let label = labels.borrow_and_update().clone();
                if label == last {
                    continue;
                }
                if label == Gesture::NoHand {
                    debug!("No hand in view");
                } else {
                    info!("Gesture: {} ({})", label, label.meaning());
                }
                last = label;
            }
        });

        signal::ctrl_c().await?;
        info!("Shutting down");

        handle.stop().await;
        // The label channel closed with the pipeline, so the watcher exits
        let _ = watcher.await;

        info!("Shutdown complete");
        Ok(())
    }
}
