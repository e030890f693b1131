//! Hand gesture recognition library for real-time camera streams.
//!
//! This library classifies hand poses into discrete gesture labels using:
//! - ONNX Runtime for hand detection and landmark inference
//! - `OpenCV` for camera capture and image handling
//! - An ordered rule list over simple hand-landmark geometry
//!
//! The recognition pipeline consists of:
//! 1. Frame capture from a camera device at a fixed cadence
//! 2. Hand landmark acquisition, on-device or via a remote inference service
//! 3. Geometric feature extraction from the 21-point hand layout
//! 4. Ordered rule evaluation producing one gesture label per frame
//!
//! # Examples
//!
//! ## Classifying a keypoint set
//!
//! ```
//! use hand_gesture_recognition::classifier::{classify_keypoints, ClassifierConfig, Gesture};
//! use hand_gesture_recognition::landmarks::Landmark;
//!
//! // A flat open hand: every fingertip higher in the image than its joints
//! let mut points = vec![Landmark::new(0.5, 0.9, 0.0)]; // wrist
//! for finger in 0..5 {
//!     let x = 0.2 + 0.15 * finger as f32;
//!     for joint in 0..4 {
//!         points.push(Landmark::new(x, 0.8 - 0.15 * joint as f32, 0.0));
//!     }
//! }
//!
//! let label = classify_keypoints(&points, &ClassifierConfig::default());
//! assert_eq!(label, Gesture::Stop);
//! ```
//!
//! ## Running the full application
//!
//! ```no_run
//! use hand_gesture_recognition::app::GestureApp;
//! use hand_gesture_recognition::config::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.backend = "remote".to_string();
//! config.remote.endpoint = "http://localhost:8000/api/gesture".to_string();
//!
//! let app = GestureApp::new(config)?;
//! app.run().await?; // runs until Ctrl-C
//! # Ok(())
//! # }
//! ```
//!
//! ## Observing labels from your own code
//!
//! ```no_run
//! use hand_gesture_recognition::camera::Camera;
//! use hand_gesture_recognition::config::Config;
//! use hand_gesture_recognition::pipeline::Pipeline;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let camera = Camera::open(0, 640, 480)?;
//! let source = config.create_source()?;
//!
//! let pipeline = Pipeline::new(
//!     camera,
//!     source,
//!     config.classifier.clone(),
//!     config.pipeline.clone(),
//! );
//! let handle = pipeline.start();
//!
//! let mut labels = handle.labels();
//! while labels.changed().await.is_ok() {
//!     println!("{}", *labels.borrow_and_update());
//! }
//! # Ok(())
//! # }
//! ```

/// Hand landmark layout and keypoint set types
pub mod landmarks;

/// Geometric feature extraction from a single frame's keypoints
pub mod features;

/// The ordered gesture rule list and its labels
pub mod classifier;

/// Camera capture behind the frame source seam
pub mod camera;

/// Palm/hand region detection module
pub mod palm_detection;

/// 21-point hand landmark detection module
pub mod landmark_detection;

/// Landmark source backends (local ONNX, remote HTTP)
pub mod source;

/// The fixed-cadence acquisition loop
pub mod pipeline;

/// Utility functions for image processing and coordinate transformations
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
