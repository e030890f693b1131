//! Configuration management for the hand gesture recognition pipeline

use crate::classifier::ClassifierConfig;
use crate::constants::{
    DEFAULT_CAMERA_INDEX, DEFAULT_CAPTURE_INTERVAL_MS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
    DEFAULT_INFERENCE_TIMEOUT_MS, DEFAULT_PRESENCE_THRESHOLD,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference backend: "local" (on-device ONNX) or "remote" (HTTP service)
    pub backend: String,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Model file paths
    pub models: ModelConfig,

    /// Hand detection parameters
    pub detection: DetectionConfig,

    /// Remote inference configuration
    pub remote: RemoteConfig,

    /// Gesture classifier parameters
    pub classifier: ClassifierConfig,

    /// Acquisition loop timing
    pub pipeline: PipelineConfig,
}

/// Camera capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera device index
    pub index: i32,

    /// Capture width in pixels
    pub width: i32,

    /// Capture height in pixels
    pub height: i32,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the palm/hand region detection ONNX model
    pub palm_detector: PathBuf,

    /// Path to the 21-point hand landmark ONNX model
    pub hand_landmarks: PathBuf,
}

/// Hand detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Confidence threshold for region proposals (0.0-1.0)
    pub confidence_threshold: f32,

    /// IOU threshold for non-maximum suppression (0.0-1.0)
    pub nms_threshold: f32,

    /// Minimum hand presence score from the landmark model (0.0-1.0)
    pub presence_threshold: f32,

    /// Hand region expansion factor before the landmark crop
    pub region_shift: f32,
}

/// Remote inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Gesture recognition endpoint URL
    pub endpoint: String,
}

/// Acquisition loop timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Capture cadence in milliseconds
    pub interval_ms: u64,

    /// Upper bound on one inference call in milliseconds
    pub inference_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            camera: CameraConfig::default(),
            models: ModelConfig::default(),
            detection: DetectionConfig::default(),
            remote: RemoteConfig::default(),
            classifier: ClassifierConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_CAMERA_INDEX,
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            palm_detector: PathBuf::from("assets/palm_detector.onnx"),
            hand_landmarks: PathBuf::from("assets/hand_landmarks.onnx"),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            nms_threshold: 0.3,
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
            region_shift: 0.1,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/api/gesture".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_CAPTURE_INTERVAL_MS,
            inference_timeout_ms: DEFAULT_INFERENCE_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Create the configured landmark source backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend name is not recognized.
    pub fn create_source(&self) -> Result<crate::source::GestureSource> {
        use crate::source::{GestureSource, LocalSource, RemoteSource};

        match self.backend.to_lowercase().as_str() {
            "local" => Ok(GestureSource::Local(LocalSource::new(
                self.models.clone(),
                self.detection.clone(),
            ))),
            "remote" => Ok(GestureSource::Remote(RemoteSource::new(
                self.remote.endpoint.clone(),
            ))),
            name => Err(Error::SourceError(format!("Unknown backend: {name}"))),
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        // Validate thresholds
        if !(0.0..=1.0).contains(&self.detection.confidence_threshold) {
            return Err(Error::ConfigError(
                "Confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.nms_threshold) {
            return Err(Error::ConfigError(
                "NMS threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.presence_threshold) {
            return Err(Error::ConfigError(
                "Presence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.pinch_threshold) {
            return Err(Error::ConfigError(
                "Pinch threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Validate camera settings
        if self.camera.width <= 0 || self.camera.height <= 0 {
            return Err(Error::ConfigError(
                "Capture resolution must be positive".to_string(),
            ));
        }

        // Validate loop timing
        if self.pipeline.interval_ms == 0 {
            return Err(Error::ConfigError(
                "Capture interval must be greater than 0".to_string(),
            ));
        }
        if self.pipeline.inference_timeout_ms == 0 {
            return Err(Error::ConfigError(
                "Inference timeout must be greater than 0".to_string(),
            ));
        }

        match self.backend.to_lowercase().as_str() {
            "local" => {
                // Validate model paths exist
                if !self.models.palm_detector.exists() {
                    return Err(Error::ConfigError(format!(
                        "Palm detector model not found: {}",
                        self.models.palm_detector.display()
                    )));
                }
                if !self.models.hand_landmarks.exists() {
                    return Err(Error::ConfigError(format!(
                        "Hand landmarks model not found: {}",
                        self.models.hand_landmarks.display()
                    )));
                }
            }
            "remote" => {
                if self.remote.endpoint.is_empty() {
                    return Err(Error::ConfigError(
                        "Remote endpoint must not be empty".to_string(),
                    ));
                }
            }
            name => {
                return Err(Error::ConfigError(format!("Unknown backend: {name}")));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Gesture Recognition Configuration

# Inference backend: "local" or "remote"
backend: "local"

# Camera settings
camera:
  index: 0
  width: 640
  height: 480

# Model paths (local backend)
models:
  palm_detector: "assets/palm_detector.onnx"
  hand_landmarks: "assets/hand_landmarks.onnx"

# Hand detection parameters
detection:
  confidence_threshold: 0.5
  nms_threshold: 0.3
  presence_threshold: 0.5
  region_shift: 0.1

# Remote inference (remote backend)
remote:
  endpoint: "http://localhost:8000/api/gesture"

# Gesture classifier
classifier:
  pinch_threshold: 0.1

# Acquisition loop timing
pipeline:
  interval_ms: 100
  inference_timeout_ms: 5000
"#;
