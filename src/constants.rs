//! Constants used throughout the application

/// Number of hand landmarks produced by the landmark model
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Coordinates per landmark (x, y, z)
pub const COORDS_PER_LANDMARK: usize = 3;

/// Total number of landmark coordinate values (21 points × 3 dimensions)
pub const LANDMARK_TOTAL_VALUES: usize = 63;

/// Image normalization constants for palm detection
pub const IMAGE_NORMALIZATION_OFFSET: f32 = 127.5;
pub const IMAGE_NORMALIZATION_SCALE: f32 = 128.0;

/// Default capture cadence in milliseconds
pub const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 100;

/// Default upper bound on a single remote inference round trip
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 5_000;

/// Default camera device index
pub const DEFAULT_CAMERA_INDEX: i32 = 0;

/// Default capture resolution
pub const DEFAULT_FRAME_WIDTH: i32 = 640;
pub const DEFAULT_FRAME_HEIGHT: i32 = 480;

/// Default thumb-to-index pinch distance threshold (normalized units)
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.1;

/// Default minimum hand presence score from the landmark model
pub const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;

/// JPEG quality used when encoding frames for the remote service
pub const JPEG_QUALITY: i32 = 90;
