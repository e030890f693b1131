//! Hand landmark types and the 21-point index layout.
//!
//! Both backends produce the same anatomical layout (MediaPipe hand landmark
//! convention): wrist first, then four joints per digit from the base of the
//! thumb to the tip of the pinky. Coordinates are normalized to the source
//! frame, `[0, 1]` on x and y with y growing downward; z is relative depth
//! with the wrist near zero.

use crate::constants::NUM_HAND_LANDMARKS;

/// Wrist
pub const WRIST: usize = 0;
/// Thumb joints, palm to tip
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
/// Index finger joints, palm to tip
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
/// Middle finger joints, palm to tip
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
/// Ring finger joints, palm to tip
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
/// Pinky joints, palm to tip
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// A single hand landmark in normalized frame coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    /// X coordinate (0.0 to 1.0, normalized to frame width)
    pub x: f32,
    /// Y coordinate (0.0 to 1.0, normalized to frame height, y grows downward)
    pub y: f32,
    /// Relative depth (wrist-centered; 0.0 when the model only produces 2D points)
    pub z: f32,
}

impl Landmark {
    /// Create a landmark from explicit coordinates
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another landmark over all three axes
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A complete set of 21 hand landmarks for one detected hand
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; NUM_HAND_LANDMARKS],
}

impl HandLandmarks {
    /// Wrap a full landmark array
    #[must_use]
    pub const fn new(points: [Landmark; NUM_HAND_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Build from a slice, returning `None` unless it holds exactly 21 points
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; NUM_HAND_LANDMARKS] = points.try_into().ok()?;
        Some(Self { points })
    }

    /// All 21 landmarks in anatomical index order
    #[must_use]
    pub fn points(&self) -> &[Landmark; NUM_HAND_LANDMARKS] {
        &self.points
    }
}

impl std::ops::Index<usize> for HandLandmarks {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Landmark {
        &self.points[index]
    }
}
