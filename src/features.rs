//! Geometric features derived from one set of hand landmarks.
//!
//! Extraction is a pure function of the landmark coordinates. All comparisons
//! are strict, and coordinates are taken as-is in image space, where y grows
//! downward: a fingertip *below* its PIP joint means the finger is curled.
//! Comparisons involving NaN are false, so degenerate coordinates leave every
//! flag unset rather than panicking.

use crate::landmarks::{
    HandLandmarks, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_IP, THUMB_MCP, THUMB_TIP,
};

/// Per-frame geometric features consumed by the gesture rules
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector {
    /// Index fingertip below its PIP joint
    pub index_folded: bool,
    /// Middle fingertip below its PIP joint
    pub middle_folded: bool,
    /// Ring fingertip below its PIP joint
    pub ring_folded: bool,
    /// Pinky fingertip below its PIP joint
    pub pinky_folded: bool,
    /// Thumb tip above IP and IP above MCP (thumb pointing up)
    pub thumb_ascending: bool,
    /// Thumb tip below IP and IP below MCP (thumb pointing down)
    pub thumb_descending: bool,
    /// Thumb tip above the IP joint alone
    pub thumb_tip_above_ip: bool,
    /// Thumb tip to the right of the IP joint in image space
    pub thumb_tip_right_of_ip: bool,
    /// Euclidean distance between thumb tip and index fingertip, all three axes
    pub pinch_distance: f32,
}

impl FeatureVector {
    /// Extract the feature vector from one hand.
    ///
    /// Deterministic: identical coordinates always produce an identical
    /// vector, and re-extraction changes nothing.
    #[must_use]
    pub fn extract(hand: &HandLandmarks) -> Self {
        let thumb_tip = hand[THUMB_TIP];
        let thumb_ip = hand[THUMB_IP];
        let thumb_mcp = hand[THUMB_MCP];

        Self {
            index_folded: is_folded(&hand[INDEX_TIP], &hand[INDEX_PIP]),
            middle_folded: is_folded(&hand[MIDDLE_TIP], &hand[MIDDLE_PIP]),
            ring_folded: is_folded(&hand[RING_TIP], &hand[RING_PIP]),
            pinky_folded: is_folded(&hand[PINKY_TIP], &hand[PINKY_PIP]),
            thumb_ascending: thumb_tip.y < thumb_ip.y && thumb_ip.y < thumb_mcp.y,
            thumb_descending: thumb_tip.y > thumb_ip.y && thumb_ip.y > thumb_mcp.y,
            thumb_tip_above_ip: thumb_tip.y < thumb_ip.y,
            thumb_tip_right_of_ip: thumb_tip.x > thumb_ip.x,
            pinch_distance: thumb_tip.distance_to(&hand[INDEX_TIP]),
        }
    }

    /// All four non-thumb fingers folded
    #[must_use]
    pub fn all_fingers_folded(&self) -> bool {
        self.index_folded && self.middle_folded && self.ring_folded && self.pinky_folded
    }
}

/// A finger is folded when its tip sits strictly below its PIP joint
fn is_folded(tip: &crate::landmarks::Landmark, pip: &crate::landmarks::Landmark) -> bool {
    tip.y > pip.y
}
