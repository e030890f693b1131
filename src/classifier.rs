//! Gesture labels and the ordered rule list that assigns them.
//!
//! Classification is stateless and total: every call returns exactly one
//! label, and no input raises. The rules form an explicit decision list
//! evaluated top to bottom with first match winning; the predicates are not
//! mutually exclusive, so the order is part of the deployed behavior and is
//! kept exactly as observed in production. In particular the folded-hand rule
//! precedes the thumbs-up/down rules and subsumes their finger precondition,
//! which leaves LIKE and DISLIKE unreachable; reordering would change live
//! output, so the list preserves it and the tests pin it down.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PINCH_THRESHOLD;
use crate::features::FeatureVector;
use crate::landmarks::{HandLandmarks, Landmark};

/// One frame's classification output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// All four non-thumb fingers curled, thumb ignored
    Folded,
    /// Thumbs up with fingers curled (unreachable behind `Folded`, kept as deployed)
    Like,
    /// Thumbs down with fingers curled (unreachable behind `Folded`, kept as deployed)
    Dislike,
    /// Thumb and index fingertips pinched together, remaining fingers extended
    Ok,
    /// Index and middle extended in a V, ring and pinky curled
    Peace,
    /// All fingers extended, thumb raised
    Stop,
    /// Index extended alone, other fingers curled
    Forward,
    /// Index and pinky extended, middle and ring curled, thumb out
    ILoveYou,
    /// No hand (or no valid 21-point set) in the frame
    NoHand,
    /// A hand was present but no rule matched
    NoMatch,
    /// A label reported by the remote service that the local rules never
    /// produce (for example "CALL ME", "LEFT", "RIGHT")
    Remote(String),
    /// A cycle-level failure, carrying a short description
    Error(String),
}

impl Gesture {
    /// The label string published to observers
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Folded => "FOLDED",
            Self::Like => "LIKE",
            Self::Dislike => "DISLIKE",
            Self::Ok => "OK",
            Self::Peace => "PEACE",
            Self::Stop => "STOP",
            Self::Forward => "FORWARD",
            Self::ILoveYou => "I LOVE YOU",
            Self::NoHand => "No hand detected",
            Self::NoMatch => "No recognized gesture",
            Self::Remote(label) => label,
            Self::Error(_) => "Error",
        }
    }

    /// Map a label string back to a gesture; unrecognized labels are kept
    /// verbatim as remote labels
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "FOLDED" => Self::Folded,
            "LIKE" => Self::Like,
            "DISLIKE" => Self::Dislike,
            "OK" => Self::Ok,
            "PEACE" => Self::Peace,
            "STOP" => Self::Stop,
            "FORWARD" => Self::Forward,
            "I LOVE YOU" => Self::ILoveYou,
            "No hand detected" => Self::NoHand,
            "No recognized gesture" => Self::NoMatch,
            other => Self::Remote(other.to_string()),
        }
    }

    /// Human-readable description shown alongside the label
    #[must_use]
    pub fn meaning(&self) -> &'static str {
        if let Self::Error(_) = self {
            return "Failed to process image";
        }
        match self.label() {
            "LIKE" => "Thumbs-up gesture - indicates approval or agreement",
            "DISLIKE" => "Thumbs-down gesture - indicates disapproval or disagreement",
            "OK" => "Thumb and index finger forming a circle - indicates everything is good",
            "PEACE" => "Index and middle fingers extended in a V shape - represents peace",
            "CALL ME" => "Thumb and pinky extended, other fingers folded - mimics a phone",
            "STOP" => "All fingers extended with palm facing forward - signals to stop",
            "FORWARD" => "Index finger pointing forward, other fingers folded - indicates direction",
            "LEFT" => "Hand pointing to the left - indicates left direction",
            "RIGHT" => "Hand pointing to the right - indicates right direction",
            "I LOVE YOU" => "Index finger and pinky extended with thumb out - sign language for 'I love you'",
            _ => "No gesture detected",
        }
    }

    /// Labels that end a cycle before feature extraction would run
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoHand | Self::Error(_))
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tunable classifier thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Maximum thumb-to-index fingertip distance for the OK sign, in the same
    /// normalized units as the landmarks. The comparison is exclusive: a
    /// distance exactly at the threshold does not match.
    pub pinch_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
        }
    }
}

/// One entry in the decision list
struct Rule {
    label: Gesture,
    matches: fn(&FeatureVector, &ClassifierConfig) -> bool,
}

fn folded_hand(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    f.all_fingers_folded()
}

fn thumbs_up(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    f.thumb_ascending && f.all_fingers_folded()
}

fn thumbs_down(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    f.thumb_descending && f.all_fingers_folded()
}

fn ok_sign(f: &FeatureVector, c: &ClassifierConfig) -> bool {
    f.pinch_distance < c.pinch_threshold && !f.middle_folded && !f.ring_folded && !f.pinky_folded
}

fn peace_sign(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    !f.index_folded && !f.middle_folded && f.ring_folded && f.pinky_folded
}

fn stop_sign(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    !f.index_folded
        && !f.middle_folded
        && !f.ring_folded
        && !f.pinky_folded
        && f.thumb_tip_above_ip
}

fn pointing_forward(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    !f.index_folded && f.middle_folded && f.ring_folded && f.pinky_folded
}

fn i_love_you(f: &FeatureVector, _: &ClassifierConfig) -> bool {
    !f.index_folded
        && f.middle_folded
        && f.ring_folded
        && !f.pinky_folded
        && f.thumb_tip_right_of_ip
}

/// The decision list, in deployed order. Order matters: FOLDED shadows LIKE
/// and DISLIKE, and OK claims a pinched open hand STOP would otherwise match.
const RULES: &[Rule] = &[
    Rule { label: Gesture::Folded, matches: folded_hand },
    Rule { label: Gesture::Like, matches: thumbs_up },
    Rule { label: Gesture::Dislike, matches: thumbs_down },
    Rule { label: Gesture::Ok, matches: ok_sign },
    Rule { label: Gesture::Peace, matches: peace_sign },
    Rule { label: Gesture::Stop, matches: stop_sign },
    Rule { label: Gesture::Forward, matches: pointing_forward },
    Rule { label: Gesture::ILoveYou, matches: i_love_you },
];

/// Classify an already-extracted feature vector
#[must_use]
pub fn classify_features(features: &FeatureVector, config: &ClassifierConfig) -> Gesture {
    for rule in RULES {
        if (rule.matches)(features, config) {
            return rule.label.clone();
        }
    }
    Gesture::NoMatch
}

/// Classify a full hand in one step
#[must_use]
pub fn classify_hand(hand: &HandLandmarks, config: &ClassifierConfig) -> Gesture {
    classify_features(&FeatureVector::extract(hand), config)
}

/// Classify a raw keypoint slice. Anything but exactly 21 points is treated
/// as no hand, never as an error.
#[must_use]
pub fn classify_keypoints(points: &[Landmark], config: &ClassifierConfig) -> Gesture {
    match HandLandmarks::from_slice(points) {
        Some(hand) => classify_hand(&hand, config),
        None => Gesture::NoHand,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{
        INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP,
        THUMB_IP, THUMB_MCP, THUMB_TIP,
    };

    const FINGERS: [(usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];

    /// Open palm, thumb up, fingertips well separated
    fn open_hand() -> [Landmark; 21] {
        let mut points = [Landmark::default(); 21];
        for (i, point) in points.iter_mut().enumerate() {
            point.x = 0.3 + 0.02 * i as f32;
            point.y = 0.8;
        }
        points[THUMB_MCP] = Landmark::new(0.30, 0.70, 0.0);
        points[THUMB_IP] = Landmark::new(0.28, 0.60, 0.0);
        points[THUMB_TIP] = Landmark::new(0.26, 0.50, 0.0);
        for (tip, pip) in FINGERS {
            points[pip].y = 0.55;
            points[tip].y = 0.30;
        }
        points
    }

    fn fold(points: &mut [Landmark; 21], tip: usize, pip: usize) {
        points[tip].y = points[pip].y + 0.25;
    }

    #[test]
    fn test_open_palm_with_raised_thumb_is_stop() {
        let gesture = classify_keypoints(&open_hand(), &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Stop);
    }

    #[test]
    fn test_all_fingers_folded_is_folded_regardless_of_thumb() {
        let mut points = open_hand();
        for (tip, pip) in FINGERS {
            fold(&mut points, tip, pip);
        }
        // Thumb pointing up: the thumbs-up rule also matches, but the
        // folded-hand rule comes first
        assert!(points[THUMB_TIP].y < points[THUMB_IP].y);
        assert!(points[THUMB_IP].y < points[THUMB_MCP].y);
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Folded);
    }

    #[test]
    fn test_thumbs_down_is_also_shadowed_by_folded() {
        let mut points = open_hand();
        for (tip, pip) in FINGERS {
            fold(&mut points, tip, pip);
        }
        points[THUMB_MCP].y = 0.50;
        points[THUMB_IP].y = 0.60;
        points[THUMB_TIP].y = 0.70;
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Folded);
    }

    #[test]
    fn test_pinched_fingertips_with_open_fingers_is_ok() {
        let mut points = open_hand();
        points[INDEX_TIP] = points[THUMB_TIP];
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Ok);
    }

    #[test]
    fn test_pinch_threshold_is_exclusive() {
        // A power-of-two threshold and axis-aligned tips make the boundary
        // distance exact in f32, so this probes the comparison itself
        let config = ClassifierConfig { pinch_threshold: 0.125 };
        let mut points = open_hand();
        points[THUMB_TIP] = Landmark::new(0.5, 0.30, 0.0);

        points[INDEX_TIP] = Landmark::new(0.625, 0.30, 0.0);
        let at_threshold = classify_keypoints(&points, &config);
        assert_eq!(at_threshold, Gesture::Stop, "distance equal to the threshold must not pinch");

        points[INDEX_TIP] = Landmark::new(0.5625, 0.30, 0.0);
        let just_inside = classify_keypoints(&points, &config);
        assert_eq!(just_inside, Gesture::Ok);

        points[INDEX_TIP] = Landmark::new(0.75, 0.30, 0.0);
        let just_outside = classify_keypoints(&points, &config);
        assert_eq!(just_outside, Gesture::Stop);
    }

    #[test]
    fn test_pinch_threshold_is_tunable() {
        let mut points = open_hand();
        points[THUMB_TIP] = Landmark::new(0.50, 0.30, 0.0);
        points[INDEX_TIP] = Landmark::new(0.65, 0.30, 0.0);
        let default_config = ClassifierConfig::default();
        assert_ne!(classify_keypoints(&points, &default_config), Gesture::Ok);

        let wide = ClassifierConfig { pinch_threshold: 0.2 };
        assert_eq!(classify_keypoints(&points, &wide), Gesture::Ok);
    }

    #[test]
    fn test_index_and_middle_up_is_peace() {
        let mut points = open_hand();
        fold(&mut points, RING_TIP, RING_PIP);
        fold(&mut points, PINKY_TIP, PINKY_PIP);
        // Move the thumb away so the pinch rule cannot fire first
        points[THUMB_TIP].x = 0.05;
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Peace);
    }

    #[test]
    fn test_index_up_alone_is_forward() {
        let mut points = open_hand();
        fold(&mut points, MIDDLE_TIP, MIDDLE_PIP);
        fold(&mut points, RING_TIP, RING_PIP);
        fold(&mut points, PINKY_TIP, PINKY_PIP);
        points[THUMB_TIP].x = 0.05;
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Forward);
    }

    #[test]
    fn test_index_and_pinky_up_with_thumb_out_is_i_love_you() {
        let mut points = open_hand();
        fold(&mut points, MIDDLE_TIP, MIDDLE_PIP);
        fold(&mut points, RING_TIP, RING_PIP);
        points[THUMB_IP].x = 0.20;
        points[THUMB_TIP].x = 0.28;
        // Pull the thumb tip away from the index tip to stay out of pinch range
        points[THUMB_TIP].y = 0.85;
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::ILoveYou);
    }

    #[test]
    fn test_i_love_you_requires_thumb_out() {
        let mut points = open_hand();
        fold(&mut points, MIDDLE_TIP, MIDDLE_PIP);
        fold(&mut points, RING_TIP, RING_PIP);
        points[THUMB_IP].x = 0.28;
        points[THUMB_TIP].x = 0.20;
        points[THUMB_TIP].y = 0.85;
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::NoMatch);
    }

    #[test]
    fn test_wrong_length_keypoint_sets_are_no_hand() {
        let config = ClassifierConfig::default();
        assert_eq!(classify_keypoints(&[], &config), Gesture::NoHand);
        assert_eq!(
            classify_keypoints(&[Landmark::default(); 20], &config),
            Gesture::NoHand
        );
        assert_eq!(
            classify_keypoints(&[Landmark::default(); 22], &config),
            Gesture::NoHand
        );
    }

    #[test]
    fn test_degenerate_identical_points_classify_as_ok() {
        // Every landmark at the same spot: nothing is folded (equal y fails
        // the strict comparison) and the pinch distance is zero, so the OK
        // rule is the first to match
        let points = [Landmark::new(0.5, 0.5, 0.0); 21];
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::Ok);
    }

    #[test]
    fn test_no_rule_match_falls_through_to_no_match() {
        let mut points = open_hand();
        // Middle folded alone matches nothing in the list
        fold(&mut points, MIDDLE_TIP, MIDDLE_PIP);
        points[THUMB_TIP].x = 0.05;
        points[THUMB_TIP].y = 0.85;
        let gesture = classify_keypoints(&points, &ClassifierConfig::default());
        assert_eq!(gesture, Gesture::NoMatch);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let points = open_hand();
        let config = ClassifierConfig::default();
        let first = classify_keypoints(&points, &config);
        for _ in 0..100 {
            assert_eq!(classify_keypoints(&points, &config), first);
        }
    }

    #[test]
    fn test_labels_round_trip_through_strings() {
        let closed_set = [
            Gesture::Folded,
            Gesture::Like,
            Gesture::Dislike,
            Gesture::Ok,
            Gesture::Peace,
            Gesture::Stop,
            Gesture::Forward,
            Gesture::ILoveYou,
            Gesture::NoHand,
            Gesture::NoMatch,
        ];
        for gesture in closed_set {
            assert_eq!(Gesture::from_label(gesture.label()), gesture);
        }
        assert_eq!(
            Gesture::from_label("CALL ME"),
            Gesture::Remote("CALL ME".to_string())
        );
    }

    #[test]
    fn test_meanings_cover_remote_labels() {
        assert_eq!(
            Gesture::Ok.meaning(),
            "Thumb and index finger forming a circle - indicates everything is good"
        );
        assert_eq!(
            Gesture::Remote("CALL ME".to_string()).meaning(),
            "Thumb and pinky extended, other fingers folded - mimics a phone"
        );
        assert_eq!(Gesture::NoHand.meaning(), "No gesture detected");
        assert_eq!(Gesture::Folded.meaning(), "No gesture detected");
        assert_eq!(
            Gesture::Error("boom".to_string()).meaning(),
            "Failed to process image"
        );
    }

    #[test]
    fn test_error_labels_publish_as_error() {
        let gesture = Gesture::Error("inference timed out".to_string());
        assert_eq!(gesture.label(), "Error");
        assert!(gesture.is_terminal());
    }
}
