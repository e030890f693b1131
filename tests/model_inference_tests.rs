//! Tests for ONNX model loading and inference
//!
//! These run against the real detector models and are ignored by default;
//! place the models under assets/ and run with `--ignored` to exercise them.

use std::path::Path;

use hand_gesture_recognition::landmark_detection::LandmarkDetector;
use hand_gesture_recognition::palm_detection::PalmDetector;
use hand_gesture_recognition::Result;
use opencv::core::{Mat, Scalar, CV_8UC3};

const PALM_MODEL: &str = "assets/palm_detector.onnx";
const LANDMARK_MODEL: &str = "assets/hand_landmarks.onnx";

#[test]
#[ignore = "Requires ONNX models"]
fn test_load_palm_detector_model() -> Result<()> {
    assert!(Path::new(PALM_MODEL).exists(), "Palm detector model not found");

    let _detector = PalmDetector::new(PALM_MODEL, 0.5, 0.3)?;
    // If construction succeeds, model loaded correctly

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_load_hand_landmark_model() -> Result<()> {
    assert!(Path::new(LANDMARK_MODEL).exists(), "Hand landmark model not found");

    let _detector = LandmarkDetector::new(LANDMARK_MODEL, 0.5)?;

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_palm_detection_inference() -> Result<()> {
    let mut detector = PalmDetector::new(PALM_MODEL, 0.5, 0.3)?;

    // A blank frame: inference must complete, and no hand should score
    // above the confidence threshold
    let frame = Mat::new_rows_cols_with_default(
        480,
        640,
        CV_8UC3,
        Scalar::new(128.0, 128.0, 128.0, 0.0),
    )?;

    let region = detector.detect(&frame)?;
    assert!(region.is_none(), "blank frame should not contain a hand");

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_landmark_detection_inference() -> Result<()> {
    let detector = LandmarkDetector::new(LANDMARK_MODEL, 0.0)?;

    // With the presence gate disabled, a blank crop still yields 21 points
    let crop = Mat::new_rows_cols_with_default(
        224,
        224,
        CV_8UC3,
        Scalar::new(128.0, 128.0, 128.0, 0.0),
    )?;

    let landmarks = detector.detect(&crop)?;
    if let Some(points) = landmarks {
        assert_eq!(points.len(), 21, "Expected 21 hand landmarks");
        for point in &points {
            assert!(point.x.is_finite() && point.y.is_finite() && point.z.is_finite());
        }
    }

    Ok(())
}
