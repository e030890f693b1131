//! On-device landmark source backed by the ONNX detector pair.

use std::future::Future;

use log::{debug, info};
use opencv::core::{Mat, Rect};
use opencv::prelude::*;

use crate::config::{DetectionConfig, ModelConfig};
use crate::landmark_detection::LandmarkDetector;
use crate::landmarks::{HandLandmarks, Landmark};
use crate::palm_detection::PalmDetector;
use crate::source::{LandmarkSource, Observation};
use crate::utils::expand_to_square;
use crate::Result;

/// Two-stage local detector: a region proposal over the full frame, then
/// landmark regression on the cropped hand.
///
/// Construction is cheap and infallible; the models load during `warm_up`.
/// Until warm-up completes (or if it failed), every frame reports
/// [`Observation::NoHand`] so the acquisition loop keeps its cadence instead
/// of aborting.
pub struct LocalSource {
    models: ModelConfig,
    detection: DetectionConfig,
    detectors: Option<Detectors>,
}

struct Detectors {
    palm: PalmDetector,
    landmarks: LandmarkDetector,
}

impl LocalSource {
    /// Create an uninitialized local source; call `warm_up` to load models
    #[must_use]
    pub fn new(models: ModelConfig, detection: DetectionConfig) -> Self {
        Self {
            models,
            detection,
            detectors: None,
        }
    }

    /// Whether warm-up has completed successfully
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.detectors.is_some()
    }
}

impl LandmarkSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn warm_up(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            info!("Loading hand detection models");
            let palm = PalmDetector::new(
                &self.models.palm_detector,
                self.detection.confidence_threshold,
                self.detection.nms_threshold,
            )?;
            let landmarks =
                LandmarkDetector::new(&self.models.hand_landmarks, self.detection.presence_threshold)?;
            self.detectors = Some(Detectors { palm, landmarks });
            info!("Hand detection models ready");
            Ok(())
        }
    }

    fn process_frame(&mut self, frame: Mat) -> impl Future<Output = Result<Observation>> + Send {
        async move {
            let Some(detectors) = self.detectors.as_mut() else {
                // Models not loaded yet; report no hand rather than failing
                debug!("Local source not warmed up, reporting no hand");
                return Ok(Observation::NoHand);
            };

            let Some(region) = detectors.palm.detect(&frame)? else {
                return Ok(Observation::NoHand);
            };
            debug!(
                "Hand region {}x{} at ({}, {}), score {:.3}",
                region.bbox.width, region.bbox.height, region.bbox.x, region.bbox.y, region.score
            );

            let crop_rect = expand_to_square(
                region.bbox,
                frame.cols(),
                frame.rows(),
                self.detection.region_shift,
            );
            if crop_rect.width <= 0 || crop_rect.height <= 0 {
                return Ok(Observation::NoHand);
            }

            let crop = Mat::roi(&frame, crop_rect)?;
            let crop_mat = crop.try_clone()?;
            let Some(points) = detectors.landmarks.detect(&crop_mat)? else {
                return Ok(Observation::NoHand);
            };

            let mapped = map_to_frame(&points, crop_rect, frame.cols(), frame.rows());
            match HandLandmarks::from_slice(&mapped) {
                Some(hand) => Ok(Observation::Hand(hand)),
                None => Ok(Observation::NoHand),
            }
        }
    }
}

/// Map crop-normalized landmarks into frame-normalized coordinates.
///
/// Depth stays as the model emitted it; only x and y re-anchor from the crop
/// rectangle to the full frame.
#[allow(clippy::cast_precision_loss)] // Frame dimensions are far below f32 precision limits
fn map_to_frame(points: &[Landmark], crop: Rect, frame_width: i32, frame_height: i32) -> Vec<Landmark> {
    let crop_x = crop.x as f32;
    let crop_y = crop.y as f32;
    let crop_w = crop.width as f32;
    let crop_h = crop.height as f32;
    let frame_w = frame_width as f32;
    let frame_h = frame_height as f32;

    points
        .iter()
        .map(|p| {
            Landmark::new(
                (crop_x + p.x * crop_w) / frame_w,
                (crop_y + p.y * crop_h) / frame_h,
                p.z,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DetectionConfig, ModelConfig};
    use std::path::PathBuf;

    #[test]
    fn test_map_to_frame_anchors_crop_into_frame() {
        let crop = Rect::new(100, 50, 200, 200);
        let points = vec![
            Landmark::new(0.0, 0.0, 0.0),
            Landmark::new(0.5, 0.5, 0.1),
            Landmark::new(1.0, 1.0, -0.2),
        ];

        let mapped = map_to_frame(&points, crop, 640, 480);

        assert!((mapped[0].x - 100.0 / 640.0).abs() < 1e-6);
        assert!((mapped[0].y - 50.0 / 480.0).abs() < 1e-6);
        assert!((mapped[1].x - 200.0 / 640.0).abs() < 1e-6);
        assert!((mapped[1].y - 150.0 / 480.0).abs() < 1e-6);
        assert!((mapped[2].x - 300.0 / 640.0).abs() < 1e-6);
        assert!((mapped[2].y - 250.0 / 480.0).abs() < 1e-6);
    }

    #[test]
    fn test_map_to_frame_preserves_depth() {
        let crop = Rect::new(0, 0, 100, 100);
        let points = vec![Landmark::new(0.5, 0.5, 0.42)];

        let mapped = map_to_frame(&points, crop, 640, 480);
        assert!((mapped[0].z - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_map_to_frame_stays_normalized_for_inner_crop() {
        let crop = Rect::new(40, 40, 400, 400);
        let points: Vec<Landmark> = (0..21)
            .map(|i| Landmark::new(i as f32 / 20.0, i as f32 / 20.0, 0.0))
            .collect();

        let mapped = map_to_frame(&points, crop, 640, 480);
        assert!(mapped
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
    }

    #[tokio::test]
    async fn test_process_frame_before_warm_up_reports_no_hand() {
        let mut source = LocalSource::new(ModelConfig::default(), DetectionConfig::default());
        assert!(!source.is_ready());

        let result = source.process_frame(Mat::default()).await.unwrap();
        assert!(matches!(result, Observation::NoHand));
    }

    #[tokio::test]
    async fn test_warm_up_failure_leaves_source_usable() {
        let models = ModelConfig {
            palm_detector: PathBuf::from("/nonexistent/palm.onnx"),
            hand_landmarks: PathBuf::from("/nonexistent/landmarks.onnx"),
        };
        let mut source = LocalSource::new(models, DetectionConfig::default());

        assert!(source.warm_up().await.is_err());
        assert!(!source.is_ready());

        // Frames still produce a clean "no hand" instead of an error
        let result = source.process_frame(Mat::default()).await.unwrap();
        assert!(matches!(result, Observation::NoHand));
    }
}
