use crate::constants::{IMAGE_NORMALIZATION_OFFSET, IMAGE_NORMALIZATION_SCALE};
use crate::utils::image_conversion::mat_to_nchw_tensor;
use crate::Result;
use ndarray::{s, Array1, Array2};
use opencv::core::{Mat, Rect, Scalar, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A detected hand region in frame pixel coordinates
#[derive(Debug, Clone)]
pub struct HandRegion {
    /// Bounding box of the detected hand
    pub bbox: Rect,
    /// Confidence score of the detection
    pub score: f32,
}

/// Anchor-based hand region detector using `ONNX` Runtime.
///
/// The model predicts per-anchor scores and center-relative box distances at
/// two or three strides. Only the best surviving box is returned since the
/// pipeline tracks a single hand.
pub struct PalmDetector {
    session: Session,
    input_name: String,
    input_size: (i32, i32),
    conf_threshold: f32,
    nms_threshold: f32,
    num_anchors: usize,
    strides: Vec<i32>,
    offset: usize,
    center_cache: HashMap<(i32, i32, i32), Array2<f32>>,
}

impl PalmDetector {
    /// Create a new palm detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or has no inputs.
    pub fn new<P: AsRef<Path>>(model_path: P, conf_threshold: f32, nms_threshold: f32) -> Result<Self> {
        log::info!(
            "Initializing PalmDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("palm_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelError("Model has no inputs".to_string()))?;

        let input_name = input_meta.name.clone();
        let input_shape = &input_meta.dimensions;

        // Extract input size from shape [batch, channels, height, width]
        let input_size = if input_shape.len() >= 4 {
            let height = input_shape[2].unwrap_or(192) as i32;
            let width = input_shape[3].unwrap_or(192) as i32;
            (width, height)
        } else {
            (192, 192)
        };

        // Score outputs come first, box outputs follow, one pair per stride
        let num_outputs = session.outputs.len();
        let (offset, strides, num_anchors) = match num_outputs {
            4 => (2, vec![8, 16], 2),
            6 => (3, vec![8, 16, 32], 2),
            _ => {
                log::warn!(
                    "Unknown model configuration with {} outputs, using defaults",
                    num_outputs
                );
                (2, vec![8, 16], 2)
            }
        };

        Ok(Self {
            session,
            input_name,
            input_size,
            conf_threshold,
            nms_threshold,
            num_anchors,
            strides,
            offset,
            center_cache: HashMap::new(),
        })
    }

    /// Name of the model input tensor
    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Detect the most confident hand region in a frame, if any
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails.
    pub fn detect(&mut self, image: &Mat) -> Result<Option<HandRegion>> {
        let img_height = image.rows();
        let img_width = image.cols();
        if img_height <= 0 || img_width <= 0 {
            return Err(crate::error::Error::InvalidInput(
                "Cannot run detection on an empty frame".to_string(),
            ));
        }

        // Aspect-preserving resize into the top-left of a padded square input
        let ratio_img = img_height as f32 / img_width as f32;
        let (input_width, input_height) = self.input_size;
        let ratio_model = input_height as f32 / input_width as f32;

        let (new_width, new_height) = if ratio_img > ratio_model {
            let new_height = input_height;
            let new_width = (new_height as f32 / ratio_img) as i32;
            (new_width, new_height)
        } else {
            let new_width = input_width;
            let new_height = (new_width as f32 * ratio_img) as i32;
            (new_width, new_height)
        };

        let det_scale = new_height as f32 / img_height as f32;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(new_width, new_height),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut det_img = Mat::new_rows_cols_with_default(
            input_height,
            input_width,
            opencv::core::CV_8UC3,
            Scalar::all(0.0),
        )?;
        let mut roi = det_img.roi_mut(Rect::new(0, 0, new_width, new_height))?;
        resized.copy_to(&mut roi)?;

        let (scores, boxes) = self.forward(&det_img)?;
        Ok(self.postprocess(&scores, &boxes, det_scale, (img_width, img_height)))
    }

    /// Run preprocessing and the forward pass, returning score-filtered
    /// candidate boxes in model input coordinates
    fn forward(&mut self, det_img: &Mat) -> Result<(Array1<f32>, Array2<f32>)> {
        // Convert BGR to RGB and map pixels to roughly [-1, 1]
        let mut rgb_image = Mat::default();
        imgproc::cvt_color(det_img, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(
            &mut float_image,
            CV_32F,
            1.0 / f64::from(IMAGE_NORMALIZATION_SCALE),
            -f64::from(IMAGE_NORMALIZATION_OFFSET) / f64::from(IMAGE_NORMALIZATION_SCALE),
        )?;

        let inputs = mat_to_nchw_tensor(&float_image)?;
        let input_height = inputs.shape()[2] as i32;
        let input_width = inputs.shape()[3] as i32;

        let cow_array = ndarray::CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;
        let outputs = self.session.run(vec![input_tensor])?;

        let mut kept_scores = Vec::new();
        let mut kept_boxes = Vec::new();

        for (idx, &stride) in self.strides.iter().enumerate() {
            let scores_output = outputs[idx].try_extract::<f32>()?;
            let scores_view = scores_output.view();
            let scores = scores_view.as_slice().ok_or_else(|| {
                crate::error::Error::ModelOutputError("Score output is not contiguous".to_string())
            })?;

            let bbox_output = outputs[idx + self.offset].try_extract::<f32>()?;
            let bbox_view = bbox_output.view();
            let distances: Vec<f32> = bbox_view
                .as_slice()
                .ok_or_else(|| {
                    crate::error::Error::ModelOutputError("Box output is not contiguous".to_string())
                })?
                .iter()
                .map(|&x| x * stride as f32)
                .collect();

            let height = input_height / stride;
            let width = input_width / stride;
            let key = (height, width, stride);
            let anchor_centers = if let Some(centers) = self.center_cache.get(&key) {
                centers.clone()
            } else {
                let centers = anchor_centers(height, width, stride, self.num_anchors);
                if self.center_cache.len() < 100 {
                    self.center_cache.insert(key, centers.clone());
                }
                centers
            };

            let n_anchors = anchor_centers.shape()[0].min(scores.len()).min(distances.len() / 4);
            for i in 0..n_anchors {
                if scores[i] < self.conf_threshold {
                    continue;
                }
                let decoded = distance_to_box(
                    (anchor_centers[[i, 0]], anchor_centers[[i, 1]]),
                    &distances[i * 4..i * 4 + 4],
                );
                kept_scores.push(scores[i]);
                kept_boxes.extend_from_slice(&decoded);
            }
        }

        let n_kept = kept_scores.len();
        let boxes = Array2::from_shape_vec((n_kept, 4), kept_boxes).map_err(|e| {
            crate::error::Error::ModelDataFormatError(format!("Failed to collect boxes: {e}"))
        })?;
        Ok((Array1::from(kept_scores), boxes))
    }

    /// Sort candidates, suppress overlaps, and keep the single best region
    fn postprocess(
        &self,
        scores: &Array1<f32>,
        boxes: &Array2<f32>,
        det_scale: f32,
        img_shape: (i32, i32),
    ) -> Option<HandRegion> {
        if scores.is_empty() {
            return None;
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Scale boxes back to original frame size
        let scaled: Array2<f32> = boxes / det_scale;
        let keep = nms(&scaled, &order, self.nms_threshold);
        let best = *keep.first()?;

        let (img_width, img_height) = img_shape;
        let x1 = scaled[[best, 0]].max(0.0).min(img_width as f32 - 1.0);
        let y1 = scaled[[best, 1]].max(0.0).min(img_height as f32 - 1.0);
        let x2 = scaled[[best, 2]].max(0.0).min(img_width as f32);
        let y2 = scaled[[best, 3]].max(0.0).min(img_height as f32);
        let width = x2 - x1;
        let height = y2 - y1;
        if width < 1.0 || height < 1.0 {
            return None;
        }

        Some(HandRegion {
            bbox: Rect::new(x1 as i32, y1 as i32, width as i32, height as i32),
            score: scores[best],
        })
    }
}

/// Anchor center grid for one stride, in model input pixel coordinates
fn anchor_centers(height: i32, width: i32, stride: i32, num_anchors: usize) -> Array2<f32> {
    let mut centers = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let cx = (x * stride) as f32;
            let cy = (y * stride) as f32;
            for _ in 0..num_anchors {
                centers.push(cx);
                centers.push(cy);
            }
        }
    }

    let n_points = (height * width) as usize * num_anchors;
    Array2::from_shape_vec((n_points, 2), centers)
        .unwrap_or_else(|_| Array2::zeros((0, 2)))
}

/// Decode a center-relative (left, top, right, bottom) distance prediction
/// into an (x1, y1, x2, y2) box
fn distance_to_box(center: (f32, f32), distances: &[f32]) -> [f32; 4] {
    let (cx, cy) = center;
    [
        cx - distances[0],
        cy - distances[1],
        cx + distances[2],
        cy + distances[3],
    ]
}

/// Greedy IoU suppression over score-ordered candidates; returns surviving
/// positions in `order`'s ranking
fn nms(boxes: &Array2<f32>, order: &[usize], threshold: f32) -> Vec<usize> {
    let mut keep = Vec::new();
    let mut order = order.to_vec();

    while !order.is_empty() {
        let i = order[0];
        keep.push(i);

        if order.len() == 1 {
            break;
        }

        let row_i = boxes.slice(s![i, ..]);
        let area_i = (row_i[2] - row_i[0] + 1.0) * (row_i[3] - row_i[1] + 1.0);

        let mut remaining = Vec::new();
        for &j in order.iter().skip(1) {
            let row_j = boxes.slice(s![j, ..]);
            let area_j = (row_j[2] - row_j[0] + 1.0) * (row_j[3] - row_j[1] + 1.0);

            let x1 = row_i[0].max(row_j[0]);
            let y1 = row_i[1].max(row_j[1]);
            let x2 = row_i[2].min(row_j[2]);
            let y2 = row_i[3].min(row_j[3]);

            let w = (x2 - x1 + 1.0).max(0.0);
            let h = (y2 - y1 + 1.0).max(0.0);
            let inter = w * h;
            let iou = inter / (area_i + area_j - inter);

            if iou <= threshold {
                remaining.push(j);
            }
        }

        order = remaining;
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_box_decodes_around_center() {
        let decoded = distance_to_box((100.0, 100.0), &[10.0, 10.0, 20.0, 20.0]);
        assert_eq!(decoded, [90.0, 90.0, 120.0, 120.0]);
    }

    #[test]
    fn test_anchor_centers_cover_the_grid() {
        let centers = anchor_centers(2, 3, 8, 2);
        // 2 rows x 3 cols x 2 anchors
        assert_eq!(centers.shape(), &[12, 2]);
        assert_eq!(centers[[0, 0]], 0.0);
        assert_eq!(centers[[0, 1]], 0.0);
        // Both anchors of a cell share the same center
        assert_eq!(centers[[1, 0]], centers[[0, 0]]);
        // Last cell center
        assert_eq!(centers[[11, 0]], 16.0);
        assert_eq!(centers[[11, 1]], 8.0);
    }

    #[test]
    fn test_nms_suppresses_heavy_overlap() {
        let boxes = Array2::from_shape_vec(
            (3, 4),
            vec![
                10.0, 10.0, 50.0, 50.0, // best box
                12.0, 12.0, 52.0, 52.0, // near-duplicate, should be dropped
                200.0, 200.0, 240.0, 240.0, // far away, should survive
            ],
        )
        .unwrap();
        let order = vec![0, 1, 2];

        let keep = nms(&boxes, &order, 0.4);
        assert_eq!(keep, vec![0, 2]);
    }

    #[test]
    fn test_nms_keeps_all_disjoint_boxes() {
        let boxes = Array2::from_shape_vec(
            (2, 4),
            vec![0.0, 0.0, 10.0, 10.0, 100.0, 100.0, 110.0, 110.0],
        )
        .unwrap();
        let keep = nms(&boxes, &[0, 1], 0.4);
        assert_eq!(keep.len(), 2);
    }
}
