use crate::constants::{COORDS_PER_LANDMARK, LANDMARK_TOTAL_VALUES, NUM_HAND_LANDMARKS};
use crate::landmarks::Landmark;
use crate::utils::image_conversion::mat_to_nchw_tensor;
use crate::Result;
use ndarray::{Array1, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Default hand landmark model input size
const DEFAULT_LANDMARK_INPUT_SIZE: i32 = 224;

/// Hand landmark regressor using `ONNX` Runtime.
///
/// Runs on a cropped hand region and returns 21 landmarks in coordinates
/// normalized to the crop. A presence output, when the model provides one,
/// gates the result so an empty crop yields no landmarks instead of noise.
pub struct LandmarkDetector {
    session: Session,
    #[allow(dead_code)] // Reserved for future named tensor support
    input_name: String,
    #[allow(dead_code)] // Reserved for future named tensor support
    output_name: String,
    input_size: i32,
    presence_threshold: f32,
}

impl LandmarkDetector {
    /// Create a new landmark detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has an unexpected structure
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, presence_threshold: f32) -> Result<Self> {
        log::info!(
            "Initializing LandmarkDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("landmark_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        // Get model input/output metadata
        let input_name = session
            .inputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelInputError("Model has no inputs".to_string()))?
            .name
            .clone();

        let output_name = session
            .outputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Model has no outputs".to_string()))?
            .name
            .clone();

        // Default hand landmark model input size
        let input_size = DEFAULT_LANDMARK_INPUT_SIZE;

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size,
            presence_threshold,
        })
    }

    /// Detect hand landmarks in a cropped hand region
    ///
    /// Returns `Ok(None)` when the model reports that no hand is present in
    /// the crop.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Image preprocessing fails
    /// - The ONNX model inference fails
    /// - The output tensor has an unexpected shape
    pub fn detect(&self, hand_image: &Mat) -> Result<Option<Vec<Landmark>>> {
        let preprocessed = self.preprocess(hand_image)?;

        let (marks, presence) = self.forward(preprocessed)?;

        if let Some(score) = presence {
            if score < self.presence_threshold {
                log::debug!("Hand presence score {score:.3} below threshold, discarding crop");
                return Ok(None);
            }
        }

        decode_landmarks(marks.as_slice().unwrap_or(&[]), self.input_size).map(Some)
    }

    /// Resize, convert to RGB, and normalize pixels to [0, 1]
    fn preprocess(&self, image: &Mat) -> Result<ndarray::Array4<f32>> {
        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        mat_to_nchw_tensor(&float_image)
    }

    /// Run forward pass, returning the raw landmark values and the presence
    /// score when the model has one
    fn forward(&self, inputs: ndarray::Array4<f32>) -> Result<(Array1<f32>, Option<f32>)> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        if outputs.is_empty() {
            return Err(crate::error::Error::ModelOutputError(
                "No output from model".to_string(),
            ));
        }

        let marks_tensor = outputs[0].try_extract::<f32>()?;
        let marks_view = marks_tensor.view();
        let marks_data = marks_view
            .as_slice()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to get output data".to_string()))?;
        let marks = Array1::from(marks_data.to_vec());

        // Second output, when present, is the hand presence score
        let presence = if outputs.len() > 1 {
            let presence_tensor = outputs[1].try_extract::<f32>()?;
            let presence_view = presence_tensor.view();
            presence_view.as_slice().and_then(|s| s.first().copied())
        } else {
            None
        };

        Ok((marks, presence))
    }
}

/// Convert raw model output into crop-normalized landmarks.
///
/// Accepts either 63 values (x, y, z per landmark) or 42 values (x, y per
/// landmark, with depth filled in as zero). Coordinates arrive in input
/// pixel units and are divided down to the [0, 1] range of the crop.
fn decode_landmarks(marks: &[f32], input_size: i32) -> Result<Vec<Landmark>> {
    let scale = input_size as f32;

    if marks.len() == LANDMARK_TOTAL_VALUES {
        let landmarks = marks
            .chunks_exact(COORDS_PER_LANDMARK)
            .map(|c| Landmark::new(c[0] / scale, c[1] / scale, c[2] / scale))
            .collect();
        return Ok(landmarks);
    }

    if marks.len() == NUM_HAND_LANDMARKS * 2 {
        let landmarks = marks
            .chunks_exact(2)
            .map(|c| Landmark::new(c[0] / scale, c[1] / scale, 0.0))
            .collect();
        return Ok(landmarks);
    }

    Err(crate::error::Error::ModelValidationError(format!(
        "Expected {} or {} landmark values, got {}",
        LANDMARK_TOTAL_VALUES,
        NUM_HAND_LANDMARKS * 2,
        marks.len()
    )))
}
