//! Image conversion utilities bridging OpenCV Mats, ndarray tensors, and the
//! base64 JPEG wire format of the remote inference service.

use base64::Engine as _;
use ndarray::Array4;
use opencv::core::{Mat, MatTraitConst, Vector};
use opencv::imgcodecs;

use crate::utils::safe_cast::usize_to_i32;
use crate::Result;

/// Convert a preprocessed `CV_32FC3` Mat into an NCHW tensor.
///
/// The Mat is expected to already be resized, color-converted and scaled; this
/// only rearranges the pixel layout into the (1, 3, height, width) shape the
/// ONNX models take.
///
/// # Errors
///
/// Returns an error if the Mat is empty, is not three-channel, or its
/// elements are not `f32`.
pub fn mat_to_nchw_tensor(mat: &Mat) -> Result<Array4<f32>> {
    let rows = mat.rows();
    let cols = mat.cols();
    let channels = mat.channels();

    if rows <= 0 || cols <= 0 || channels != 3 {
        return Err(crate::error::Error::InvalidInput(format!(
            "Expected a non-empty 3-channel Mat, got {rows}x{cols}x{channels}"
        )));
    }

    let height = rows as usize;
    let width = cols as usize;

    let mut tensor = Array4::<f32>::zeros((1, 3, height, width));
    for row in 0..height {
        for col in 0..width {
            let pixel = mat.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
            tensor[[0, 0, row, col]] = pixel[0];
            tensor[[0, 1, row, col]] = pixel[1];
            tensor[[0, 2, row, col]] = pixel[2];
        }
    }

    Ok(tensor)
}

/// Encode a BGR frame as JPEG and base64 for the remote inference request.
///
/// The service expects the bare base64 payload without a `data:` URL prefix.
///
/// # Errors
///
/// Returns an error if JPEG encoding fails.
pub fn encode_jpeg_base64(frame: &Mat, quality: i32) -> Result<String> {
    let mut buffer = Vector::<u8>::new();
    let params = Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, quality]);

    let encoded = imgcodecs::imencode(".jpg", frame, &mut buffer, &params)?;
    if !encoded {
        return Err(crate::error::Error::InvalidInput(
            "JPEG encoding failed".to_string(),
        ));
    }

    Ok(base64::engine::general_purpose::STANDARD.encode(buffer.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_32FC3, CV_8UC3};

    #[test]
    fn test_mat_to_nchw_tensor_shape_and_layout() {
        let mat = Mat::new_rows_cols_with_default(
            2,
            3,
            CV_32FC3,
            Scalar::new(0.1, 0.2, 0.3, 0.0),
        )
        .unwrap();

        let tensor = mat_to_nchw_tensor(&mat).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 3]);
        assert!((tensor[[0, 0, 0, 0]] - 0.1).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]] - 0.2).abs() < 1e-6);
        assert!((tensor[[0, 2, 1, 2]] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_mat_to_nchw_tensor_rejects_empty_mat() {
        let mat = Mat::default();
        assert!(mat_to_nchw_tensor(&mat).is_err());
    }

    #[test]
    fn test_encode_jpeg_base64_produces_bare_jpeg_payload() {
        let frame = Mat::new_rows_cols_with_default(
            48,
            64,
            CV_8UC3,
            Scalar::new(90.0, 120.0, 200.0, 0.0),
        )
        .unwrap();

        let encoded = encode_jpeg_base64(&frame, 90).unwrap();
        assert!(!encoded.is_empty());
        assert!(!encoded.starts_with("data:"));
        // JPEG magic bytes FF D8 FF encode to this base64 prefix
        assert!(encoded.starts_with("/9j/"));

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(&decoded[..3], &[0xFF, 0xD8, 0xFF]);
    }
}
