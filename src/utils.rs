//! Utility functions for image processing and coordinate transformations.

pub mod image_conversion;
pub mod safe_cast;

use opencv::core::Rect;
use safe_cast::f32_to_i32_clamp;

/// Expand a detected hand region into a padded square crop.
///
/// The landmark model expects a roughly hand-centered square input, while the
/// region detector produces tight boxes of arbitrary aspect ratio. This pads
/// the box by `shift` of its size on each side, squares it on the longer
/// edge, and slides it back inside the frame when the square would cross a
/// border.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss acceptable for box dimensions
pub fn expand_to_square(region: Rect, max_width: i32, max_height: i32, shift: f32) -> Rect {
    let x_shift = f32_to_i32_clamp(region.width as f32 * shift, 0, max_width);
    let y_shift = f32_to_i32_clamp(region.height as f32 * shift, 0, max_height);

    // Expand the bounding box
    let mut bbox = region;
    bbox.x = (bbox.x - x_shift).max(0);
    bbox.y = (bbox.y - y_shift).max(0);
    bbox.width = (bbox.width + 2 * x_shift).min(max_width - bbox.x);
    bbox.height = (bbox.height + 2 * y_shift).min(max_height - bbox.y);

    // Make it square
    let side_length = bbox.width.max(bbox.height).min(max_width).min(max_height);
    bbox.width = side_length;
    bbox.height = side_length;

    // Ensure it doesn't exceed image boundaries
    if bbox.x + bbox.width > max_width {
        bbox.x = max_width - bbox.width;
    }
    if bbox.y + bbox.height > max_height {
        bbox.y = max_height - bbox.height;
    }

    bbox
}
