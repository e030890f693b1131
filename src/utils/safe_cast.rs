//! Safe casting utilities for OpenCV pixel and index arithmetic

use crate::{Error, Result};

/// Convert usize to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds `i32::MAX`
pub fn usize_to_i32(value: usize) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Clamp and convert f32 to i32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_precision_loss)] // Acceptable for clamping bounds
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f32_to_i32_clamp(value: f32, min: i32, max: i32) -> i32 {
    // Ensure min <= max
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(min as f32, max as f32);

    // Ensure result is within bounds after conversion
    let result = clamped as i32;
    result.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_usize_to_i32() {
        assert_eq!(usize_to_i32(42).unwrap(), 42);
        assert_eq!(usize_to_i32(0).unwrap(), 0);
        assert_eq!(usize_to_i32(i32::MAX as usize).unwrap(), i32::MAX);

        // On 64-bit systems, this should fail
        if std::mem::size_of::<usize>() > 4 {
            assert!(usize_to_i32(i32::MAX as usize + 1).is_err());
        }
    }

    #[test]
    fn test_f32_to_i32_clamp() {
        assert_eq!(f32_to_i32_clamp(50.0, 0, 100), 50);
        assert_eq!(f32_to_i32_clamp(-10.0, 0, 100), 0);
        assert_eq!(f32_to_i32_clamp(150.0, 0, 100), 100);
        assert_eq!(f32_to_i32_clamp(f32::NAN, 0, 100), 0);
    }

    #[test]
    fn test_f32_to_i32_clamp_edge_cases() {
        // Extreme bounds
        assert_eq!(f32_to_i32_clamp(50.0, i32::MIN, i32::MAX), 50);
        assert_eq!(f32_to_i32_clamp(f32::INFINITY, 0, 100), 0); // Non-finite returns min
        assert_eq!(f32_to_i32_clamp(f32::NEG_INFINITY, 0, 100), 0); // Non-finite returns min

        // Negative bounds
        assert_eq!(f32_to_i32_clamp(-50.0, -100, -10), -50);
        assert_eq!(f32_to_i32_clamp(-150.0, -100, -10), -100);
        assert_eq!(f32_to_i32_clamp(0.0, -100, -10), -10);

        // Identical bounds
        assert_eq!(f32_to_i32_clamp(50.0, 42, 42), 42);
        assert_eq!(f32_to_i32_clamp(f32::NAN, 42, 42), 42);
    }

    // Property-based tests
    proptest! {
        #[test]
        fn prop_usize_to_i32_within_bounds(value in 0..=i32::MAX as usize) {
            let result = usize_to_i32(value);
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap() as usize, value);
        }

        #[test]
        fn prop_f32_to_i32_clamp_always_within_bounds(
            value in any::<f32>(),
            min in any::<i32>(),
            max in any::<i32>()
        ) {
            let (min, max) = if min <= max { (min, max) } else { (max, min) };
            let result = f32_to_i32_clamp(value, min, max);
            prop_assert!(result >= min);
            prop_assert!(result <= max);
        }

        #[test]
        fn prop_f32_to_i32_clamp_preserves_finite_values(
            min in i32::MIN/2..=0i32,
            max in 0..=i32::MAX/2
        ) {
            let value = (min + max) as f32 / 2.0;
            let result = f32_to_i32_clamp(value, min, max);
            prop_assert!(result >= min);
            prop_assert!(result <= max);
            prop_assert!((result as f32 - value).abs() < 1.0);
        }
    }
}
