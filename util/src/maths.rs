//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range [min, max].
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Return zero if the magnitude of `value` is below `threshold`, otherwise return `value`.
pub fn deadzone<T>(value: T, threshold: T) -> T
where
    T: Float,
{
    if value.abs() < threshold {
        T::zero()
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(300.0, -255.0, 255.0), 255.0);
        assert_eq!(clamp(-300.0, -255.0, 255.0), -255.0);
        assert_eq!(clamp(12.5, -255.0, 255.0), 12.5);
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(deadzone(0.05f32, 0.1), 0.0);
        assert_eq!(deadzone(-0.05f32, 0.1), 0.0);
        assert_eq!(deadzone(0.5f32, 0.1), 0.5);
        assert_eq!(deadzone(-0.1f32, 0.1), -0.1);
    }
}
