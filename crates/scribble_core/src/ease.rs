//! Easing curves
//!
//! The library ships exactly two curves: straight linear blending and a
//! cubic ease-in-out used as the default for every animated transition.

/// Cubic ease-in-out: `4t³` below the midpoint, mirrored above it
pub fn cubic_ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        (t - 1.0) * u * u + 1.0
    }
}

/// The interpolation curve applied to animated transitions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Cubic ease-in-out
    #[default]
    Smooth,
}

impl Easing {
    /// Map a raw fraction to an eased fraction, clamping into [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Smooth => cubic_ease_in_out(t),
        }
    }

    /// Blend between two scalars with this curve
    pub fn blend(self, begin: f32, end: f32, t: f32) -> f32 {
        let f = self.apply(t);
        begin + (end - begin) * f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_symmetry() {
        // cubicEaseInOut(t) + cubicEaseInOut(1 - t) == 1
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let sum = cubic_ease_in_out(t) + cubic_ease_in_out(1.0 - t);
            assert!((sum - 1.0).abs() < 1e-5, "t = {t}: sum = {sum}");
        }
    }

    #[test]
    fn test_endpoints() {
        for easing in [Easing::Linear, Easing::Smooth] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            // Out-of-range fractions clamp
            assert_eq!(easing.blend(2.0, 8.0, -1.0), 2.0);
            assert_eq!(easing.blend(2.0, 8.0, 1.5), 8.0);
        }
    }

    #[test]
    fn test_linear_midpoint() {
        assert!((Easing::Linear.blend(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_smooth_midpoint() {
        // The cubic curve crosses 0.5 exactly at the midpoint
        assert!((Easing::Smooth.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
