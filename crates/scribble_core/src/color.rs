//! RGBA color
//!
//! Channels are bytes in [0, 255] to match the public API of the library;
//! interpolation goes through f32 so animations stay smooth.

use crate::error::{Result, ScribbleError};

/// An RGBA color with byte channels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn grey(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Channel by index: 0 = r, 1 = g, 2 = b, 3 = a
    pub fn channel(self, index: usize) -> u8 {
        match index {
            0 => self.r,
            1 => self.g,
            2 => self.b,
            _ => self.a,
        }
    }

    pub fn set_channel(&mut self, index: usize, value: u8) {
        match index {
            0 => self.r = value,
            1 => self.g = value,
            2 => self.b = value,
            _ => self.a = value,
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        let blend = |a: u8, b: u8| -> u8 {
            (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
        };
        Color::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
            blend(self.a, other.a),
        )
    }

    /// Parse a color from a flat slice, failing fast on wrong arity
    ///
    /// Accepted arities: 1 (grey), 3 (rgb, opaque), 4 (rgba).
    /// Components are clamped into [0, 255].
    pub fn from_slice(components: &[f32]) -> Result<Color> {
        let clamp = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        match components {
            [grey] => Ok(Color::grey(clamp(*grey))),
            [r, g, b] => Ok(Color::rgb(clamp(*r), clamp(*g), clamp(*b))),
            [r, g, b, a] => Ok(Color::new(clamp(*r), clamp(*g), clamp(*b), clamp(*a))),
            _ => Err(ScribbleError::ComponentCount {
                what: "color",
                expected: "1, 3 or 4",
                got: components.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_midpoint() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(mid, Color::grey(128));
    }

    #[test]
    fn test_lerp_identity() {
        let c = Color::new(10, 20, 30, 40);
        assert_eq!(c.lerp(c, 0.33), c);
    }

    #[test]
    fn test_from_slice_arities() {
        assert_eq!(Color::from_slice(&[100.0]).unwrap(), Color::grey(100));
        assert_eq!(
            Color::from_slice(&[10.0, 20.0, 30.0]).unwrap(),
            Color::rgb(10, 20, 30)
        );
        assert_eq!(
            Color::from_slice(&[10.0, 20.0, 30.0, 40.0]).unwrap(),
            Color::new(10, 20, 30, 40)
        );
        assert!(Color::from_slice(&[1.0, 2.0]).is_err());
        assert!(Color::from_slice(&[]).is_err());
    }

    #[test]
    fn test_from_slice_clamps() {
        assert_eq!(Color::from_slice(&[300.0]).unwrap(), Color::grey(255));
        assert_eq!(Color::from_slice(&[-5.0]).unwrap(), Color::grey(0));
    }
}
