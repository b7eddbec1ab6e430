//! Geometric primitives

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::error::{Result, ScribbleError};

/// A 2D point / vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    /// Angle of the vector in radians (atan2 convention)
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Rotate around the origin by `radians`
    pub fn rotated(self, radians: f32) -> Point {
        let (sin, cos) = radians.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Parse a point from a flat slice, failing fast on wrong arity
    pub fn from_slice(components: &[f32]) -> Result<Point> {
        match components {
            [x, y] => Ok(Point::new(*x, *y)),
            _ => Err(ScribbleError::ComponentCount {
                what: "position",
                expected: "2",
                got: components.len(),
            }),
        }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Point {
        Point::new(x, y)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Point {
        Point::new(x, y)
    }
}

/// A closed polygon outline (last vertex implicitly connects to the first)
pub type Outline = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_ops() {
        let p = Point::new(3.0, 4.0);
        assert!((p.length() - 5.0).abs() < 1e-6);
        assert_eq!(p + Point::new(1.0, 1.0), Point::new(4.0, 5.0));
        assert_eq!(p * 2.0, Point::new(6.0, 8.0));
    }

    #[test]
    fn test_rotated_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_slice_arity() {
        assert!(Point::from_slice(&[1.0, 2.0]).is_ok());
        assert!(matches!(
            Point::from_slice(&[1.0]),
            Err(ScribbleError::ComponentCount { got: 1, .. })
        ));
        assert!(Point::from_slice(&[1.0, 2.0, 3.0]).is_err());
    }
}
