//! Interpolation values
//!
//! Every animatable quantity lowers into a [`Value`] tree: scalars stay
//! scalars, 2D points become two-element lists, colors four-element lists,
//! and vertex outlines become lists of point lists. Interpolation recurses
//! into nested lists element-wise.
//!
//! Lists of unequal length are right-padded by repeating the last element
//! of the shorter side before blending. This is long-standing documented
//! behavior that client scripts rely on, not an error.

use crate::color::Color;
use crate::ease::Easing;
use crate::geometry::{Outline, Point};

/// A recursive interpolation tree
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f32),
    List(Vec<Value>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(s) => Some(*s),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Scalar(_) => None,
            Value::List(items) => Some(items),
        }
    }

    /// Interpolate between two value trees at `fraction` with `easing`
    ///
    /// Scalars blend through the easing curve; lists recurse element-wise
    /// with the right-padding rule for unequal lengths. Mismatched kinds
    /// (scalar vs. list) cannot blend and snap to the end value.
    pub fn interpolate(begin: &Value, end: &Value, fraction: f32, easing: Easing) -> Value {
        match (begin, end) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(easing.blend(*a, *b, fraction)),
            (Value::List(a), Value::List(b)) => {
                let len = a.len().max(b.len());
                let mut items = Vec::with_capacity(len);
                for i in 0..len {
                    let bv = a.get(i).or_else(|| a.last());
                    let ev = b.get(i).or_else(|| b.last());
                    match (bv, ev) {
                        (Some(bv), Some(ev)) => {
                            items.push(Value::interpolate(bv, ev, fraction, easing));
                        }
                        (Some(v), None) | (None, Some(v)) => items.push(v.clone()),
                        (None, None) => {}
                    }
                }
                Value::List(items)
            }
            (_, end) => end.clone(),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Value {
        Value::Scalar(value)
    }
}

/// Conversion between typed property values and the [`Value`] tree
///
/// `from_value` is total: a malformed tree falls back to defaults instead
/// of panicking, since interpolated trees always originate from `to_value`.
pub trait AnimValue: Clone {
    fn to_value(&self) -> Value;
    fn from_value(value: &Value) -> Self;
}

impl AnimValue for f32 {
    fn to_value(&self) -> Value {
        Value::Scalar(*self)
    }

    fn from_value(value: &Value) -> f32 {
        match value {
            Value::Scalar(s) => *s,
            Value::List(items) => items.first().map(f32::from_value).unwrap_or(0.0),
        }
    }
}

impl AnimValue for Point {
    fn to_value(&self) -> Value {
        Value::List(vec![Value::Scalar(self.x), Value::Scalar(self.y)])
    }

    fn from_value(value: &Value) -> Point {
        match value {
            Value::Scalar(s) => Point::new(*s, *s),
            Value::List(items) => {
                let x = items.first().and_then(Value::as_scalar).unwrap_or(0.0);
                let y = items.get(1).and_then(Value::as_scalar).unwrap_or(0.0);
                Point::new(x, y)
            }
        }
    }
}

impl AnimValue for Color {
    fn to_value(&self) -> Value {
        Value::List(vec![
            Value::Scalar(self.r as f32),
            Value::Scalar(self.g as f32),
            Value::Scalar(self.b as f32),
            Value::Scalar(self.a as f32),
        ])
    }

    fn from_value(value: &Value) -> Color {
        let channel = |v: Option<f32>| v.unwrap_or(0.0).round().clamp(0.0, 255.0) as u8;
        match value {
            Value::Scalar(s) => Color::grey(channel(Some(*s))),
            Value::List(items) => Color::new(
                channel(items.first().and_then(Value::as_scalar)),
                channel(items.get(1).and_then(Value::as_scalar)),
                channel(items.get(2).and_then(Value::as_scalar)),
                channel(items.get(3).and_then(Value::as_scalar)),
            ),
        }
    }
}

impl AnimValue for Outline {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Point::to_value).collect())
    }

    fn from_value(value: &Value) -> Outline {
        match value {
            Value::Scalar(_) => Vec::new(),
            Value::List(items) => items.iter().map(Point::from_value).collect(),
        }
    }
}

impl AnimValue for bool {
    fn to_value(&self) -> Value {
        Value::Scalar(if *self { 1.0 } else { 0.0 })
    }

    fn from_value(value: &Value) -> bool {
        f32::from_value(value) != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_interpolation_is_exact() {
        // interpolate(v, v, f) == v for any fraction
        let cases = [
            Value::Scalar(7.25),
            Point::new(1.5, -2.5).to_value(),
            Color::new(10, 20, 30, 40).to_value(),
            vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)].to_value(),
        ];
        for v in cases {
            for frac in [0.0, 0.3, 0.5, 0.99, 1.0] {
                assert_eq!(Value::interpolate(&v, &v, frac, Easing::Linear), v);
                assert_eq!(Value::interpolate(&v, &v, frac, Easing::Smooth), v);
            }
        }
    }

    #[test]
    fn test_scalar_blend() {
        let v = Value::interpolate(
            &Value::Scalar(0.0),
            &Value::Scalar(100.0),
            0.25,
            Easing::Linear,
        );
        assert_eq!(v, Value::Scalar(25.0));
    }

    #[test]
    fn test_nested_recursion() {
        let begin = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)].to_value();
        let end = vec![Point::new(10.0, 20.0), Point::new(30.0, 40.0)].to_value();
        let mid = Value::interpolate(&begin, &end, 0.5, Easing::Linear);
        let outline = Outline::from_value(&mid);
        assert_eq!(outline, vec![Point::new(5.0, 10.0), Point::new(15.0, 20.0)]);
    }

    #[test]
    fn test_unequal_lists_right_pad() {
        // The shorter side repeats its last element
        let begin = Value::List(vec![Value::Scalar(0.0), Value::Scalar(10.0)]);
        let end = Value::List(vec![
            Value::Scalar(100.0),
            Value::Scalar(100.0),
            Value::Scalar(100.0),
        ]);
        let v = Value::interpolate(&begin, &end, 1.0, Easing::Linear);
        assert_eq!(
            v,
            Value::List(vec![
                Value::Scalar(100.0),
                Value::Scalar(100.0),
                Value::Scalar(100.0),
            ])
        );
        let v = Value::interpolate(&begin, &end, 0.5, Easing::Linear);
        // Third element blends from the repeated 10.0
        assert_eq!(
            v,
            Value::List(vec![
                Value::Scalar(50.0),
                Value::Scalar(55.0),
                Value::Scalar(55.0),
            ])
        );
    }

    #[test]
    fn test_color_roundtrip_through_value() {
        let c = Color::new(200, 150, 30, 255);
        assert_eq!(Color::from_value(&c.to_value()), c);
    }

    #[test]
    fn test_from_value_is_total() {
        // Malformed trees fall back to defaults instead of panicking
        assert_eq!(f32::from_value(&Value::List(vec![])), 0.0);
        assert_eq!(Point::from_value(&Value::Scalar(2.0)), Point::new(2.0, 2.0));
        assert_eq!(Outline::from_value(&Value::Scalar(1.0)), Vec::new());
    }
}
