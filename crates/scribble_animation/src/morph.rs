//! Outline morphing
//!
//! Blending one polygon into another needs matching vertex counts and a
//! sensible correspondence. The pipeline is: resample both outlines to the
//! larger vertex count by walking their perimeters in equal arc-length
//! steps, pick the cyclic rotation of the source that minimizes the summed
//! vertex distance, then blend per vertex. Outlines here are small (tens of
//! points), so the brute-force O(n²) alignment is fine.

use scribble_core::{Outline, Point};
use smallvec::SmallVec;

/// Parameter used for a point on a zero-length edge
const DEGENERATE_EDGE_T: f32 = 0.01;

/// Resample a closed outline to `count` vertices spaced by equal arc length
///
/// An outline that already has `count` vertices is returned unchanged, so
/// morphing between same-sized outlines is exact at the endpoints.
pub fn resample(outline: &[Point], count: usize) -> Outline {
    if outline.is_empty() || count == 0 {
        return Vec::new();
    }
    if outline.len() == count {
        return outline.to_vec();
    }

    let n = outline.len();
    let mut edges: SmallVec<[f32; 32]> = SmallVec::with_capacity(n);
    let mut total = 0.0f32;
    for i in 0..n {
        let len = outline[i].distance(outline[(i + 1) % n]);
        edges.push(len);
        total += len;
    }
    // All vertices coincide: every sample lands on the same point
    if total <= f32::EPSILON {
        return vec![outline[0]; count];
    }

    let step = total / count as f32;
    let mut result = Vec::with_capacity(count);
    let mut edge = 0usize;
    let mut walked = 0.0f32;
    for k in 0..count {
        let s = step * k as f32;
        while edge < n - 1 && s > walked + edges[edge] {
            walked += edges[edge];
            edge += 1;
        }
        let a = outline[edge];
        let b = outline[(edge + 1) % n];
        let t = if edges[edge] > f32::EPSILON {
            ((s - walked) / edges[edge]).clamp(0.0, 1.0)
        } else {
            DEGENERATE_EDGE_T
        };
        result.push(a.lerp(b, t));
    }
    result
}

/// Cyclic rotation of `from` that best aligns it with `to`
///
/// Returns the shift minimizing the summed Euclidean distance between
/// `from[(i + shift) % n]` and `to[i]`.
pub fn best_shift(from: &[Point], to: &[Point]) -> usize {
    let n = from.len().min(to.len());
    if n == 0 {
        return 0;
    }
    let mut best = 0usize;
    let mut best_cost = f32::INFINITY;
    for shift in 0..n {
        let mut cost = 0.0f32;
        for i in 0..n {
            cost += from[(i + shift) % n].distance(to[i]);
        }
        if cost < best_cost {
            best_cost = cost;
            best = shift;
        }
    }
    best
}

/// Blend `begin` into `end` at `fraction` (0 = begin, 1 = end)
///
/// An empty outline on either side cannot be matched and yields the other
/// outline unchanged.
pub fn morph(begin: &[Point], end: &[Point], fraction: f32) -> Outline {
    if begin.is_empty() {
        return end.to_vec();
    }
    if end.is_empty() {
        return begin.to_vec();
    }
    let count = begin.len().max(end.len());
    let from = resample(begin, count);
    let to = resample(end, count);
    let shift = best_shift(&from, &to);
    (0..count)
        .map(|i| from[(i + shift) % count].lerp(to[i], fraction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Outline {
        vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ]
    }

    fn assert_point_eq(a: Point, b: Point) {
        assert!(a.distance(b) < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_resample_same_count_is_identity() {
        let sq = square();
        assert_eq!(resample(&sq, 4), sq);
    }

    #[test]
    fn test_resample_square_to_eight() {
        // Equal arc-length steps land on corners and edge midpoints
        let resampled = resample(&square(), 8);
        assert_eq!(resampled.len(), 8);
        let expected = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(1.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(0.0, 1.0),
        ];
        for (got, want) in resampled.iter().zip(expected) {
            assert_point_eq(*got, want);
        }
    }

    #[test]
    fn test_resample_degenerate_outline() {
        let flat = vec![Point::new(1.0, 1.0); 3];
        let resampled = resample(&flat, 6);
        assert_eq!(resampled, vec![Point::new(1.0, 1.0); 6]);
    }

    #[test]
    fn test_best_shift_recovers_rotation() {
        let sq = square();
        for rot in 0..4 {
            let rotated: Outline = (0..4).map(|i| sq[(i + rot) % 4]).collect();
            let shift = best_shift(&sq, &rotated);
            let cost: f32 = (0..4)
                .map(|i| sq[(i + shift) % 4].distance(rotated[i]))
                .sum();
            assert!(cost < 1e-5, "rot = {rot}: cost = {cost}");
        }
    }

    #[test]
    fn test_morph_endpoints() {
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ];
        let pentagon: Outline = (0..5)
            .map(|i| {
                let a = i as f32 / 5.0 * std::f32::consts::TAU;
                Point::new(a.cos(), a.sin())
            })
            .collect();

        // At fraction 1 every vertex sits exactly on the resampled end outline
        let to = resample(&pentagon, 5);
        let done = morph(&triangle, &pentagon, 1.0);
        assert_eq!(done.len(), 5);
        for (got, want) in done.iter().zip(&to) {
            assert_point_eq(*got, *want);
        }

        // At fraction 0 every vertex lies on the begin outline (shifted copy
        // of its resampling)
        let from = resample(&triangle, 5);
        let start = morph(&triangle, &pentagon, 0.0);
        for got in &start {
            assert!(from.iter().any(|p| p.distance(*got) < 1e-4));
        }
    }

    #[test]
    fn test_morph_empty_side() {
        let sq = square();
        assert_eq!(morph(&[], &sq, 0.5), sq);
        assert_eq!(morph(&sq, &[], 0.5), sq);
        assert!(morph(&[], &[], 0.5).is_empty());
    }
}
