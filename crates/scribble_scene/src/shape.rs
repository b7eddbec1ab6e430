//! Shapes
//!
//! A shape is a bundle of animatable properties plus a geometry recipe that
//! turns its size-like values into a vertex outline. Renderers never walk
//! the recipe themselves: they ask for a [`RenderSnapshot`], which
//! regenerates the outline lazily when a geometry-driving property moved
//! since the last frame.
//!
//! All vertex math happens in local coordinates centered on the shape's
//! position; `contains` inverts the position/rotation/pivot transform and
//! tests in the same space the vertices are generated in.

use std::f32::consts::{PI, TAU};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use scribble_animation::SequencerHandle;
use scribble_core::{Color, Outline, Point, Result, ScribbleError};

use crate::property::{animate_color_pair, AnimatableProperty, OpaqueProperty, ShapeFlags};
use crate::registry::{ShapeId, ShapeRegistry};

/// Callback for click/release events, invoked with the scene position
pub type ClickHandler = Arc<dyn Fn(Point) + Send + Sync>;
/// Callback for mouse enter/exit events
pub type HoverHandler = Arc<dyn Fn() + Send + Sync>;

/// Style captured from the drawing cursor when a shape is created
#[derive(Clone, Copy, Debug)]
pub struct ShapeStyle {
    pub pos: Point,
    pub rot: f32,
    pub fill_color: Color,
    pub line_color: Color,
    pub fill: bool,
    pub line: bool,
    pub line_width: f32,
}

/// The vertex recipe of a shape
///
/// Size-like values are animatable; interpolating them marks the shape's
/// geometry dirty and the outline regenerates on the next snapshot.
pub enum Geometry {
    /// Semi-axes in `size`
    Ellipse { size: AnimatableProperty<Point> },
    /// Width/height, centered on the position
    Rect { size: AnimatableProperty<Point> },
    RoundedRect {
        size: AnimatableProperty<Point>,
        radius: AnimatableProperty<f32>,
    },
    /// Equilateral, `side` long, base centered on the position
    Triangle { side: AnimatableProperty<f32> },
    /// Filled circle sector sweeping `sweep` degrees counterclockwise
    Arc {
        radius: AnimatableProperty<f32>,
        sweep: AnimatableProperty<f32>,
    },
    /// Thin quad from the position along `span`; `arrow` adds a head
    Line {
        span: AnimatableProperty<Point>,
        arrow: bool,
    },
    /// Explicit vertices owned by the outline property
    Polygon,
}

pub struct Shape {
    id: OnceLock<ShapeId>,
    flags: Arc<ShapeFlags>,
    geometry: Geometry,

    pub pos: AnimatableProperty<Point>,
    /// Rotation in degrees, counterclockwise
    pub rot: AnimatableProperty<f32>,
    pub pivot: AnimatableProperty<Point>,
    pub fill_color: AnimatableProperty<Color>,
    pub line_color: AnimatableProperty<Color>,
    pub line_width: AnimatableProperty<f32>,
    pub fill: OpaqueProperty<bool>,
    pub line: OpaqueProperty<bool>,
    /// Visibility; shapes are created hidden and shown through the queue
    pub ready: OpaqueProperty<bool>,
    /// The rendered vertices, morphable via [`Shape::set_vertices`]
    pub outline: AnimatableProperty<Outline>,

    pub on_click: OpaqueProperty<Option<ClickHandler>>,
    pub on_release: OpaqueProperty<Option<ClickHandler>>,
    pub on_mouse_enter: OpaqueProperty<Option<HoverHandler>>,
    pub on_mouse_exit: OpaqueProperty<Option<HoverHandler>>,

    mouse_over: AtomicBool,
}

/// Everything a renderer needs for one shape, current values only
#[derive(Clone, Debug)]
pub struct RenderSnapshot {
    pub pos: Point,
    pub rot: f32,
    pub pivot: Point,
    pub fill: bool,
    pub line: bool,
    pub fill_color: Color,
    pub line_color: Color,
    pub line_width: f32,
    pub vertices: Outline,
}

impl Shape {
    pub fn ellipse(style: &ShapeStyle, a: f32, b: f32) -> Arc<Shape> {
        let flags = ShapeFlags::new();
        let size = AnimatableProperty::new(Point::new(a, b), &flags, true);
        Self::assemble(style, Geometry::Ellipse { size }, flags)
    }

    pub fn rect(style: &ShapeStyle, width: f32, height: f32) -> Arc<Shape> {
        let flags = ShapeFlags::new();
        let size = AnimatableProperty::new(Point::new(width, height), &flags, true);
        Self::assemble(style, Geometry::Rect { size }, flags)
    }

    pub fn rounded_rect(style: &ShapeStyle, width: f32, height: f32, radius: f32) -> Arc<Shape> {
        let flags = ShapeFlags::new();
        let size = AnimatableProperty::new(Point::new(width, height), &flags, true);
        let radius = AnimatableProperty::new(radius, &flags, true);
        Self::assemble(style, Geometry::RoundedRect { size, radius }, flags)
    }

    pub fn triangle(style: &ShapeStyle, side: f32) -> Arc<Shape> {
        let flags = ShapeFlags::new();
        let side = AnimatableProperty::new(side, &flags, true);
        Self::assemble(style, Geometry::Triangle { side }, flags)
    }

    pub fn arc(style: &ShapeStyle, radius: f32, sweep: f32) -> Arc<Shape> {
        let flags = ShapeFlags::new();
        let radius = AnimatableProperty::new(radius, &flags, true);
        let sweep = AnimatableProperty::new(sweep, &flags, true);
        Self::assemble(style, Geometry::Arc { radius, sweep }, flags)
    }

    pub fn line(style: &ShapeStyle, span: Point, arrow: bool) -> Arc<Shape> {
        let flags = ShapeFlags::new();
        let span = AnimatableProperty::new(span, &flags, true);
        // Lines render their quad as fill, never as a stroked outline
        let style = ShapeStyle {
            fill: true,
            line: false,
            ..*style
        };
        Self::assemble(&style, Geometry::Line { span, arrow }, flags)
    }

    pub fn polygon(style: &ShapeStyle, vertices: &[Point]) -> Result<Arc<Shape>> {
        if vertices.len() < 3 {
            return Err(ScribbleError::DegeneratePolygon {
                got: vertices.len(),
            });
        }
        let flags = ShapeFlags::new();
        let shape = Self::assemble(style, Geometry::Polygon, flags);
        shape.outline.init(vertices.to_vec());
        Ok(shape)
    }

    fn assemble(style: &ShapeStyle, geometry: Geometry, flags: Arc<ShapeFlags>) -> Arc<Shape> {
        let shape = Shape {
            id: OnceLock::new(),
            pos: AnimatableProperty::new(style.pos, &flags, false),
            rot: AnimatableProperty::new(style.rot, &flags, false),
            pivot: AnimatableProperty::new(Point::ZERO, &flags, false),
            fill_color: AnimatableProperty::new(style.fill_color, &flags, false),
            line_color: AnimatableProperty::new(style.line_color, &flags, false),
            line_width: AnimatableProperty::new(style.line_width, &flags, true),
            fill: OpaqueProperty::new(style.fill, &flags),
            line: OpaqueProperty::new(style.line, &flags),
            ready: OpaqueProperty::new(false, &flags),
            outline: AnimatableProperty::new(Vec::new(), &flags, false),
            on_click: OpaqueProperty::new(None, &flags),
            on_release: OpaqueProperty::new(None, &flags),
            on_mouse_enter: OpaqueProperty::new(None, &flags),
            on_mouse_exit: OpaqueProperty::new(None, &flags),
            geometry,
            mouse_over: AtomicBool::new(false),
            flags,
        };
        let initial = shape.generate_outline();
        shape.outline.init(initial);
        shape.flags.take_needs_geometry();
        Arc::new(shape)
    }

    pub fn id(&self) -> Option<ShapeId> {
        self.id.get().copied()
    }

    pub(crate) fn set_id(&self, id: ShapeId) {
        let _ = self.id.set(id);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_ready(&self) -> bool {
        self.ready.current()
    }

    pub fn is_alive(&self) -> bool {
        self.flags.is_alive()
    }

    /// Check and clear the redraw flag; renderers call this once per frame
    pub fn take_needs_redraw(&self) -> bool {
        self.flags.take_needs_redraw()
    }

    pub fn show(&self, seq: &SequencerHandle) {
        self.ready.set(true, seq);
    }

    pub fn hide(&self, seq: &SequencerHandle) {
        self.ready.set(false, seq);
    }

    /// Queue removal: hide, mark dead, unregister
    ///
    /// The target-side `ready` flips immediately so script logic sees the
    /// shape as gone; the visible teardown happens when the queue reaches
    /// this point of the script.
    pub fn remove(self: &Arc<Self>, seq: &SequencerHandle, registry: &ShapeRegistry) {
        self.ready.set_target(false);
        let weak = Arc::downgrade(self);
        let registry = registry.clone();
        seq.run(move || {
            let Some(shape) = weak.upgrade() else { return };
            shape.flags.kill();
            shape.ready.force_current(false);
            if let Some(id) = shape.id() {
                registry.remove_now(id);
            }
        });
    }

    pub fn move_by(&self, delta: Point, seq: &SequencerHandle) {
        self.pos.set(self.pos.get() + delta, seq);
    }

    /// Move along the shape's own heading
    pub fn forward(&self, distance: f32, seq: &SequencerHandle) {
        let heading = self.rot.get().to_radians();
        let delta = Point::new(heading.cos(), heading.sin()) * distance;
        self.move_by(delta, seq);
    }

    pub fn backward(&self, distance: f32, seq: &SequencerHandle) {
        self.forward(-distance, seq);
    }

    pub fn rotate_by(&self, degrees: f32, seq: &SequencerHandle) {
        self.rot.set(self.rot.get() + degrees, seq);
    }

    /// Animate both semi-axes to `radius`; no-op for non-ellipse shapes
    pub fn set_radius(&self, radius: f32, seq: &SequencerHandle) {
        if let Geometry::Ellipse { size } = &self.geometry {
            size.set(Point::new(radius, radius), seq);
        }
    }

    /// Animate fill and line color together as a single queue step
    pub fn set_color(&self, color: Color, seq: &SequencerHandle) {
        animate_color_pair(&self.fill_color, &self.line_color, color, seq);
    }

    /// Morph the rendered outline towards explicit vertices
    pub fn set_vertices(&self, vertices: Outline, seq: &SequencerHandle) {
        self.outline.set_morph(vertices, seq);
    }

    /// The rendered vertices, regenerating first if geometry moved
    pub fn outline_now(&self) -> Outline {
        if self.flags.take_needs_geometry() {
            let fresh = self.generate_outline();
            self.outline.write_silent(fresh);
        }
        self.outline.current()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            pos: self.pos.current(),
            rot: self.rot.current(),
            pivot: self.pivot.current(),
            fill: self.fill.current(),
            line: self.line.current(),
            fill_color: self.fill_color.current(),
            line_color: self.line_color.current(),
            line_width: self.line_width.current(),
            vertices: self.outline_now(),
        }
    }

    /// Generate the outline from the current geometry values
    fn generate_outline(&self) -> Outline {
        match &self.geometry {
            Geometry::Ellipse { size } => {
                let size = size.current();
                ellipse_outline(size.x, size.y)
            }
            Geometry::Rect { size } => {
                let size = size.current();
                rect_outline(size.x, size.y)
            }
            Geometry::RoundedRect { size, radius } => {
                let size = size.current();
                rounded_rect_outline(size.x, size.y, radius.current())
            }
            Geometry::Triangle { side } => triangle_outline(side.current()),
            Geometry::Arc { radius, sweep } => arc_outline(radius.current(), sweep.current()),
            Geometry::Line { span, arrow } => {
                let span = span.current();
                let width = self.line_width.current();
                if *arrow {
                    vector_outline(span, width)
                } else {
                    line_outline(span, width)
                }
            }
            Geometry::Polygon => self.outline.current(),
        }
    }

    /// Hit test against the current on-screen state
    pub fn contains(&self, world: Point) -> bool {
        let local = (world - self.pos.current()).rotated(-self.rot.current().to_radians())
            + self.pivot.current();
        match &self.geometry {
            Geometry::Ellipse { size } => {
                let size = size.current();
                if size.x == 0.0 || size.y == 0.0 {
                    return false;
                }
                let nx = local.x / size.x;
                let ny = local.y / size.y;
                nx * nx + ny * ny <= 1.0
            }
            Geometry::Rect { size } => {
                let size = size.current();
                local.x.abs() <= size.x / 2.0 && local.y.abs() <= size.y / 2.0
            }
            Geometry::Triangle { side } => {
                let side = side.current();
                let height = 3.0f32.sqrt() / 2.0 * side;
                let v0 = Point::new(-side / 2.0, 0.0);
                let v1 = Point::new(side / 2.0, 0.0);
                let v2 = Point::new(0.0, height);
                let sign = |a: Point, b: Point| (local.x - b.x) * (a.y - b.y) - (a.x - b.x) * (local.y - b.y);
                let d0 = sign(v0, v1) < 0.0;
                let d1 = sign(v1, v2) < 0.0;
                let d2 = sign(v2, v0) < 0.0;
                d0 == d1 && d1 == d2
            }
            Geometry::Arc { radius, sweep } => {
                let radius = radius.current();
                if local.length() > radius {
                    return false;
                }
                let angle = local.angle().to_degrees();
                let angle = if angle < 0.0 { angle + 360.0 } else { angle };
                angle <= sweep.current()
            }
            Geometry::Line { .. } => false,
            Geometry::RoundedRect { .. } | Geometry::Polygon => {
                point_in_polygon(&self.outline_now(), local)
            }
        }
    }

    pub(crate) fn dispatch_press(&self, pos: Point) {
        if let Some(handler) = self.on_click.current() {
            if self.contains(pos) {
                handler(pos);
            }
        }
    }

    pub(crate) fn dispatch_release(&self, pos: Point) {
        if let Some(handler) = self.on_release.current() {
            handler(pos);
        }
    }

    /// Enter/exit tracking; called for every mouse move
    pub(crate) fn dispatch_hover(&self, pos: Point) {
        let enter = self.on_mouse_enter.current();
        let exit = self.on_mouse_exit.current();
        if enter.is_none() && exit.is_none() {
            return;
        }
        let inside = self.contains(pos);
        let was_over = self.mouse_over.load(Ordering::Relaxed);
        if inside && !was_over {
            self.mouse_over.store(true, Ordering::Relaxed);
            if let Some(handler) = enter {
                handler();
            }
        } else if !inside && was_over {
            self.mouse_over.store(false, Ordering::Relaxed);
            if let Some(handler) = exit {
                handler();
            }
        }
    }
}

fn ellipse_segments(a: f32, b: f32) -> usize {
    if a == 0.0 || b == 0.0 {
        return 0;
    }
    // Ramanujan's circumference approximation
    let h = ((a - b) * (a - b)) / ((a + b) * (a + b));
    let circumference = PI * (a + b) * (1.0 + (3.0 * h) / (10.0 + (4.0 - 3.0 * h).sqrt()));
    ((circumference / 5.0) as usize).clamp(12, 100)
}

fn ellipse_outline(a: f32, b: f32) -> Outline {
    let segments = ellipse_segments(a, b);
    (0..segments)
        .map(|i| {
            let theta = TAU * i as f32 / segments as f32;
            Point::new(a * theta.cos(), b * theta.sin())
        })
        .collect()
}

fn rect_outline(width: f32, height: f32) -> Outline {
    let w = width / 2.0;
    let h = height / 2.0;
    vec![
        Point::new(-w, -h),
        Point::new(w, -h),
        Point::new(w, h),
        Point::new(-w, h),
    ]
}

fn rounded_rect_outline(width: f32, height: f32, radius: f32) -> Outline {
    const CORNER_SEGMENTS: usize = 16;
    let radius = (width / 2.0).min(height / 2.0).min(radius).max(0.0);
    let corners = [
        (radius, radius),
        (width - radius, radius),
        (width - radius, height - radius),
        (radius, height - radius),
    ];
    let angles = [
        (PI, 1.5 * PI),
        (1.5 * PI, TAU),
        (0.0, 0.5 * PI),
        (0.5 * PI, PI),
    ];
    // Points following each corner arc, closing the straight edges
    let edges = [
        Point::new(width - radius, 0.0),
        Point::new(width, height - radius),
        Point::new(radius, height),
        Point::new(0.0, radius),
    ];

    let mut vertices = Vec::with_capacity(4 * (CORNER_SEGMENTS + 2));
    for i in 0..4 {
        let (cx, cy) = corners[i];
        let (start, end) = angles[i];
        for j in 0..=CORNER_SEGMENTS {
            let theta = start + (end - start) * j as f32 / CORNER_SEGMENTS as f32;
            vertices.push(Point::new(
                cx + radius * theta.cos(),
                cy + radius * theta.sin(),
            ));
        }
        vertices.push(edges[i]);
    }
    let center = Point::new(width / 2.0, height / 2.0);
    for vertex in &mut vertices {
        *vertex = *vertex - center;
    }
    vertices
}

fn triangle_outline(side: f32) -> Outline {
    let height = 3.0f32.sqrt() / 2.0 * side;
    vec![
        Point::new(-side / 2.0, 0.0),
        Point::new(side / 2.0, 0.0),
        Point::new(0.0, height),
    ]
}

fn arc_segments(radius: f32, sweep: f32) -> usize {
    if radius == 0.0 {
        return 1;
    }
    let circumference = TAU * radius;
    ((circumference / 5.0 * sweep / 360.0) as usize).clamp(12, 100)
}

fn arc_outline(radius: f32, sweep: f32) -> Outline {
    let segments = arc_segments(radius, sweep);
    let step = sweep.to_radians() / segments as f32;
    let mut vertices = Vec::with_capacity(segments + 2);
    vertices.push(Point::ZERO);
    for i in 0..=segments {
        let theta = step * i as f32;
        vertices.push(Point::new(radius * theta.cos(), radius * theta.sin()));
    }
    vertices
}

fn line_outline(span: Point, line_width: f32) -> Outline {
    let half = line_width / 2.0;
    let length = span.length();
    let angle = span.angle();
    [
        Point::new(0.0, -half),
        Point::new(length, -half),
        Point::new(length, half),
        Point::new(0.0, half),
    ]
    .into_iter()
    .map(|p| p.rotated(angle))
    .collect()
}

fn vector_outline(span: Point, line_width: f32) -> Outline {
    let head_length = line_width * 6.0;
    let head_width = line_width * 2.0;
    let half = line_width / 2.0;
    let length = span.length();
    let angle = span.angle();
    // Very short vectors keep a visible head
    let shaft = (length - head_length).max(1.0);
    let tip = length.max(head_length);
    [
        Point::new(0.0, -half),
        Point::new(shaft, -half),
        Point::new(shaft, -half - head_width),
        Point::new(tip, 0.0),
        Point::new(shaft, half + head_width),
        Point::new(shaft, half),
        Point::new(0.0, half),
    ]
    .into_iter()
    .map(|p| p.rotated(angle))
    .collect()
}

/// Even-odd ray casting
fn point_in_polygon(outline: &[Point], p: Point) -> bool {
    let n = outline.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut p1 = outline[n - 1];
    for &p2 in outline {
        if (p1.y > p.y) != (p2.y > p.y) {
            let x_intersect = (p.y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y) + p1.x;
            if p.x < x_intersect {
                inside = !inside;
            }
        }
        p1 = p2;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> ShapeStyle {
        ShapeStyle {
            pos: Point::ZERO,
            rot: 0.0,
            fill_color: Color::new(255, 200, 50, 255),
            line_color: Color::new(200, 150, 30, 255),
            fill: true,
            line: false,
            line_width: 2.0,
        }
    }

    #[test]
    fn test_ellipse_segment_bounds() {
        // Tiny circles floor at 12 segments, huge ones cap at 100
        assert_eq!(ellipse_segments(1.0, 1.0), 12);
        assert_eq!(ellipse_segments(500.0, 500.0), 100);
        assert_eq!(ellipse_segments(0.0, 10.0), 0);
    }

    #[test]
    fn test_ellipse_outline_is_centered() {
        let outline = ellipse_outline(10.0, 5.0);
        assert!(outline.len() >= 12);
        for p in &outline {
            assert!(p.x.abs() <= 10.0 + 1e-4);
            assert!(p.y.abs() <= 5.0 + 1e-4);
        }
        assert_eq!(outline[0], Point::new(10.0, 0.0));
    }

    #[test]
    fn test_rect_contains_respects_rotation() {
        let shape = Shape::rect(&style(), 20.0, 10.0);
        shape.pos.init(Point::new(100.0, 100.0));
        assert!(shape.contains(Point::new(109.0, 104.0)));
        assert!(!shape.contains(Point::new(100.0, 106.0)));

        // Rotate 90 degrees: the long axis now points up
        shape.rot.init(90.0);
        assert!(shape.contains(Point::new(100.0, 109.0)));
        assert!(!shape.contains(Point::new(109.0, 100.0)));
    }

    #[test]
    fn test_triangle_contains() {
        let shape = Shape::triangle(&style(), 10.0);
        assert!(shape.contains(Point::new(0.0, 1.0)));
        assert!(!shape.contains(Point::new(0.0, -1.0)));
        assert!(!shape.contains(Point::new(6.0, 1.0)));
    }

    #[test]
    fn test_arc_contains_sector_only() {
        let shape = Shape::arc(&style(), 10.0, 90.0);
        assert!(shape.contains(Point::new(5.0, 5.0)));
        assert!(!shape.contains(Point::new(5.0, -5.0)));
        assert!(!shape.contains(Point::new(11.0, 0.0)));
    }

    #[test]
    fn test_line_outline_is_thin_quad() {
        let outline = line_outline(Point::new(100.0, 0.0), 2.0);
        assert_eq!(outline.len(), 4);
        assert_eq!(outline[1], Point::new(100.0, -1.0));
        assert_eq!(outline[2], Point::new(100.0, 1.0));
    }

    #[test]
    fn test_vector_outline_has_head() {
        let outline = vector_outline(Point::new(100.0, 0.0), 2.0);
        assert_eq!(outline.len(), 7);
        // The tip reaches the full length
        assert_eq!(outline[3], Point::new(100.0, 0.0));
        // The head is wider than the shaft
        assert!(outline[2].y < outline[1].y);
    }

    #[test]
    fn test_polygon_needs_three_vertices() {
        let two = [Point::ZERO, Point::new(1.0, 0.0)];
        assert!(matches!(
            Shape::polygon(&style(), &two),
            Err(ScribbleError::DegeneratePolygon { got: 2 })
        ));
        let three = [Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        assert!(Shape::polygon(&style(), &three).is_ok());
    }

    #[test]
    fn test_polygon_contains() {
        let vertices = [
            Point::new(-5.0, -5.0),
            Point::new(5.0, -5.0),
            Point::new(5.0, 5.0),
            Point::new(-5.0, 5.0),
        ];
        let shape = Shape::polygon(&style(), &vertices).unwrap();
        assert!(shape.contains(Point::new(0.0, 0.0)));
        assert!(!shape.contains(Point::new(6.0, 0.0)));
    }

    #[test]
    fn test_outline_regenerates_after_geometry_change() {
        let shape = Shape::rect(&style(), 10.0, 10.0);
        let before = shape.outline_now();
        assert_eq!(before[1], Point::new(5.0, -5.0));

        if let Geometry::Rect { size } = shape.geometry() {
            size.init(Point::new(20.0, 20.0));
        }
        let after = shape.outline_now();
        assert_eq!(after[1], Point::new(10.0, -10.0));
    }

    #[test]
    fn test_rounded_rect_radius_clamps_to_half_extent() {
        // A radius larger than half the short side degrades to a capsule
        let outline = rounded_rect_outline(20.0, 10.0, 50.0);
        for p in &outline {
            assert!(p.x.abs() <= 10.0 + 1e-3);
            assert!(p.y.abs() <= 5.0 + 1e-3);
        }
    }
}
