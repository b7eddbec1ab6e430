//! Drawing context
//!
//! The context is the scripting surface: a turtle style cursor carrying the
//! style for the next shape, factories that stamp shapes at the cursor, and
//! the timing/event entry points an embedding window calls into. Factories
//! construct shapes instantly at their final style and queue a single
//! visibility flip, so a straight-line script makes its shapes appear one
//! delay step apart.

use std::sync::{Arc, Mutex};

use scribble_animation::{LoopId, Sequencer, SequencerHandle};
use scribble_core::{Color, Easing, Point, Result};

use crate::registry::ShapeRegistry;
use crate::shape::{Shape, ShapeStyle};

/// The turtle cursor: style and pose for the next shape drawn
#[derive(Clone, Copy, Debug)]
pub struct CursorState {
    /// Canvas size in pixels
    pub size: Point,
    pub pos: Point,
    /// Heading in degrees, counterclockwise
    pub rot: f32,
    pub fill_color: Color,
    pub line_color: Color,
    pub fill: bool,
    pub line: bool,
    pub line_width: f32,
    pub background: Color,
    pub pen_down: bool,
}

impl CursorState {
    fn new(width: f32, height: f32) -> Self {
        Self {
            size: Point::new(width, height),
            pos: Point::new(width / 2.0, height / 2.0),
            rot: 0.0,
            fill_color: Color::new(255, 200, 50, 255),
            line_color: Color::new(200, 150, 30, 255),
            fill: true,
            line: false,
            line_width: 2.0,
            background: Color::BLACK,
            pen_down: false,
        }
    }
}

/// Scripting entry point tying the cursor, registry, and sequencer together
#[derive(Clone)]
pub struct DrawingContext {
    sequencer: Arc<Sequencer>,
    seq: SequencerHandle,
    registry: ShapeRegistry,
    cursor: Arc<Mutex<CursorState>>,
}

impl DrawingContext {
    pub fn new(width: f32, height: f32) -> Self {
        let sequencer = Arc::new(Sequencer::new());
        let seq = sequencer.handle();
        Self {
            sequencer,
            seq,
            registry: ShapeRegistry::new(),
            cursor: Arc::new(Mutex::new(CursorState::new(width, height))),
        }
    }

    /// Drain the queue at the real elapsed time; the frame timer calls this
    pub fn tick(&self) {
        self.sequencer.tick();
    }

    /// Drain the queue at an explicit virtual time
    pub fn drain_at(&self, now: i64) {
        self.sequencer.drain_at(now);
    }

    pub fn handle(&self) -> SequencerHandle {
        self.seq.clone()
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Snapshot of the cursor style applied to new shapes
    pub fn style(&self) -> ShapeStyle {
        let cursor = self.cursor.lock().unwrap();
        ShapeStyle {
            pos: cursor.pos,
            rot: cursor.rot,
            fill_color: cursor.fill_color,
            line_color: cursor.line_color,
            fill: cursor.fill,
            line: cursor.line,
            line_width: cursor.line_width,
        }
    }

    /// Register a shape and queue its appearance
    fn add_shape(&self, shape: &Arc<Shape>) {
        let id = self.registry.insert(Arc::clone(shape));
        shape.set_id(id);
        shape.show(&self.seq);
    }

    // =========================================================================
    // Shape factories
    // =========================================================================

    pub fn draw_ellipse(&self, a: f32, b: f32) -> Arc<Shape> {
        let shape = Shape::ellipse(&self.style(), a, b);
        self.add_shape(&shape);
        shape
    }

    pub fn draw_circle(&self, radius: f32) -> Arc<Shape> {
        self.draw_ellipse(radius, radius)
    }

    pub fn draw_rect(&self, width: f32, height: f32) -> Arc<Shape> {
        let shape = Shape::rect(&self.style(), width, height);
        self.add_shape(&shape);
        shape
    }

    pub fn draw_square(&self, side: f32) -> Arc<Shape> {
        self.draw_rect(side, side)
    }

    pub fn draw_rounded_rect(&self, width: f32, height: f32, radius: f32) -> Arc<Shape> {
        let shape = Shape::rounded_rect(&self.style(), width, height, radius);
        self.add_shape(&shape);
        shape
    }

    pub fn draw_triangle(&self, side: f32) -> Arc<Shape> {
        let shape = Shape::triangle(&self.style(), side);
        self.add_shape(&shape);
        shape
    }

    /// A filled sector sweeping `sweep` degrees counterclockwise from the
    /// cursor heading
    pub fn draw_arc(&self, radius: f32, sweep: f32) -> Arc<Shape> {
        let shape = Shape::arc(&self.style(), radius, sweep);
        self.add_shape(&shape);
        shape
    }

    /// A line from the cursor along the given offset
    pub fn draw_line(&self, dx: f32, dy: f32) -> Arc<Shape> {
        let shape = Shape::line(&self.style(), Point::new(dx, dy), false);
        self.add_shape(&shape);
        shape
    }

    /// A line from the cursor to an absolute position
    pub fn draw_line_to(&self, x: f32, y: f32) -> Arc<Shape> {
        let span = Point::new(x, y) - self.get_pos();
        self.draw_line(span.x, span.y)
    }

    /// An arrow from the cursor along the given offset
    pub fn draw_vector(&self, dx: f32, dy: f32) -> Arc<Shape> {
        let shape = Shape::line(&self.style(), Point::new(dx, dy), true);
        self.add_shape(&shape);
        shape
    }

    /// An arrow from the cursor to an absolute position
    pub fn draw_vector_to(&self, x: f32, y: f32) -> Arc<Shape> {
        let span = Point::new(x, y) - self.get_pos();
        self.draw_vector(span.x, span.y)
    }

    /// A polygon with explicit vertices relative to the cursor
    pub fn draw_polygon(&self, vertices: &[Point]) -> Result<Arc<Shape>> {
        let shape = Shape::polygon(&self.style(), vertices)?;
        self.add_shape(&shape);
        Ok(shape)
    }

    /// Queue removal of a shape from the scene
    pub fn remove(&self, shape: &Arc<Shape>) {
        shape.remove(&self.seq, &self.registry);
    }

    // =========================================================================
    // Cursor movement
    // =========================================================================

    pub fn get_pos(&self) -> Point {
        self.cursor.lock().unwrap().pos
    }

    pub fn get_x(&self) -> f32 {
        self.get_pos().x
    }

    pub fn get_y(&self) -> f32 {
        self.get_pos().y
    }

    /// Move the cursor, leaving a line behind when the pen is down
    ///
    /// The trail line takes one animation step to appear; the cursor lands
    /// at the end of that step so the next trail segment starts after this
    /// one has settled.
    pub fn set_pos(&self, x: f32, y: f32) {
        let target = Point::new(x, y);
        let (old, pen_down) = {
            let cursor = self.cursor.lock().unwrap();
            (cursor.pos, cursor.pen_down)
        };
        if pen_down && target != old {
            let saved = self.seq.now();
            let shape = Shape::line(&self.style(), target - old, false);
            self.add_shape(&shape);
            let settle = self.seq.animation_ms().max(self.seq.delay_ms());
            self.seq
                .with_time(|state| state.clock.rebase(saved + settle));
        }
        self.cursor.lock().unwrap().pos = target;
    }

    pub fn set_x(&self, x: f32) {
        let pos = self.get_pos();
        self.set_pos(x, pos.y);
    }

    pub fn set_y(&self, y: f32) {
        let pos = self.get_pos();
        self.set_pos(pos.x, y);
    }

    pub fn move_by(&self, dx: f32, dy: f32) {
        let pos = self.get_pos();
        self.set_pos(pos.x + dx, pos.y + dy);
    }

    /// Move along the cursor heading
    pub fn forward(&self, distance: f32) {
        let heading = self.get_rotation().to_radians();
        self.move_by(heading.cos() * distance, heading.sin() * distance);
    }

    pub fn backward(&self, distance: f32) {
        self.forward(-distance);
    }

    pub fn left(&self, distance: f32) {
        self.move_by(-distance, 0.0);
    }

    pub fn right(&self, distance: f32) {
        self.move_by(distance, 0.0);
    }

    pub fn up(&self, distance: f32) {
        self.move_by(0.0, distance);
    }

    pub fn down(&self, distance: f32) {
        self.move_by(0.0, -distance);
    }

    pub fn get_rotation(&self) -> f32 {
        self.cursor.lock().unwrap().rot
    }

    pub fn set_rotation(&self, degrees: f32) {
        self.cursor.lock().unwrap().rot = degrees;
    }

    pub fn rotate(&self, degrees: f32) {
        self.cursor.lock().unwrap().rot += degrees;
    }

    pub fn pen_down(&self) {
        self.cursor.lock().unwrap().pen_down = true;
    }

    pub fn pen_up(&self) {
        self.cursor.lock().unwrap().pen_down = false;
    }

    pub fn is_pen_down(&self) -> bool {
        self.cursor.lock().unwrap().pen_down
    }

    // =========================================================================
    // Cursor style
    // =========================================================================

    /// Set both fill and line color for shapes drawn from now on
    pub fn set_color(&self, components: &[f32]) -> Result<()> {
        let color = Color::from_slice(components)?;
        let mut cursor = self.cursor.lock().unwrap();
        cursor.fill_color = color;
        cursor.line_color = color;
        Ok(())
    }

    pub fn set_fill_color(&self, components: &[f32]) -> Result<()> {
        self.cursor.lock().unwrap().fill_color = Color::from_slice(components)?;
        Ok(())
    }

    pub fn set_line_color(&self, components: &[f32]) -> Result<()> {
        self.cursor.lock().unwrap().line_color = Color::from_slice(components)?;
        Ok(())
    }

    pub fn set_fill(&self, fill: bool) {
        self.cursor.lock().unwrap().fill = fill;
    }

    pub fn set_line(&self, line: bool) {
        self.cursor.lock().unwrap().line = line;
    }

    pub fn set_line_width(&self, width: f32) {
        self.cursor.lock().unwrap().line_width = width.max(0.0);
    }

    pub fn set_background(&self, components: &[f32]) -> Result<()> {
        self.cursor.lock().unwrap().background = Color::from_slice(components)?;
        Ok(())
    }

    pub fn background(&self) -> Color {
        self.cursor.lock().unwrap().background
    }

    pub fn canvas_size(&self) -> Point {
        self.cursor.lock().unwrap().size
    }

    // =========================================================================
    // Timing controls
    // =========================================================================

    /// Duration of interpolated transitions
    pub fn set_animation(&self, ms: i64) {
        self.seq.set_animation_ms(ms);
    }

    /// Spacing between consecutive scripted steps
    pub fn set_delay(&self, ms: i64) {
        self.seq.set_delay_ms(ms);
    }

    /// Set animation and delay together
    pub fn set_time(&self, ms: i64) {
        self.seq.set_time_ms(ms);
    }

    /// Push the choreography cursor forward without queueing anything
    pub fn delay(&self, ms: i64) {
        self.seq.advance(ms);
    }

    /// Queue a barrier: later steps wait for everything queued so far
    pub fn sync(&self) {
        self.seq.barrier();
    }

    pub fn set_easing(&self, easing: Easing) {
        self.seq.set_easing(easing);
    }

    /// Queue a log message at the current point of the script
    pub fn log(&self, message: impl Into<String>) {
        self.seq.log(message);
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a periodic callback
    ///
    /// The callback first runs on the next frame, then at each period
    /// multiple. It runs with snap timing: everything it enqueues lands at
    /// the loop's due time instead of trailing the scripted timeline. The
    /// period floors at 20 ms.
    pub fn on_tick(
        &self,
        period_ms: i64,
        mut callback: impl FnMut() + Send + 'static,
    ) -> Option<LoopId> {
        let seq = self.seq.clone();
        self.seq.push_immediate();
        let id = self.seq.add_loop(period_ms.max(20), move || {
            seq.scale(0.0);
            callback();
            seq.unscale();
        });
        self.seq.pull_immediate();
        id
    }

    pub fn remove_on_tick(&self, id: LoopId) {
        self.seq.remove_loop(id);
    }

    /// Dispatch a mouse press to every visible shape under the point
    ///
    /// Handlers run in immediate snap mode, so what they enqueue starts now
    /// rather than at the end of the scripted timeline.
    pub fn mouse_pressed(&self, pos: Point) {
        self.dispatch(|shape| shape.dispatch_press(pos));
    }

    /// Dispatch a mouse release to every visible shape with a handler
    pub fn mouse_released(&self, pos: Point) {
        self.dispatch(|shape| shape.dispatch_release(pos));
    }

    /// Track enter/exit for every visible shape with hover handlers
    pub fn mouse_moved(&self, pos: Point) {
        self.dispatch(|shape| shape.dispatch_hover(pos));
    }

    fn dispatch(&self, event: impl Fn(&Arc<Shape>)) {
        self.seq.push_immediate();
        self.seq.scale(0.0);
        for shape in self.registry.ready_shapes() {
            event(&shape);
        }
        self.seq.unscale();
        self.seq.pull_immediate();
    }
}
