//! End-to-end choreography scenarios driven through the drawing context.
//!
//! These tests drain the queue at explicit virtual times instead of wall
//! time, so the whole timeline is deterministic.

use std::sync::Arc;

use scribble_core::{Color, Easing, Point};
use scribble_scene::DrawingContext;

fn context() -> DrawingContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let ctx = DrawingContext::new(1000.0, 1000.0);
    ctx.set_easing(Easing::Linear);
    ctx
}

#[test]
fn draws_become_visible_in_script_order() {
    let ctx = context();
    let a = ctx.draw_circle(30.0);
    let b = ctx.draw_rect(40.0, 20.0);
    let c = ctx.draw_triangle(50.0);

    // Nothing is visible before the first drain
    assert!(!a.is_ready() && !b.is_ready() && !c.is_ready());

    ctx.drain_at(0);
    assert!(a.is_ready() && !b.is_ready() && !c.is_ready());
    ctx.drain_at(250);
    assert!(b.is_ready() && !c.is_ready());
    ctx.drain_at(500);
    assert!(c.is_ready());
}

#[test]
fn animations_lag_the_script_and_barriers_order_steps() {
    let ctx = context();
    let handle = ctx.handle();

    let shape = ctx.draw_circle(40.0);
    shape.pos.set(Point::new(700.0, 500.0), &handle);
    shape.set_color(Color::rgb(255, 0, 0), &handle);
    ctx.sync();
    let late = ctx.draw_rect(10.0, 10.0);

    // show at 0, move over [250, 500], color over [500, 750], barrier
    // releasing at 750, late show at 1000
    assert_eq!(handle.now(), 1250);

    ctx.drain_at(0);
    assert!(shape.is_ready());
    assert_eq!(shape.pos.current(), Point::new(500.0, 500.0));
    // Script-side reads see the final position immediately
    assert_eq!(shape.pos.get(), Point::new(700.0, 500.0));

    ctx.drain_at(375);
    assert!((shape.pos.current().x - 600.0).abs() < 1e-3);

    ctx.drain_at(750);
    assert_eq!(shape.pos.current(), Point::new(700.0, 500.0));
    assert_eq!(shape.fill_color.current(), Color::rgb(255, 0, 0));
    assert_eq!(shape.line_color.current(), Color::rgb(255, 0, 0));
    assert!(!late.is_ready());

    ctx.drain_at(1000);
    assert!(late.is_ready());
}

#[test]
fn back_to_back_transitions_chain_without_rewind() {
    let ctx = context();
    let handle = ctx.handle();

    let shape = ctx.draw_circle(20.0);
    shape.rot.set(90.0, &handle);
    shape.rot.set(180.0, &handle);
    shape.rot.set(270.0, &handle);
    // show at 0, then rotations over [250, 500], [500, 750], [750, 1000]
    assert_eq!(handle.now(), 1000);

    ctx.drain_at(0);
    // Each transition begins where the previous one landed, even when both
    // are processed in the same drain
    ctx.drain_at(500);
    assert!((shape.rot.current() - 90.0).abs() < 1e-3);
    ctx.drain_at(625);
    assert!((shape.rot.current() - 135.0).abs() < 1e-3);
    ctx.drain_at(750);
    assert!((shape.rot.current() - 180.0).abs() < 1e-3);
    ctx.drain_at(875);
    assert!((shape.rot.current() - 225.0).abs() < 1e-3);
    ctx.drain_at(1000);
    assert_eq!(shape.rot.current(), 270.0);
}

#[test]
fn outline_morph_lands_on_exact_vertices() {
    let ctx = context();
    let handle = ctx.handle();

    let shape = ctx.draw_rect(10.0, 10.0);
    let target = vec![
        Point::new(-20.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(0.0, 30.0),
    ];
    shape.set_vertices(target.clone(), &handle);

    ctx.drain_at(0);
    assert_eq!(shape.outline_now().len(), 4);

    // Mid-morph both outlines are resampled to a common vertex count
    ctx.drain_at(375);
    assert_eq!(shape.outline_now().len(), 4);

    ctx.drain_at(500);
    assert_eq!(shape.outline_now(), target);
    assert_eq!(shape.outline.get(), target);
}

#[test]
fn tick_loops_spawn_until_removed() {
    let ctx = context();
    ctx.set_time(0);

    let spawner = ctx.clone();
    let id = ctx
        .on_tick(100, move || {
            spawner.draw_circle(5.0);
        })
        .unwrap();

    // The first fire happens on the first frame, then once per period
    ctx.drain_at(10);
    assert_eq!(ctx.registry().len(), 1);
    ctx.drain_at(100);
    assert_eq!(ctx.registry().len(), 2);
    ctx.drain_at(200);
    assert_eq!(ctx.registry().len(), 3);

    ctx.remove_on_tick(id);
    ctx.drain_at(600);
    assert_eq!(ctx.registry().len(), 3);
}

#[test]
fn removal_queues_behind_earlier_steps() {
    let ctx = context();
    let handle = ctx.handle();

    let shape = ctx.draw_circle(40.0);
    shape.pos.set(Point::new(600.0, 500.0), &handle);
    ctx.remove(&shape);

    ctx.drain_at(0);
    assert!(shape.is_ready());

    // The move still plays out before the removal lands
    ctx.drain_at(375);
    assert!(shape.is_alive());
    assert!((shape.pos.current().x - 550.0).abs() < 1e-3);

    ctx.drain_at(500);
    assert!(!shape.is_alive());
    assert_eq!(ctx.registry().len(), 0);
    // A late write against the removed shape is refused
    shape.pos.set(Point::new(0.0, 0.0), &handle);
    ctx.drain_at(1000);
    assert_eq!(shape.pos.current(), Point::new(600.0, 500.0));
}

#[test]
fn click_handlers_run_in_snap_mode() {
    let ctx = context();
    let handle = ctx.handle();

    let button = ctx.draw_rect(100.0, 40.0);
    let spawner = ctx.clone();
    button.on_click.init(Some(Arc::new(move |_| {
        spawner.draw_circle(10.0);
    })));
    ctx.drain_at(0);
    assert_eq!(handle.now(), 250);

    ctx.mouse_pressed(Point::new(500.0, 500.0));
    assert_eq!(ctx.registry().len(), 2);
    // Handler work was scheduled in immediate mode and did not push the
    // scripted cursor
    assert_eq!(handle.now(), 250);
}
