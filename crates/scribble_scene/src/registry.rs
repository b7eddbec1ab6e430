//! Live-shape registry
//!
//! Shapes are stored in a slotmap behind a cloneable handle; the keys never
//! dangle, so removal closures queued long ago stay safe. Draw order is the
//! insertion order, tracked separately since slotmap iteration order is
//! unspecified.

use std::sync::{Arc, Mutex};

use scribble_core::Point;
use slotmap::{new_key_type, SlotMap};

use crate::shape::Shape;

new_key_type! {
    /// Handle to a registered shape
    pub struct ShapeId;
}

struct RegistryInner {
    shapes: SlotMap<ShapeId, Arc<Shape>>,
    order: Vec<ShapeId>,
}

/// Cloneable registry of the shapes currently in the scene
#[derive(Clone)]
pub struct ShapeRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                shapes: SlotMap::with_key(),
                order: Vec::new(),
            })),
        }
    }

    pub fn insert(&self, shape: Arc<Shape>) -> ShapeId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.shapes.insert(shape);
        inner.order.push(id);
        tracing::debug!(?id, "registered shape");
        id
    }

    /// Unregister immediately; queued via a one-shot by [`Shape::remove`]
    ///
    /// [`Shape::remove`]: crate::shape::Shape::remove
    pub fn remove_now(&self, id: ShapeId) {
        let mut inner = self.inner.lock().unwrap();
        if inner.shapes.remove(id).is_some() {
            inner.order.retain(|&other| other != id);
            tracing::debug!(?id, "unregistered shape");
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<Arc<Shape>> {
        self.inner.lock().unwrap().shapes.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all shapes in draw order
    ///
    /// The lock is not held while the caller iterates, so event handlers
    /// and renderers may freely mutate the scene mid-walk.
    pub fn shapes(&self) -> Vec<Arc<Shape>> {
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .filter_map(|&id| inner.shapes.get(id).cloned())
            .collect()
    }

    /// Shapes that are currently visible, in draw order
    pub fn ready_shapes(&self) -> Vec<Arc<Shape>> {
        self.shapes()
            .into_iter()
            .filter(|shape| shape.is_ready())
            .collect()
    }

    /// Topmost ready shape containing `point`, if any
    pub fn hit_test(&self, point: Point) -> Option<Arc<Shape>> {
        self.ready_shapes()
            .into_iter()
            .rev()
            .find(|shape| shape.contains(point))
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
