//! Interaction state for a presentation layer showing a [`MapLayout`].
//!
//! The layout itself is an immutable snapshot shared through an `Arc`; zoom, pan, selection
//! and drag live here and never feed back into the pipeline.

use std::sync::Arc;

use crate::model::{MapLayout, Point, Position};

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    last: Point,
    moved: f64,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    snapshot: Arc<MapLayout>,
    viewport: Viewport,
    zoom: f64,
    pan: Point,
    selected: Option<String>,
    drag: Option<Drag>,
}

impl ViewState {
    pub fn new(snapshot: Arc<MapLayout>, viewport: Viewport) -> Self {
        Self {
            snapshot,
            viewport,
            zoom: 1.0,
            pan: Point::ORIGIN,
            selected: None,
            drag: None,
        }
    }

    pub fn snapshot(&self) -> &Arc<MapLayout> {
        &self.snapshot
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn selected(&self) -> Option<&Position> {
        self.selected
            .as_deref()
            .and_then(|id| self.snapshot.position(id))
    }

    /// Swaps in a freshly computed layout. Zoom and pan are kept; a selection whose id is gone
    /// is dropped.
    pub fn replace_snapshot(&mut self, snapshot: Arc<MapLayout>) {
        self.snapshot = snapshot;
        if let Some(id) = self.selected.as_deref() {
            if self.snapshot.position(id).is_none() {
                self.selected = None;
            }
        }
        self.drag = None;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Map coordinates → screen pixels (origin at the viewport centre, y pointing down).
    pub fn to_screen(&self, world: Point) -> Point {
        let c = self.viewport.center();
        Point::new(
            c.x + (world.x * self.zoom) + self.pan.x,
            c.y - (world.y * self.zoom) + self.pan.y,
        )
    }

    pub fn to_world(&self, screen: Point) -> Point {
        let c = self.viewport.center();
        Point::new(
            (screen.x - c.x - self.pan.x) / self.zoom,
            -(screen.y - c.y - self.pan.y) / self.zoom,
        )
    }

    /// Multiplies the zoom by `factor` (clamped to `[MIN_ZOOM, MAX_ZOOM]`) keeping the map point
    /// under `anchor` fixed on screen.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let before = self.to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let after = self.to_screen(before);
        self.pan.x += anchor.x - after.x;
        self.pan.y += anchor.y - after.y;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.pan.x += dx;
            self.pan.y += dy;
        }
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ORIGIN;
        self.drag = None;
    }

    /// Selects the entity with `id`; unknown ids clear the selection. Returns whether something
    /// is selected afterwards.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        self.selected = id
            .filter(|id| self.snapshot.position(id).is_some())
            .map(str::to_string);
        self.selected.is_some()
    }

    /// Topmost position within `radius` screen pixels of `screen`, nearest first.
    pub fn hit_test(&self, screen: Point, radius: f64) -> Option<&Position> {
        self.snapshot
            .positions
            .iter()
            .map(|p| (p, self.to_screen(p.point()).distance(&screen)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    pub fn begin_drag(&mut self, screen: Point) {
        self.drag = Some(Drag {
            last: screen,
            moved: 0.0,
        });
    }

    /// Pans by the pointer delta since the previous drag event.
    pub fn drag_to(&mut self, screen: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let dx = screen.x - drag.last.x;
        let dy = screen.y - drag.last.y;
        drag.moved += dx.hypot(dy);
        drag.last = screen;
        self.pan_by(dx, dy);
    }

    /// Ends the drag. A drag that barely moved counts as a click: it selects whatever is under
    /// the pointer (or clears the selection). Returns true for clicks.
    pub fn end_drag(&mut self, screen: Point, click_tolerance: f64) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if drag.moved > click_tolerance {
            return false;
        }
        let hit = self.hit_test(screen, click_tolerance.max(8.0)).map(|p| p.id.clone());
        self.select(hit.as_deref());
        true
    }
}
