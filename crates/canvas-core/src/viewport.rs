//! Zoom/pan transform and screen ↔ canvas conversion.
//!
//! Screen space is the host's pointer coordinate space; the canvas element
//! sits at `Surface::origin` inside it. Canvas space is where node positions
//! live. `screen = origin + pan + canvas * zoom`.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.15;
pub const MAX_ZOOM: f64 = 2.5;

/// The canvas element's placement in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Screen-space top-left of the canvas element.
    pub origin: Point,
    /// Visible size of the canvas element.
    pub size: Size,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            size: Size::new(800.0, 600.0),
        }
    }
}

/// Zoom factor plus pan offset (CSS pixels, relative to the surface origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Clamp `zoom` into `[MIN_ZOOM, MAX_ZOOM]`. NaN leaves the zoom unchanged.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            log::warn!("ignoring NaN zoom");
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Adjust zoom by `ticks` steps of `step` (positive zooms in).
    pub fn zoom_by(&mut self, ticks: f64, step: f64) {
        self.set_zoom(self.zoom + ticks * step);
    }

    /// Zoom by `ticks` steps while keeping the canvas point under `screen`
    /// where it is.
    pub fn zoom_at(&mut self, surface: &Surface, screen: Point, ticks: f64, step: f64) {
        let anchor = self.screen_to_canvas(surface, screen);
        self.zoom_by(ticks, step);
        self.set_pan(
            screen.x - surface.origin.x - anchor.x * self.zoom,
            screen.y - surface.origin.y - anchor.y * self.zoom,
        );
    }

    /// Set the pan offset. Unclamped; non-finite input is ignored.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            log::warn!("ignoring non-finite pan ({x}, {y})");
            return;
        }
        self.pan_x = x;
        self.pan_y = y;
    }

    pub fn pan(&self) -> Vec2 {
        Vec2::new(self.pan_x, self.pan_y)
    }

    /// Convert a screen-space point to canvas coordinates.
    pub fn screen_to_canvas(&self, surface: &Surface, screen: Point) -> Point {
        Point::new(
            (screen.x - surface.origin.x - self.pan_x) / self.zoom,
            (screen.y - surface.origin.y - self.pan_y) / self.zoom,
        )
    }

    /// Convert a canvas-space point to screen coordinates.
    pub fn canvas_to_screen(&self, surface: &Surface, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan_x + surface.origin.x,
            canvas.y * self.zoom + self.pan_y + surface.origin.y,
        )
    }

    /// Convert a screen-space distance (pixels) to a canvas-space distance.
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Zoom and pan so `content` (plus `padding` on every side) is centred
    /// in the surface. Returns `false` and leaves the viewport untouched when
    /// `content` is degenerate or the surface has no area.
    pub fn fit_to(&mut self, content: Rect, padding: f64, surface: &Surface) -> bool {
        let padded = content.inflate(padding, padding);
        let (w, h) = (padded.width(), padded.height());
        if !(w > 0.0 && h > 0.0) || surface.size.width <= 0.0 || surface.size.height <= 0.0 {
            return false;
        }
        let zoom = (surface.size.width / w)
            .min(surface.size.height / h)
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = padded.center();
        self.zoom = zoom;
        self.pan_x = surface.size.width / 2.0 - center.x * zoom;
        self.pan_y = surface.size.height / 2.0 - center.y * zoom;
        log::debug!(
            "fit_to {content:?}: zoom={:.3} pan=({:.1}, {:.1})",
            self.zoom,
            self.pan_x,
            self.pan_y
        );
        true
    }
}

/// A pan gesture in progress: start screen point and start pan offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    start_screen: Point,
    start_pan: Vec2,
}

impl PanSession {
    pub fn begin(viewport: &Viewport, screen: Point) -> Self {
        Self {
            start_screen: screen,
            start_pan: viewport.pan(),
        }
    }

    /// `pan = startPan + (current - startScreen)`.
    pub fn update(&self, viewport: &mut Viewport, screen: Point) {
        let pan = self.start_pan + (screen - self.start_screen);
        viewport.set_pan(pan.x, pan.y);
    }
}
