use serde::{Deserialize, Serialize};

use crate::models::{Position, Size};

const MIN_ZOOM: f64 = 1e-3;

/// Pan/zoom transform between screen space and graph space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self {
            x,
            y,
            zoom: Self::sanitize_zoom(zoom),
        }
    }

    fn sanitize_zoom(zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.max(MIN_ZOOM)
        } else {
            1.0
        }
    }

    pub fn to_graph(&self, screen: Position) -> Position {
        let zoom = Self::sanitize_zoom(self.zoom);
        Position::new((screen.x - self.x) / zoom, (screen.y - self.y) / zoom)
    }

    pub fn to_screen(&self, graph: Position) -> Position {
        let zoom = Self::sanitize_zoom(self.zoom);
        Position::new(graph.x * zoom + self.x, graph.y * zoom + self.y)
    }

    /// Graph-space point under the centre of a visible area of `bounds`.
    pub fn visible_center(&self, bounds: Size) -> Position {
        self.to_graph(Position::new(bounds.width / 2.0, bounds.height / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_viewport_maps_straight_through() {
        let viewport = Viewport::default();
        assert_eq!(viewport.to_graph(Position::new(30.0, 40.0)), Position::new(30.0, 40.0));
    }

    #[test]
    fn pan_and_zoom_are_undone() {
        let viewport = Viewport::new(100.0, -50.0, 2.0);
        let graph = viewport.to_graph(Position::new(300.0, 150.0));
        assert_eq!(graph, Position::new(100.0, 100.0));
        assert_eq!(viewport.to_screen(graph), Position::new(300.0, 150.0));
    }

    #[test]
    fn visible_center_tracks_scroll_and_zoom() {
        let bounds = Size::new(800.0, 600.0);
        assert_eq!(Viewport::default().visible_center(bounds), Position::new(400.0, 300.0));
        assert_eq!(
            Viewport::new(-400.0, -300.0, 0.5).visible_center(bounds),
            Position::new(1600.0, 1200.0)
        );
    }

    #[test]
    fn degenerate_zoom_is_sanitized() {
        let viewport = Viewport::new(0.0, 0.0, 0.0);
        assert_eq!(viewport.zoom, MIN_ZOOM);
        let nan = Viewport::new(0.0, 0.0, f64::NAN);
        assert_eq!(nan.zoom, 1.0);
    }
}
