/// Pan/zoom state for the scatter canvas
///
/// `origin_x`/`origin_y` are the pan offset expressed in normalized data
/// space, applied before scaling to screen space. `zoom_level` is floored
/// at `BASE_ZOOM` (no zoom-out below 1.0x). This state is owned by the
/// application, mutated only through the methods here, and never persisted.
use crate::plot::transform;

/// Zoom level of the unzoomed (1.0x) view
pub const BASE_ZOOM: f32 = 300.0;

/// Marker diameter scale relative to the zoom level
const POINT_SIZE_FACTOR: f32 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom_level: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom_level: BASE_ZOOM,
            origin_x: 0.0,
            origin_y: 0.0,
            canvas_width: 0.0,
            canvas_height: 0.0,
        }
    }
}

impl ViewportState {
    /// Whether the canvas has a measured, nonzero size
    ///
    /// Transforms divide by the canvas dimensions; callers must not project
    /// before this returns true.
    pub fn has_canvas(&self) -> bool {
        self.canvas_width > 0.0 && self.canvas_height > 0.0
    }

    /// Update canvas dimensions; pan and zoom are deliberately kept
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_width = width;
        self.canvas_height = height;
        self.clamp_origin();
    }

    /// Copy with different canvas dimensions, for live-bounds math
    pub fn with_canvas_size(&self, width: f32, height: f32) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..*self
        }
    }

    /// Apply a wheel delta in browser-like pixels; zoom never drops below
    /// the base level
    pub fn apply_wheel(&mut self, delta: f32) {
        self.zoom_level = (self.zoom_level + delta).max(BASE_ZOOM);
        self.clamp_origin();
    }

    /// Marker diameter in pixels, coupled monotonically to the zoom level
    pub fn point_size(&self) -> f32 {
        (POINT_SIZE_FACTOR * self.zoom_level).floor()
    }

    /// Shift the pan origin by a delta in normalized data space
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.origin_x += dx;
        self.origin_y += dy;
        self.clamp_origin();
    }

    /// Reset pan and zoom, keeping the measured canvas size
    pub fn reset_view(&mut self) {
        self.zoom_level = BASE_ZOOM;
        self.origin_x = 0.0;
        self.origin_y = 0.0;
    }

    /// Keep the unit square reachable at the current zoom
    ///
    /// The visible data-space rectangle is computed origin-free at the
    /// screen corners; the origin is then clamped so the view can never
    /// drift entirely outside [0,1]x[0,1]. The zoom floor guarantees the
    /// clamp interval is non-empty, and clamping is idempotent.
    pub fn clamp_origin(&mut self) {
        if !self.has_canvas() {
            return;
        }

        let view = *self;
        let (far_x, far_y) = transform::to_data(view.canvas_width, view.canvas_height, &view);
        let (near_x, near_y) = transform::to_data(0.0, 0.0, &view);

        self.origin_x = self.origin_x.clamp(far_x - 1.0, near_x);
        self.origin_y = self.origin_y.clamp(far_y - 1.0, near_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(zoom: f32) -> ViewportState {
        ViewportState {
            zoom_level: zoom,
            canvas_width: 1000.0,
            canvas_height: 800.0,
            ..ViewportState::default()
        }
    }

    #[test]
    fn test_zoom_floor_holds_for_any_wheel_sequence() {
        let mut vp = viewport(BASE_ZOOM);
        for delta in [120.0, -500.0, 48.0, -48.0, -10_000.0, 360.0] {
            vp.apply_wheel(delta);
            assert!(vp.zoom_level >= BASE_ZOOM);
        }
    }

    #[test]
    fn test_wheel_accumulates_above_floor() {
        let mut vp = viewport(BASE_ZOOM);
        vp.apply_wheel(120.0);
        vp.apply_wheel(60.0);
        assert_eq!(vp.zoom_level, 480.0);
    }

    #[test]
    fn test_point_size_follows_zoom() {
        assert_eq!(viewport(300.0).point_size(), 18.0);
        assert_eq!(viewport(400.0).point_size(), 24.0);

        // non-decreasing in zoom
        let mut last = 0.0;
        for zoom in (300..1500).step_by(37) {
            let size = viewport(zoom as f32).point_size();
            assert!(size >= last);
            last = size;
        }
    }

    #[test]
    fn test_no_panning_at_base_zoom() {
        let mut vp = viewport(BASE_ZOOM);
        vp.pan_by(0.3, -0.2);
        assert_eq!(vp.origin_x, 0.0);
        assert_eq!(vp.origin_y, 0.0);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let mut vp = viewport(900.0);
        vp.origin_x = 5.0;
        vp.origin_y = -5.0;
        vp.clamp_origin();
        let once = (vp.origin_x, vp.origin_y);
        vp.clamp_origin();
        assert_eq!((vp.origin_x, vp.origin_y), once);
    }

    #[test]
    fn test_clamp_leaves_interior_origins_alone() {
        let mut vp = viewport(900.0);
        vp.origin_x = 0.1;
        vp.origin_y = -0.1;
        vp.clamp_origin();
        assert_eq!(vp.origin_x, 0.1);
        assert_eq!(vp.origin_y, -0.1);
    }

    #[test]
    fn test_clamp_skips_degenerate_canvas() {
        let mut vp = ViewportState {
            origin_x: 3.0,
            ..ViewportState::default()
        };
        vp.clamp_origin();
        assert_eq!(vp.origin_x, 3.0);
    }

    #[test]
    fn test_resize_keeps_pan_and_zoom() {
        let mut vp = viewport(600.0);
        vp.origin_x = 0.1;
        vp.set_canvas_size(640.0, 480.0);
        assert_eq!(vp.zoom_level, 600.0);
        assert_eq!(vp.origin_x, 0.1);
        assert_eq!(vp.canvas_width, 640.0);
    }
}
