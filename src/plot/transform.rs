/// Normalized-data-space to screen-space conversions
///
/// Data space is the [0,1]x[0,1] square derived from the selected feature
/// columns; screen space is canvas pixels. Both directions are pure and
/// total for finite inputs. `to_data` ignores the pan origin on purpose:
/// callers compose it themselves when they turn pointer deltas into pan
/// offsets. Canvas dimensions of zero make the results undefined, so
/// callers guard with `ViewportState::has_canvas` first.
use crate::state::viewport::{ViewportState, BASE_ZOOM};

/// Magnification relative to the unzoomed view
pub fn zoom_rel(viewport: &ViewportState) -> f32 {
    viewport.zoom_level / BASE_ZOOM
}

/// Project a normalized data point to canvas pixels
pub fn to_screen(data_x: f32, data_y: f32, viewport: &ViewportState) -> (f32, f32) {
    let zoom = zoom_rel(viewport);
    let half_w = viewport.canvas_width / 2.0;
    let half_h = viewport.canvas_height / 2.0;

    let screen_x =
        ((data_x + viewport.origin_x) * viewport.canvas_width - half_w) * zoom + half_w;
    let screen_y =
        ((data_y + viewport.origin_y) * viewport.canvas_height - half_h) * zoom + half_h;

    (screen_x, screen_y)
}

/// Algebraic inverse of `to_screen`, minus the origin term
pub fn to_data(screen_x: f32, screen_y: f32, viewport: &ViewportState) -> (f32, f32) {
    let zoom = zoom_rel(viewport);
    let half_w = viewport.canvas_width / 2.0;
    let half_h = viewport.canvas_height / 2.0;

    let data_x = ((screen_x - half_w) / zoom + half_w) / viewport.canvas_width;
    let data_y = ((screen_y - half_h) / zoom + half_h) / viewport.canvas_height;

    (data_x, data_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn viewport(zoom: f32, origin_x: f32, origin_y: f32) -> ViewportState {
        ViewportState {
            zoom_level: zoom,
            origin_x,
            origin_y,
            canvas_width: 1000.0,
            canvas_height: 1000.0,
        }
    }

    #[test]
    fn test_default_viewport_projects_formula_values() {
        // canvas 1000x1000, zoom 300, no pan: (0.2, 0.8) lands on (200, 800)
        let vp = viewport(BASE_ZOOM, 0.0, 0.0);

        let (sx, sy) = to_screen(0.2, 0.8, &vp);
        assert!(approx_eq(sx, 200.0));
        assert!(approx_eq(sy, 800.0));

        let (sx, sy) = to_screen(0.6, 0.1, &vp);
        assert!(approx_eq(sx, 600.0));
        assert!(approx_eq(sy, 100.0));
    }

    #[test]
    fn test_zoom_scales_away_from_center() {
        // at 2x, a point half-way between center and edge moves to the edge
        let vp = viewport(600.0, 0.0, 0.0);
        let (sx, sy) = to_screen(0.75, 0.25, &vp);
        assert!(approx_eq(sx, 1000.0));
        assert!(approx_eq(sy, 0.0));
    }

    #[test]
    fn test_round_trip_without_origin() {
        for zoom in [300.0, 450.0, 900.0, 3000.0] {
            let vp = viewport(zoom, 0.0, 0.0);
            for &(x, y) in &[(0.0, 0.0), (0.5, 0.5), (0.2, 0.8), (1.0, 0.0)] {
                let (sx, sy) = to_screen(x, y, &vp);
                let (dx, dy) = to_data(sx, sy, &vp);
                assert!(approx_eq(dx, x), "x mismatch at zoom {}", zoom);
                assert!(approx_eq(dy, y), "y mismatch at zoom {}", zoom);
            }
        }
    }

    #[test]
    fn test_round_trip_composes_origin() {
        // to_data ignores the origin, so the round trip re-adds it
        let vp = viewport(600.0, 0.1, -0.05);
        let (sx, sy) = to_screen(0.4, 0.6, &vp);
        let (dx, dy) = to_data(sx, sy, &vp);
        assert!(approx_eq(dx, 0.4 + 0.1));
        assert!(approx_eq(dy, 0.6 - 0.05));
    }

    #[test]
    fn test_canvas_center_is_zoom_invariant() {
        for zoom in [300.0, 750.0, 1500.0] {
            let vp = viewport(zoom, 0.0, 0.0);
            let (sx, sy) = to_screen(0.5, 0.5, &vp);
            assert!(approx_eq(sx, 500.0));
            assert!(approx_eq(sy, 500.0));
        }
    }
}
