/// Render projection
///
/// Turns the two selected feature columns into a finite collection of
/// on-screen points. The result is recomputed from scratch whenever the
/// selection, the table, or the viewport changes; nothing is diffed or
/// mutated in place.
use crate::plot::transform;
use crate::state::dataset::{CellValue, FeatureTable};
use crate::state::viewport::ViewportState;

/// One projected point, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPoint {
    /// Row index in the feature table
    pub row: usize,
    /// Value of the `id` column for this row, `Null` when absent
    pub id: CellValue,
    pub screen_x: f32,
    pub screen_y: f32,
    /// Base64-encoded thumbnail from the CSV, when the column carries one
    pub thumbnail: Option<String>,
}

/// Project every row of the selected feature pair through the viewport
///
/// Produces an empty collection when the view is not ready: a selection is
/// unset, a selected column is missing or non-numeric, or the canvas has no
/// measured size. Rows whose selected cells are null are skipped; row count
/// is otherwise the minimum of the two column lengths.
pub fn project(
    table: &FeatureTable,
    selected_x: Option<&str>,
    selected_y: Option<&str>,
    viewport: &ViewportState,
) -> Vec<DisplayPoint> {
    let (Some(x_name), Some(y_name)) = (selected_x, selected_y) else {
        return Vec::new();
    };
    if !viewport.has_canvas() {
        return Vec::new();
    }
    if !table.is_numeric_column(x_name) || !table.is_numeric_column(y_name) {
        return Vec::new();
    }

    // both lookups succeed, is_numeric_column checked existence
    let col_x = table.column(x_name).unwrap_or_default();
    let col_y = table.column(y_name).unwrap_or_default();
    let rows = col_x.len().min(col_y.len());

    let mut points = Vec::with_capacity(rows);
    for row in 0..rows {
        let (Some(x), Some(y)) = (col_x[row].as_number(), col_y[row].as_number()) else {
            continue;
        };

        let (screen_x, screen_y) = transform::to_screen(x as f32, y as f32, viewport);
        let id = table
            .cell("id", row)
            .cloned()
            .unwrap_or(CellValue::Null);
        let thumbnail = table
            .cell("thumbnail", row)
            .and_then(|c| c.as_text())
            .map(str::to_string);

        points.push(DisplayPoint {
            row,
            id,
            screen_x,
            screen_y,
            thumbnail,
        });
    }

    points
}

/// Nearest point within `radius` pixels of the cursor, for hover picking
pub fn hit_test(points: &[DisplayPoint], x: f32, y: f32, radius: f32) -> Option<&DisplayPoint> {
    let radius_sq = radius * radius;

    points
        .iter()
        .map(|p| {
            let dx = p.screen_x - x;
            let dy = p.screen_y - y;
            (p, dx * dx + dy * dy)
        })
        .filter(|(_, dist_sq)| *dist_sq <= radius_sq)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(p, _)| p)
}
