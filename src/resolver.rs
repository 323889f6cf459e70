/// Point-to-image resolution
///
/// Maps a point identifier back to an image file on disk through the
/// dataset's image index. Every failure on this path is a data-quality
/// issue, not a program error: log a warning and return `None` so the rest
/// of the plot keeps rendering.
use std::path::PathBuf;

use crate::state::dataset::{CellValue, Dataset};
use crate::state::image_index::normalize_separators;

/// Resolve a point identifier to a displayable image file
///
/// The stored `image_file` value is matched first by its normalized
/// relative path, then by its bare file name, tolerating CSVs written on a
/// different platform or with a different root.
pub fn resolve_image(dataset: &Dataset, point_id: &CellValue) -> Option<PathBuf> {
    if point_id.is_null() {
        log::warn!("cannot resolve image: point has no identifier");
        return None;
    }

    let Some(id_column) = dataset.table.column("id") else {
        log::warn!("cannot resolve image: dataset has no id column");
        return None;
    };

    let Some(row) = id_column.iter().position(|cell| cell.coerced_eq(point_id)) else {
        log::warn!("cannot resolve image: id {} not found", point_id);
        return None;
    };

    let stored = match dataset.table.cell("image_file", row) {
        Some(cell) if !cell.is_null() => cell.to_string(),
        _ => {
            log::warn!("cannot resolve image: row {} has no image_file", row);
            return None;
        }
    };

    let normalized = normalize_separators(&stored);
    if let Some(path) = dataset.images.get(&normalized) {
        return Some(path.clone());
    }

    let basename = normalized.rsplit('/').next().unwrap_or(&normalized);
    if let Some(path) = dataset.images.get(basename) {
        return Some(path.clone());
    }

    log::warn!("image {} not found in the uploaded folder", normalized);
    None
}
