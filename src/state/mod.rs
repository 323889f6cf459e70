/// State management module
///
/// This module handles the data side of the viewer, including:
/// - The column-oriented feature table and dataset container (dataset.rs)
/// - The image-file lookup index built at upload time (image_index.rs)
/// - Pan/zoom viewport state and its clamping rules (viewport.rs)

pub mod dataset;
pub mod image_index;
pub mod viewport;
