/// Scatter plot module
///
/// This module handles everything between the feature table and the screen:
/// - Data-space/screen-space conversions (transform.rs)
/// - Projection of feature pairs into display points (projection.rs)
/// - The interactive canvas program (canvas.rs)

pub mod canvas;
pub mod projection;
pub mod transform;
