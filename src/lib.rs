//! Featurescope
//!
//! A scatter-plot viewer for image feature datasets. Drop a folder holding
//! a features CSV plus its images, pick two feature columns, and explore
//! the points with pan/zoom and on-hover image previews. The `featurize`
//! binary prepares that folder format from a plain directory of images.

pub mod app;
pub mod config;
pub mod featurize;
pub mod plot;
pub mod resolver;
pub mod state;
pub mod upload;

pub use app::FeatureScope;
