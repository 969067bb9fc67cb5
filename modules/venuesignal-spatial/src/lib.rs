//! Hexagonal aggregation of venues into a choropleth layer.
//!
//! Venues are grouped by their precomputed H3 cell, each cell gets a
//! saturated density and a combined score, and a percentile-based color scale
//! is fitted over the scores.

pub mod aggregate;
pub mod colormap;
pub mod geojson;
pub mod geometry;
pub mod stats;

pub use aggregate::{aggregate, filter_venues, HexCellSummary, HexLayer};
pub use colormap::ColorScale;
pub use geojson::to_feature_collection;
