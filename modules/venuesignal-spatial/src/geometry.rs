use std::str::FromStr;

use h3o::{CellIndex, Resolution};
use tracing::debug;
use venuesignal_common::GeoPoint;

/// Area and outline of one hex cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGeometry {
    pub area_km2: f64,
    /// Vertex ring, not closed. Empty when the id cannot be decoded.
    pub boundary: Vec<GeoPoint>,
}

/// Resolve geometry for a cell id.
///
/// The exact cell area is used when available; otherwise the average hexagon
/// area of the cell's resolution, or of `fallback_resolution` when the id does
/// not decode.
pub fn cell_geometry(cell_id: &str, fallback_resolution: u8) -> CellGeometry {
    match CellIndex::from_str(cell_id.trim()) {
        Ok(cell) => {
            let exact = cell.area_km2();
            let area_km2 = if exact.is_finite() && exact > 0.0 {
                exact
            } else {
                cell.resolution().area_km2()
            };
            let boundary = cell
                .boundary()
                .iter()
                .map(|ll| GeoPoint::new(ll.lat(), ll.lng()))
                .collect();
            CellGeometry { area_km2, boundary }
        }
        Err(e) => {
            debug!(cell = cell_id, error = %e, "Undecodable cell id, using average area");
            CellGeometry {
                area_km2: average_area_km2(fallback_resolution),
                boundary: Vec::new(),
            }
        }
    }
}

/// Average hexagon area at a resolution; out-of-range values use resolution 8.
pub fn average_area_km2(resolution: u8) -> f64 {
    Resolution::try_from(resolution)
        .unwrap_or(Resolution::Eight)
        .area_km2()
}
