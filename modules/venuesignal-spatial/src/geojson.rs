use serde_json::{json, Value};
use tracing::debug;

use crate::aggregate::{HexCellSummary, HexLayer};

/// Render the layer as a GeoJSON `FeatureCollection` of closed `[lon, lat]`
/// polygons. Cells without a decodable outline are left out.
pub fn to_feature_collection(layer: &HexLayer) -> Value {
    let features: Vec<Value> = layer.cells.iter().filter_map(feature).collect();
    if features.len() < layer.cells.len() {
        debug!(
            omitted = layer.cells.len() - features.len(),
            "Cells without an outline left out of GeoJSON"
        );
    }
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn feature(cell: &HexCellSummary) -> Option<Value> {
    let first = cell.boundary.first()?;
    let mut ring: Vec<[f64; 2]> = cell.boundary.iter().map(|p| [p.lng, p.lat]).collect();
    ring.push([first.lng, first.lat]);

    Some(json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring],
        },
        "properties": {
            "h3_cell": cell.cell,
            "ps_mean": cell.mean_priority,
            "ps_std": cell.priority_std,
            "locali_count": cell.member_count,
            "events_sum": cell.event_volume,
            "density": cell.density,
            "dens_eff": cell.dens_eff,
            "score": cell.score,
            "color": cell.color,
        },
    }))
}
