use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};
use venuesignal_common::{GeoPoint, SpatialConfig, Venue, VenueFilter};

use crate::colormap::ColorScale;
use crate::geometry::cell_geometry;
use crate::stats::{mean, median, sample_std};

/// Saturation constant used when no cell has a positive density.
pub const DEFAULT_SATURATION_K: f64 = 1.0;

/// Derived statistics for one occupied hex cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexCellSummary {
    pub cell: String,
    pub member_count: usize,
    /// Mean base priority of scored members; 0.0 when none is scored.
    pub mean_priority: f64,
    pub priority_std: Option<f64>,
    pub event_volume: f64,
    pub area_km2: f64,
    pub density: f64,
    pub dens_eff: f64,
    pub score: f64,
    pub color: String,
    #[serde(skip)]
    pub boundary: Vec<GeoPoint>,
}

/// Aggregated layer: occupied cells sorted by id plus the fitted color scale.
#[derive(Debug, Clone, Serialize)]
pub struct HexLayer {
    pub cells: Vec<HexCellSummary>,
    pub scale: ColorScale,
    /// Median positive density used to saturate `density`.
    pub saturation_k: f64,
}

impl HexLayer {
    pub fn venue_count(&self) -> usize {
        self.cells.iter().map(|c| c.member_count).sum()
    }
}

/// Venues matching `filter`, in input order.
pub fn filter_venues<'a>(
    venues: &'a [Venue],
    filter: &VenueFilter,
    priority_genres: &[String],
) -> Vec<&'a Venue> {
    venues
        .iter()
        .filter(|v| filter.matches(v, priority_genres))
        .collect()
}

/// Group venues by hex cell and score every occupied cell.
///
/// Returns `None` when no venue carries a cell id.
pub fn aggregate<'a>(
    venues: impl IntoIterator<Item = &'a Venue>,
    config: &SpatialConfig,
) -> Option<HexLayer> {
    let mut groups: BTreeMap<&str, Vec<&Venue>> = BTreeMap::new();
    let mut skipped = 0usize;
    for venue in venues {
        match venue.hex_cell.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(cell) => groups.entry(cell).or_default().push(venue),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "Venues without a hex cell were not aggregated");
    }
    if groups.is_empty() {
        return None;
    }

    let has_totals = groups
        .values()
        .flatten()
        .any(|v| v.event_total().is_some());

    let mut cells: Vec<HexCellSummary> = groups
        .into_iter()
        .map(|(cell, members)| summarize(cell, &members, has_totals, config))
        .collect();

    let positive: Vec<f64> = cells
        .iter()
        .map(|c| c.density)
        .filter(|d| *d > 0.0)
        .collect();
    let k = median(&positive).unwrap_or(DEFAULT_SATURATION_K);

    for cell in &mut cells {
        cell.dens_eff = saturate(cell.density, k);
        cell.score = cell.mean_priority * cell.dens_eff;
    }

    let scores: Vec<f64> = cells.iter().map(|c| c.score).collect();
    let scale = ColorScale::fit(&scores, config.lower_percentile, config.upper_percentile)?;
    for cell in &mut cells {
        cell.color = scale.color(cell.score);
    }

    info!(
        cells = cells.len(),
        saturation_k = k,
        vmin = scale.vmin,
        vmax = scale.vmax,
        "Hex layer aggregated"
    );

    Some(HexLayer {
        cells,
        scale,
        saturation_k: k,
    })
}

/// `d / (d + k)`; non-positive or non-finite densities saturate to 0.
pub fn saturate(density: f64, k: f64) -> f64 {
    if !density.is_finite() || density <= 0.0 {
        return 0.0;
    }
    density / (density + k)
}

fn summarize(
    cell: &str,
    members: &[&Venue],
    has_totals: bool,
    config: &SpatialConfig,
) -> HexCellSummary {
    let scores: Vec<f64> = members.iter().filter_map(|v| v.base_priority).collect();
    let event_volume = if has_totals {
        members.iter().filter_map(|v| v.event_total()).sum()
    } else {
        members.len() as f64
    };

    let geometry = cell_geometry(cell, config.resolution);
    let density = members.len() as f64 / geometry.area_km2;

    HexCellSummary {
        cell: cell.to_string(),
        member_count: members.len(),
        mean_priority: mean(&scores).unwrap_or(0.0),
        priority_std: sample_std(&scores),
        event_volume,
        area_km2: geometry.area_km2,
        density,
        dens_eff: 0.0,
        score: 0.0,
        color: String::new(),
        boundary: geometry.boundary,
    }
}
