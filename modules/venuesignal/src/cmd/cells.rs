use anyhow::Result;
use clap::Args;
use serde_json::json;
use tracing::{info, warn};

use venuesignal_common::VenueFilter;
use venuesignal_spatial::{aggregate, filter_venues, to_feature_collection};

use super::print_json;
use crate::regions::select_cities;
use crate::Context;

#[derive(Args)]
pub struct CellsArgs {
    /// City to include (repeatable). Defaults to every allowed city.
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Restrict to these districts (seprag_cod)
    #[arg(long = "district")]
    districts: Vec<String>,

    #[arg(long = "municipality")]
    municipalities: Vec<String>,

    /// Restrict to these genres; non-priority genres are grouped as "Altro"
    #[arg(long = "genre")]
    genres: Vec<String>,

    #[arg(long = "venue")]
    venues: Vec<String>,

    /// Emit a GeoJSON FeatureCollection instead of the cell table
    #[arg(long)]
    geojson: bool,
}

pub fn run(ctx: &Context, args: CellsArgs) -> Result<()> {
    let cities = select_cities(&ctx.store, &ctx.file.identity.allowed_regions, &args.cities)?;
    let venues = ctx.store.all_venues(&cities);

    let filter = VenueFilter {
        localities: Vec::new(),
        districts: args.districts,
        municipalities: args.municipalities,
        genres: args.genres,
        venues: args.venues,
    };
    let selected = filter_venues(&venues, &filter, &ctx.file.identity.priority_genres);
    info!(
        cities = cities.len(),
        loaded = venues.len(),
        selected = selected.len(),
        "Venues selected for aggregation"
    );

    let Some(layer) = aggregate(selected, &ctx.file.spatial) else {
        warn!("No venue carries a hex cell; nothing to aggregate");
        return print_json(&json!({ "cells": [] }));
    };

    if args.geojson {
        print_json(&to_feature_collection(&layer))
    } else {
        print_json(&layer)
    }
}
