use anyhow::{bail, Result};
use tracing::warn;

use venuesignal_common::DatasetStore;

/// Cities the operator may query: the available tables, narrowed to the
/// allow-list (when set) and then to the requested cities (when given).
pub fn select_cities(
    store: &DatasetStore,
    allowed: &[String],
    requested: &[String],
) -> Result<Vec<String>> {
    let available = store.cities()?;
    let permitted = narrow(&available, allowed, requested);

    for city in requested {
        if !permitted.contains(city) {
            warn!(city = city.as_str(), "Requested city is unavailable or not allowed");
        }
    }
    if permitted.is_empty() {
        bail!("No venue table available for the selected cities");
    }
    Ok(permitted)
}

fn narrow(available: &[String], allowed: &[String], requested: &[String]) -> Vec<String> {
    available
        .iter()
        .filter(|c| allowed.is_empty() || allowed.contains(c))
        .filter(|c| requested.is_empty() || requested.contains(c))
        .cloned()
        .collect()
}
