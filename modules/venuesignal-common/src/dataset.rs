use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DataError;
use crate::tables::{
    event_partition_year, read_event_partition, read_priority_table, read_venue_table,
    venue_table_city, venue_table_name,
};
use crate::types::{EventLog, EventRecord, PriorityTable, Venue};

struct Cached<T> {
    modified: SystemTime,
    value: Arc<T>,
}

type Memo<T> = Mutex<HashMap<PathBuf, Cached<T>>>;

/// Read-through cache over the venue tables and event partitions.
///
/// Parsed files are memoized by path and reused until the file's modification
/// time changes. [`DatasetStore::refresh`] drops everything.
pub struct DatasetStore {
    venues_dir: PathBuf,
    events_dir: PathBuf,
    venues: Memo<Vec<Venue>>,
    priorities: Memo<PriorityTable>,
    events: Memo<Vec<EventRecord>>,
}

impl DatasetStore {
    pub fn new(venues_dir: impl Into<PathBuf>, events_dir: impl Into<PathBuf>) -> Self {
        Self {
            venues_dir: venues_dir.into(),
            events_dir: events_dir.into(),
            venues: Mutex::new(HashMap::new()),
            priorities: Mutex::new(HashMap::new()),
            events: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.venues_dir, &config.data_dir)
    }

    /// Drop every memoized file so the next read goes to disk.
    pub fn refresh(&self) {
        lock(&self.venues).clear();
        lock(&self.priorities).clear();
        lock(&self.events).clear();
        info!("Dataset cache cleared");
    }

    /// Cities with a `Locali_{city}.csv` table, sorted.
    pub fn cities(&self) -> Result<Vec<String>, DataError> {
        let mut cities: Vec<String> = list_dir(&self.venues_dir)?
            .iter()
            .filter_map(|p| venue_table_city(p))
            .collect();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }

    /// Venues of one city with usable coordinates.
    pub fn venues(&self, city: &str) -> Result<Arc<Vec<Venue>>, DataError> {
        let path = self.venues_dir.join(venue_table_name(city));
        memoized(&self.venues, &path, |p| read_venue_table(p, city))
    }

    /// Venues of several cities, concatenated in the order given. Unreadable
    /// tables are logged and skipped.
    pub fn all_venues(&self, cities: &[String]) -> Vec<Venue> {
        let mut out = Vec::new();
        for city in cities {
            match self.venues(city) {
                Ok(venues) => out.extend(venues.iter().cloned()),
                Err(e) => warn!(city = city.as_str(), error = %e, "Skipping venue table"),
            }
        }
        out
    }

    /// Base priorities for the given regions. Regions whose venue table is
    /// missing or unreadable are skipped with a warning.
    pub fn priority_table(&self, regions: &[String]) -> PriorityTable {
        let mut rows = Vec::new();
        for region in regions {
            let path = self.venues_dir.join(venue_table_name(region));
            if !path.is_file() {
                warn!(region = region.as_str(), path = %path.display(), "No venue table for region");
                continue;
            }
            match memoized(&self.priorities, &path, |p| {
                read_priority_table(p, region).map(PriorityTable::from_rows)
            }) {
                Ok(table) => rows.extend(table.rows().iter().cloned()),
                Err(e) => warn!(region = region.as_str(), error = %e, "Skipping priority table"),
            }
        }
        PriorityTable::from_rows(rows)
    }

    /// Every `Eventi_{region}_{year}.csv` partition for the given regions.
    pub fn event_log(&self, regions: &[String]) -> Result<EventLog, DataError> {
        let files = list_dir(&self.events_dir)?;
        let mut log = EventLog::default();

        for region in regions {
            let mut partitions: Vec<(i32, &PathBuf)> = files
                .iter()
                .filter_map(|p| event_partition_year(p, region).map(|year| (year, p)))
                .collect();
            partitions.sort_by_key(|(year, _)| *year);

            for (year, path) in partitions {
                match memoized(&self.events, path, |p| read_event_partition(p, region, year)) {
                    Ok(events) => {
                        debug!(region = region.as_str(), year, rows = events.len(), "Loaded event partition");
                        log.extend(year, events.iter().cloned());
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "Skipping event partition"),
                }
            }
        }

        info!(
            regions = regions.len(),
            years = log.years.len(),
            events = log.events.len(),
            "Event log assembled"
        );
        Ok(log)
    }
}

fn lock<T>(memo: &Memo<T>) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Cached<T>>> {
    memo.lock().unwrap_or_else(PoisonError::into_inner)
}

fn io_error(path: &Path) -> impl Fn(io::Error) -> DataError + '_ {
    move |source| DataError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn memoized<T>(
    memo: &Memo<T>,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, DataError>,
) -> Result<Arc<T>, DataError> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(io_error(path))?;

    if let Some(hit) = lock(memo).get(path) {
        if hit.modified == modified {
            return Ok(Arc::clone(&hit.value));
        }
    }

    let value = Arc::new(load(path)?);
    lock(memo).insert(
        path.to_path_buf(),
        Cached {
            modified,
            value: Arc::clone(&value),
        },
    );
    Ok(value)
}

/// Files in `dir`. A missing directory reads as empty.
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "Data directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_error(dir)(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(io_error(dir))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
