//! CSV readers for the venue tables (`Locali_{city}.csv`) and the yearly
//! event partitions (`Eventi_{region}_{year}.csv`).
//!
//! Column names follow the upstream exports. Rows that cannot be used (no
//! coordinates, unparseable timestamps) are dropped rather than failing the
//! whole file; structural problems (unreadable file, missing key columns) are
//! reported as [`DataError`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::error::DataError;
use crate::types::{BasePriority, EventRecord, GeoPoint, MonthlyCount, Venue, YearMonth};

const VENUE_PREFIX: &str = "Locali_";
const EVENT_PREFIX: &str = "Eventi_";
const CSV_SUFFIX: &str = ".csv";

/// Base priority assigned when a venue table has no score column at all.
pub const DEFAULT_BASE_PRIORITY: f64 = 1.0;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

// --- File naming ---

/// City name encoded in a venue table file name, e.g. `Locali_Roma.csv`.
pub fn venue_table_city(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let city = name.strip_prefix(VENUE_PREFIX)?.strip_suffix(CSV_SUFFIX)?;
    (!city.is_empty()).then(|| city.to_string())
}

pub fn venue_table_name(city: &str) -> String {
    format!("{VENUE_PREFIX}{city}{CSV_SUFFIX}")
}

/// Partition year encoded in an event file name, e.g. `Eventi_Roma_2024.csv`.
pub fn event_partition_year(path: &Path, region: &str) -> Option<i32> {
    let name = path.file_name()?.to_str()?;
    let rest = name
        .strip_prefix(EVENT_PREFIX)?
        .strip_prefix(region)?
        .strip_prefix('_')?
        .strip_suffix(CSV_SUFFIX)?;
    rest.parse().ok()
}

// --- Column access ---

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        Self { index }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn require(&self, origin: &Path, names: &[&'static str]) -> Result<(), DataError> {
        match names.iter().find(|n| !self.has(n)) {
            Some(&column) => Err(DataError::MissingColumn {
                path: origin.to_path_buf(),
                column,
            }),
            None => Ok(()),
        }
    }

    fn text<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        let i = *self.index.get(name)?;
        record.get(i).map(str::trim).filter(|v| !v.is_empty())
    }

    fn owned(&self, record: &StringRecord, name: &str) -> Option<String> {
        self.text(record, name).map(str::to_string)
    }

    fn number(&self, record: &StringRecord, name: &str) -> Option<f64> {
        self.text(record, name).and_then(parse_number)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_error(origin: &Path) -> impl Fn(csv::Error) -> DataError + '_ {
    move |source| DataError::Csv {
        path: origin.to_path_buf(),
        source,
    }
}

/// Parse an event start timestamp. Date-only values map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// --- Venue tables ---

pub fn read_venue_table(path: &Path, city: &str) -> Result<Vec<Venue>, DataError> {
    venue_table_from_reader(open(path)?, path, city)
}

/// Parse a venue table. The locality of every row is the city the file
/// belongs to, so joins against event partitions use the same key.
pub fn venue_table_from_reader<R: Read>(
    reader: R,
    origin: &Path,
    city: &str,
) -> Result<Vec<Venue>, DataError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(csv_error(origin))?.clone();
    let cols = Columns::new(&headers);
    cols.require(origin, &["des_locale", "latitudine", "longitudine"])?;

    let mut monthly: Vec<(usize, YearMonth)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.parse::<YearMonth>().ok().map(|ym| (i, ym)))
        .collect();
    monthly.sort_by_key(|(_, ym)| *ym);

    let mut venues = Vec::new();
    let mut dropped = 0usize;

    for record in rdr.records() {
        let record = record.map_err(csv_error(origin))?;

        let Some(name) = cols.owned(&record, "des_locale") else {
            dropped += 1;
            continue;
        };
        let location = GeoPoint::new(
            cols.number(&record, "latitudine").unwrap_or(f64::NAN),
            cols.number(&record, "longitudine").unwrap_or(f64::NAN),
        );
        if !location.is_usable() {
            dropped += 1;
            continue;
        }

        let monthly_events = monthly
            .iter()
            .filter_map(|(i, ym)| {
                record
                    .get(*i)
                    .and_then(parse_number)
                    .map(|count| MonthlyCount { month: *ym, count })
            })
            .collect();

        venues.push(Venue {
            name,
            locality: city.to_string(),
            district: cols.owned(&record, "seprag_cod"),
            municipality: cols.owned(&record, "comune"),
            address: cols.owned(&record, "indirizzo"),
            genre: cols.owned(&record, "locale_genere"),
            location,
            base_priority: cols.number(&record, "priority_score"),
            hex_cell: cols.owned(&record, "h3_cell"),
            events_total: cols.number(&record, "events_total"),
            monthly_events,
        });
    }

    if dropped > 0 {
        debug!(path = %origin.display(), dropped, "Dropped venue rows without name or coordinates");
    }
    Ok(venues)
}

// --- Base priority ---

pub fn read_priority_table(path: &Path, region: &str) -> Result<Vec<BasePriority>, DataError> {
    priority_table_from_reader(open(path)?, path, region)
}

/// Read the base priority of every venue in a venue table. Unlike the map
/// loader, rows without coordinates are kept: ranking does not need them.
pub fn priority_table_from_reader<R: Read>(
    reader: R,
    origin: &Path,
    region: &str,
) -> Result<Vec<BasePriority>, DataError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let cols = Columns::new(rdr.headers().map_err(csv_error(origin))?);
    cols.require(origin, &["des_locale"])?;

    let has_score = cols.has("priority_score");
    if !has_score {
        warn!(path = %origin.display(), "No priority_score column, defaulting to {DEFAULT_BASE_PRIORITY}");
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_error(origin))?;
        let Some(venue) = cols.owned(&record, "des_locale") else {
            continue;
        };
        let score = if has_score {
            cols.number(&record, "priority_score")
        } else {
            Some(DEFAULT_BASE_PRIORITY)
        };
        rows.push(BasePriority {
            venue,
            locality: region.to_string(),
            score,
        });
    }
    Ok(rows)
}

// --- Event partitions ---

pub fn read_event_partition(
    path: &Path,
    region: &str,
    year: i32,
) -> Result<Vec<EventRecord>, DataError> {
    event_partition_from_reader(open(path)?, path, region, year)
}

pub fn event_partition_from_reader<R: Read>(
    reader: R,
    origin: &Path,
    region: &str,
    year: i32,
) -> Result<Vec<EventRecord>, DataError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let cols = Columns::new(rdr.headers().map_err(csv_error(origin))?);
    cols.require(origin, &["des_locale", "data_ora_inizio"])?;

    let mut events = Vec::new();
    let mut unparsed = 0usize;

    for record in rdr.records() {
        let record = record.map_err(csv_error(origin))?;
        let (Some(venue), Some(starts_at)) = (
            cols.owned(&record, "des_locale"),
            cols.text(&record, "data_ora_inizio").and_then(parse_timestamp),
        ) else {
            unparsed += 1;
            continue;
        };

        events.push(EventRecord {
            venue,
            locality: region.to_string(),
            district: cols.owned(&record, "seprag_cod"),
            genre: cols.owned(&record, "locale_genere"),
            municipality: cols.owned(&record, "comune"),
            address: cols.owned(&record, "indirizzo"),
            starts_at,
            year,
        });
    }

    if unparsed > 0 {
        debug!(path = %origin.display(), unparsed, "Skipped event rows without venue or timestamp");
    }
    Ok(events)
}
