use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Genre bucket for venues whose genre is not in the priority list.
pub const OTHER_GENRE: &str = "Altro";

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// A coordinate is usable when both parts are finite and neither is the
    /// `0.0` placeholder the upstream exports write for missing geocodes.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat != 0.0 && self.lng != 0.0
    }
}

// --- Monthly History ---

/// Calendar month key, written as `MM/YYYY` in venue tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl FromStr for YearMonth {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, year) = s.trim().split_once('/').ok_or(())?;
        if month.len() != 2 || year.len() != 4 {
            return Err(());
        }
        let month: u32 = month.parse().map_err(|_| ())?;
        let year: i32 = year.parse().map_err(|_| ())?;
        if !(1..=12).contains(&month) {
            return Err(());
        }
        Ok(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: YearMonth,
    pub count: f64,
}

// --- Venues ---

/// A physical venue as exported by the upstream scoring job.
///
/// `base_priority` is produced upstream and treated as opaque here; nothing in
/// the engine recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    /// Regional office the venue belongs to (`sede`).
    pub locality: String,
    /// Sub-city administrative code (`seprag_cod`).
    pub district: Option<String>,
    pub municipality: Option<String>,
    pub address: Option<String>,
    pub genre: Option<String>,
    pub location: GeoPoint,
    pub base_priority: Option<f64>,
    pub hex_cell: Option<String>,
    pub events_total: Option<f64>,
    /// Ordered oldest to newest.
    pub monthly_events: Vec<MonthlyCount>,
}

impl Venue {
    /// Event volume for this venue: the precomputed total when present,
    /// otherwise the sum of the monthly history.
    pub fn event_total(&self) -> Option<f64> {
        if let Some(total) = self.events_total {
            return Some(total);
        }
        if self.monthly_events.is_empty() {
            return None;
        }
        Some(self.monthly_events.iter().map(|m| m.count).sum())
    }
}

/// Map a raw genre onto the priority list, bucketing everything else as
/// [`OTHER_GENRE`].
pub fn normalize_genre(genre: Option<&str>, priority_genres: &[String]) -> String {
    match genre {
        Some(g) if priority_genres.iter().any(|p| p == g) => g.to_string(),
        _ => OTHER_GENRE.to_string(),
    }
}

/// Venue subset selection shared by the map and ranking views.
/// An empty list means "no restriction" for that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueFilter {
    pub localities: Vec<String>,
    pub districts: Vec<String>,
    pub municipalities: Vec<String>,
    /// Compared against the normalized genre.
    pub genres: Vec<String>,
    pub venues: Vec<String>,
}

impl VenueFilter {
    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
            && self.districts.is_empty()
            && self.municipalities.is_empty()
            && self.genres.is_empty()
            && self.venues.is_empty()
    }

    pub fn matches(&self, venue: &Venue, priority_genres: &[String]) -> bool {
        allows(&self.localities, Some(venue.locality.as_str()))
            && allows(&self.districts, venue.district.as_deref())
            && allows(&self.municipalities, venue.municipality.as_deref())
            && allows(&self.venues, Some(venue.name.as_str()))
            && (self.genres.is_empty()
                || self
                    .genres
                    .contains(&normalize_genre(venue.genre.as_deref(), priority_genres)))
    }
}

/// `true` when `allowed` is empty or contains `value`.
pub fn allows(allowed: &[String], value: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match value {
        Some(v) => allowed.iter().any(|a| a == v),
        None => false,
    }
}

// --- Events ---

/// One declared event, partitioned by the year of the file it was ingested from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub venue: String,
    pub locality: String,
    pub district: Option<String>,
    pub genre: Option<String>,
    pub municipality: Option<String>,
    pub address: Option<String>,
    pub starts_at: NaiveDateTime,
    pub year: i32,
}

impl EventRecord {
    pub fn date(&self) -> NaiveDate {
        self.starts_at.date()
    }
}

/// Multi-year event history for one or more regions.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Years for which a partition was loaded, even if it held no rows.
    pub years: BTreeSet<i32>,
    pub events: Vec<EventRecord>,
}

impl EventLog {
    pub fn new(years: impl IntoIterator<Item = i32>, events: Vec<EventRecord>) -> Self {
        Self {
            years: years.into_iter().collect(),
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn extend(&mut self, year: i32, events: impl IntoIterator<Item = EventRecord>) {
        self.years.insert(year);
        self.events.extend(events);
    }
}

// --- Base Priority ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePriority {
    pub venue: String,
    pub locality: String,
    pub score: Option<f64>,
}

/// Per-venue base priority scores, unique on (venue, locality).
#[derive(Debug, Clone, Default)]
pub struct PriorityTable {
    rows: Vec<BasePriority>,
}

impl PriorityTable {
    /// Build a table keeping the first row for each (venue, locality).
    pub fn from_rows(rows: impl IntoIterator<Item = BasePriority>) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|r| seen.insert((r.venue.clone(), r.locality.clone())))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[BasePriority] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has a row for this venue in this locality.
    pub fn contains(&self, venue: &str, locality: &str) -> bool {
        self.rows
            .iter()
            .any(|r| r.venue == venue && r.locality == locality)
    }
}
