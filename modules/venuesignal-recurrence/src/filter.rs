use serde::{Deserialize, Serialize};
use venuesignal_common::{allows, EventRecord};

/// Event selection for the recurrence views. Empty lists do not restrict.
///
/// Genres are matched against the raw event genre, not the normalized bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurrenceFilter {
    pub localities: Vec<String>,
    pub districts: Vec<String>,
    pub genres: Vec<String>,
    pub venues: Vec<String>,
}

impl RecurrenceFilter {
    pub fn matches(&self, event: &EventRecord) -> bool {
        self.allows_locality(&event.locality)
            && allows(&self.districts, event.district.as_deref())
            && allows(&self.genres, event.genre.as_deref())
            && allows(&self.venues, Some(event.venue.as_str()))
    }

    pub fn allows_locality(&self, locality: &str) -> bool {
        allows(&self.localities, Some(locality))
    }
}
