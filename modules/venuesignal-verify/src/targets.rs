use chrono::NaiveDate;
use venuesignal_common::Venue;

use crate::dates::italian_label;
use crate::key::VerificationRequest;

/// The `n` venues with the highest base priority. Unscored venues never make
/// the cut; ties keep input order.
pub fn top_venues(venues: &[Venue], n: usize) -> Vec<&Venue> {
    let mut scored: Vec<(&Venue, f64)> = venues
        .iter()
        .filter_map(|v| v.base_priority.filter(|s| s.is_finite()).map(|s| (v, s)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(n).map(|(v, _)| v).collect()
}

/// One request per (venue, date), dates outermost.
pub fn requests_for(venues: &[&Venue], dates: &[NaiveDate]) -> Vec<VerificationRequest> {
    dates
        .iter()
        .flat_map(|d| {
            let label = italian_label(*d);
            venues
                .iter()
                .map(move |v| VerificationRequest::new(&v.name, &v.locality, label.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use venuesignal_common::GeoPoint;

    fn venue(name: &str, score: Option<f64>) -> Venue {
        Venue {
            name: name.to_string(),
            locality: "Roma".to_string(),
            district: None,
            municipality: None,
            address: None,
            genre: None,
            location: GeoPoint::new(41.9, 12.49),
            base_priority: score,
            hex_cell: None,
            events_total: None,
            monthly_events: Vec::new(),
        }
    }

    #[test]
    fn top_venues_by_base_priority() {
        let venues = vec![
            venue("low", Some(0.1)),
            venue("none", None),
            venue("high", Some(0.9)),
            venue("mid", Some(0.5)),
        ];
        let names: Vec<&str> = top_venues(&venues, 2).iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid"]);
        assert_eq!(top_venues(&venues, 10).len(), 3);
    }

    #[test]
    fn one_request_per_venue_and_date() {
        let venues = vec![venue("A", Some(1.0)), venue("B", Some(0.5))];
        let top = top_venues(&venues, 2);
        let dates = [
            NaiveDate::from_ymd_opt(2025, 10, 5).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 6).unwrap(),
        ];
        let requests = requests_for(&top, &dates);
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0], VerificationRequest::new("A", "Roma", "05 ottobre 2025"));
        assert_eq!(requests[3], VerificationRequest::new("B", "Roma", "06 ottobre 2025"));
    }
}
