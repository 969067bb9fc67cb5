use chrono::NaiveDate;
use venuesignal_common::{BasePriority, EventLog, EventRecord, PriorityTable, ScoreMode};
use venuesignal_recurrence::{
    score_recurrence, summarize, yearly_distribution, DayOfYear, RecurrenceFilter,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event(venue: &str, locality: &str, y: i32, m: u32, d: u32) -> EventRecord {
    EventRecord {
        venue: venue.to_string(),
        locality: locality.to_string(),
        district: Some("RM01".to_string()),
        genre: Some("Bar".to_string()),
        municipality: Some("Roma".to_string()),
        address: Some("Via Roma 1".to_string()),
        starts_at: date(y, m, d).and_hms_opt(22, 0, 0).unwrap(),
        year: y,
    }
}

fn priority(venue: &str, locality: &str, score: Option<f64>) -> BasePriority {
    BasePriority {
        venue: venue.to_string(),
        locality: locality.to_string(),
        score,
    }
}

fn halloween() -> DayOfYear {
    DayOfYear::new(31, 10).unwrap()
}

#[test]
fn three_of_four_eligible_years() {
    let log = EventLog::new(
        [2022, 2023, 2024, 2025],
        vec![
            event("Bar Centrale", "Roma", 2022, 10, 31),
            event("Bar Centrale", "Roma", 2023, 10, 31),
            event("Bar Centrale", "Roma", 2024, 10, 31),
        ],
    );
    let table = PriorityTable::from_rows(vec![priority("Bar Centrale", "Roma", Some(0.8))]);

    // 2025-11-02: the target already passed this year, so 2025 is eligible.
    let results = score_recurrence(
        &log,
        &table,
        halloween(),
        &RecurrenceFilter::default(),
        ScoreMode::Combined,
        date(2025, 11, 2),
    );

    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.eligible_years, 4);
    assert_eq!(r.matching_years, vec![2022, 2023, 2024]);
    assert_eq!(r.recurrence, 0.75);
    assert!((r.final_score - 0.6).abs() < 1e-12);
    assert_eq!(r.total_events, 3);
    assert_eq!(r.genre.as_deref(), Some("Bar"));
    assert_eq!(r.events.len(), 3);
}

#[test]
fn current_year_is_not_eligible_before_the_target() {
    let log = EventLog::new(
        [2022, 2023, 2024, 2025],
        vec![
            event("Bar Centrale", "Roma", 2022, 10, 31),
            event("Bar Centrale", "Roma", 2023, 10, 31),
            event("Bar Centrale", "Roma", 2024, 10, 31),
            // Scheduled but not yet happened.
            event("Bar Centrale", "Roma", 2025, 10, 31),
        ],
    );
    let table = PriorityTable::from_rows(vec![priority("Bar Centrale", "Roma", Some(1.0))]);

    let results = score_recurrence(
        &log,
        &table,
        halloween(),
        &RecurrenceFilter::default(),
        ScoreMode::Combined,
        date(2025, 10, 19),
    );
    assert_eq!(results[0].eligible_years, 3);
    assert_eq!(results[0].recurrence, 1.0);
    assert_eq!(results[0].total_events, 3);
}

#[test]
fn ranking_is_descending_and_recurrence_only_ignores_base() {
    let log = EventLog::new(
        [2023, 2024],
        vec![
            event("A", "Roma", 2023, 10, 31),
            event("A", "Roma", 2024, 10, 31),
            event("B", "Roma", 2024, 10, 31),
            event("C", "Roma", 2024, 10, 31),
        ],
    );
    let table = PriorityTable::from_rows(vec![
        priority("A", "Roma", Some(0.2)),
        priority("B", "Roma", Some(0.9)),
        priority("C", "Roma", None),
    ]);
    let today = date(2025, 1, 10);

    let combined = score_recurrence(
        &log,
        &table,
        halloween(),
        &RecurrenceFilter::default(),
        ScoreMode::Combined,
        today,
    );
    // C has no base score and is left out.
    let names: Vec<&str> = combined.iter().map(|r| r.venue.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);

    let recurrence_only = score_recurrence(
        &log,
        &table,
        halloween(),
        &RecurrenceFilter::default(),
        ScoreMode::RecurrenceOnly,
        today,
    );
    let names: Vec<&str> = recurrence_only.iter().map(|r| r.venue.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(recurrence_only[0].final_score, 1.0);
}

#[test]
fn impossible_target_yields_no_matches_without_error() {
    let log = EventLog::new([2024], vec![event("A", "Roma", 2024, 2, 28)]);
    let table = PriorityTable::from_rows(vec![priority("A", "Roma", Some(1.0))]);
    let target = DayOfYear::new(30, 2).unwrap();

    let results = score_recurrence(
        &log,
        &table,
        target,
        &RecurrenceFilter::default(),
        ScoreMode::Combined,
        date(2025, 3, 1),
    );
    assert!(results.is_empty());
}

#[test]
fn venues_join_on_name_and_locality_and_filters_apply() {
    let mut disco = event("A", "Milano", 2024, 10, 31);
    disco.genre = Some("Discoteca".to_string());
    let log = EventLog::new(
        [2024],
        vec![event("A", "Roma", 2024, 10, 31), disco],
    );
    let table = PriorityTable::from_rows(vec![
        priority("A", "Roma", Some(0.5)),
        priority("A", "Milano", Some(0.7)),
    ]);
    let today = date(2025, 1, 1);

    let all = score_recurrence(
        &log,
        &table,
        halloween(),
        &RecurrenceFilter::default(),
        ScoreMode::Combined,
        today,
    );
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].locality, "Milano");

    let bars = RecurrenceFilter {
        genres: vec!["Bar".to_string()],
        ..Default::default()
    };
    let only_bars = score_recurrence(&log, &table, halloween(), &bars, ScoreMode::Combined, today);
    assert_eq!(only_bars.len(), 1);
    assert_eq!(only_bars[0].locality, "Roma");

    let milano = RecurrenceFilter {
        localities: vec!["Milano".to_string()],
        ..Default::default()
    };
    let in_milano = score_recurrence(&log, &table, halloween(), &milano, ScoreMode::Combined, today);
    assert_eq!(in_milano.len(), 1);
    assert_eq!(in_milano[0].base_priority, 0.7);
}

#[test]
fn summary_counts_full_recurrence() {
    let log = EventLog::new(
        [2023, 2024],
        vec![
            event("A", "Roma", 2023, 10, 31),
            event("A", "Roma", 2024, 10, 31),
            event("A", "Roma", 2024, 10, 31),
            event("B", "Roma", 2024, 10, 31),
        ],
    );
    let table = PriorityTable::from_rows(vec![
        priority("A", "Roma", Some(1.0)),
        priority("B", "Roma", Some(1.0)),
    ]);
    let results = score_recurrence(
        &log,
        &table,
        halloween(),
        &RecurrenceFilter::default(),
        ScoreMode::Combined,
        date(2025, 1, 1),
    );
    let summary = summarize(&results);
    assert_eq!(summary.venue_count, 2);
    assert_eq!(summary.full_recurrence, 1);
    assert_eq!(summary.total_events, 4);
    assert!((summary.mean_final_score - 0.75).abs() < 1e-12);

    let empty = summarize(&[]);
    assert_eq!(empty.venue_count, 0);
    assert_eq!(empty.mean_final_score, 0.0);
}

#[test]
fn yearly_distribution_counts_past_days_of_known_venues() {
    let log = EventLog::new(
        [2025],
        vec![
            event("A", "Roma", 2025, 3, 1),
            event("A", "Roma", 2025, 3, 1),
            event("B", "Roma", 2025, 1, 15),
            event("Unknown", "Roma", 2025, 1, 15),
            event("A", "Roma", 2025, 12, 24),
        ],
    );
    let table = PriorityTable::from_rows(vec![
        priority("A", "Roma", Some(1.0)),
        priority("B", "Roma", None),
    ]);

    let dist = yearly_distribution(
        &log,
        &table,
        2025,
        &RecurrenceFilter::default(),
        date(2025, 10, 19),
    );
    assert_eq!(dist.total, 3);
    assert_eq!(dist.days.len(), 2);
    assert_eq!(dist.days[0].label(), "15/01");
    let busiest = dist.busiest.unwrap();
    assert_eq!((busiest.month, busiest.day, busiest.count), (3, 1, 2));

    let none = yearly_distribution(&log, &table, 2019, &RecurrenceFilter::default(), date(2025, 10, 19));
    assert_eq!(none.total, 0);
    assert!(none.busiest.is_none());
}

#[test]
fn yearly_distribution_joins_on_venue_and_locality() {
    let log = EventLog::new(
        [2025],
        vec![
            event("Bar Centrale", "Roma", 2025, 5, 1),
            event("Bar Centrale", "Milano", 2025, 5, 1),
            event("Bar Centrale", "Milano", 2025, 6, 2),
        ],
    );
    let table = PriorityTable::from_rows(vec![priority("Bar Centrale", "Roma", Some(0.5))]);

    let dist = yearly_distribution(
        &log,
        &table,
        2025,
        &RecurrenceFilter::default(),
        date(2025, 10, 19),
    );
    assert_eq!(dist.total, 1);
    assert_eq!(dist.days.len(), 1);
    assert_eq!(dist.days[0].label(), "01/05");
}
