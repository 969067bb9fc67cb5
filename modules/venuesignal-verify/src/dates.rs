use chrono::{Datelike, Duration, NaiveDate};

use crate::error::VerifyError;

const MONTHS_IT: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// `"DD mese YYYY"`, e.g. `"05 ottobre 2025"`.
pub fn italian_label(date: NaiveDate) -> String {
    let month = MONTHS_IT[date.month0() as usize];
    format!("{:02} {} {}", date.day(), month, date.year())
}

/// Every day from `start` to `end` inclusive, at most `max_days` of them.
pub fn expand_range(
    start: NaiveDate,
    end: NaiveDate,
    max_days: i64,
) -> Result<Vec<NaiveDate>, VerifyError> {
    if start > end {
        return Err(VerifyError::InvertedRange { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > max_days {
        return Err(VerifyError::RangeTooLong {
            days,
            max: max_days,
        });
    }
    Ok((0..days).map(|i| start + Duration::days(i)).collect())
}
