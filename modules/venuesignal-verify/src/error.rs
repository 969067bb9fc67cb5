use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("date range starts after it ends ({start} > {end})")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("date range of {days} days exceeds the limit of {max}")]
    RangeTooLong { days: i64, max: i64 },
}
