use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("day {0} is outside 1..=31")]
    Day(u32),

    #[error("month {0} is outside 1..=12")]
    Month(u32),

    #[error("cannot parse target {0:?}, expected DD/MM")]
    Format(String),
}
