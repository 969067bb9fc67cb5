//! Day-of-year recurrence ranking over multi-year event logs.

pub mod distribution;
pub mod error;
pub mod filter;
pub mod score;
pub mod summary;
pub mod target;

pub use distribution::{yearly_distribution, DayCount, YearDistribution};
pub use error::TargetError;
pub use filter::RecurrenceFilter;
pub use score::{score_recurrence, EventDetail, RecurrenceResult};
pub use summary::{summarize, RecurrenceSummary};
pub use target::{eligible_years, DayOfYear};
