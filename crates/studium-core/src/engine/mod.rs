//! The performance aggregation engine.
//!
//! Every function here is a pure computation over snapshots the caller hands
//! in. Nothing reads the clock, touches storage, or keeps state between
//! calls; the caller owns the data for the duration of a call.

pub mod average;
pub mod category;
pub mod dashboard;
pub mod grouping;
pub mod report;
pub mod temporal;

pub use average::{EMPTY_AVERAGE, SubjectAverage, subject_average, weighted_average};
pub use category::Category;
pub use dashboard::{DashboardSummary, ReminderTally};
pub use grouping::{GradesBySubject, SubjectGrades, group_by_subject};
pub use report::{PerformanceReport, SubjectStanding};
pub use temporal::ReminderStatus;
