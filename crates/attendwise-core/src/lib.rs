//! attendwise-core — Attendance statistics and projection engine.
//!
//! This crate defines the data model, the portal trait, and the pure
//! attendance arithmetic (ratios, working days, exclusions, projections)
//! that the rest of attendwise builds on.

pub mod calendar;
pub mod clock;
pub mod dates;
pub mod error;
pub mod ledger;
pub mod model;
pub mod projection;
pub mod ratio;
pub mod session;
pub mod today;
pub mod traits;

pub use error::{AttendanceError, Result, UpstreamError};
pub use ledger::{ExclusionEntry, ExclusionLedger};
pub use model::{AttendanceCounts, AttendanceMark, CourseAttendance, LectureRecord, ScheduleEntry};
pub use projection::{project, Projection, ProjectionMode, ProjectionResult};
pub use ratio::{compute_ratio, Ratio, RiskStatus};
pub use session::AttendanceSession;
pub use today::{resolve_today, TodayStatus};
