//! Core trait definitions for the attendance portal.
//!
//! The portal client is implemented by the `attendwise-portal` crate; the
//! lecture-history source is implemented by [`crate::session::AttendanceSession`]
//! (cached) and can be stubbed directly in tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::model::{CourseAttendance, LectureRecord};

// ---------------------------------------------------------------------------
// Portal client trait
// ---------------------------------------------------------------------------

/// Read access to the student portal.
#[async_trait]
pub trait PortalClient: Send + Sync {
    /// Human-readable client name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch the course roster with cumulative counts.
    async fn fetch_roster(&self) -> Result<Vec<CourseAttendance>, UpstreamError>;

    /// Fetch timetable slots between two dates, inclusive.
    async fn fetch_weekly_schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawScheduleEntry>, UpstreamError>;

    /// Fetch every recorded lecture of one course component.
    async fn fetch_lecture_history(
        &self,
        student_id: &str,
        course_id: &str,
        comp_id: &str,
    ) -> Result<Vec<RawLectureRecord>, UpstreamError>;
}

/// Timetable slot as sent by the portal, dates still as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScheduleEntry {
    pub course_code: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    /// "class" or "holiday"; empty means class.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub faculty: String,
}

/// Lecture record as sent by the portal, date still as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLectureRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time_slot: String,
    /// "present", "absent", or empty when not yet marked.
    #[serde(default)]
    pub mark: String,
}

// ---------------------------------------------------------------------------
// Lecture history source
// ---------------------------------------------------------------------------

/// Per-component lecture history, as consumed by the today-status resolver.
#[async_trait]
pub trait LectureHistorySource: Send + Sync {
    async fn lecture_history(
        &self,
        course_id: &str,
        comp_id: &str,
    ) -> crate::error::Result<Arc<Vec<LectureRecord>>>;
}
