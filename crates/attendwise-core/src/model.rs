//! Core data model types for attendwise.
//!
//! Roster entries arrive with numeric counts and are used as-is; schedule
//! entries and lecture records arrive with free-form date text and are
//! normalised from their raw wire form (see [`crate::traits`]).

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::parse_instant;
use crate::error::{AttendanceError, Result};
use crate::traits::{RawLectureRecord, RawScheduleEntry};

/// Cumulative present/total counts reported by the portal.
///
/// `present <= total` is enforced on construction and deserialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCounts")]
pub struct AttendanceCounts {
    present: u32,
    total: u32,
}

#[derive(Deserialize)]
struct RawCounts {
    present: u32,
    total: u32,
}

impl TryFrom<RawCounts> for AttendanceCounts {
    type Error = AttendanceError;

    fn try_from(raw: RawCounts) -> Result<Self> {
        AttendanceCounts::new(raw.present, raw.total)
    }
}

impl AttendanceCounts {
    pub fn new(present: u32, total: u32) -> Result<Self> {
        if present > total {
            return Err(AttendanceError::validation(format!(
                "present count {present} exceeds total {total}"
            )));
        }
        Ok(Self { present, total })
    }

    pub fn present(&self) -> u32 {
        self.present
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

/// A gradable sub-unit of a course (lecture, tutorial, lab).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseComponent {
    /// Portal identifier used to fetch this component's lecture history.
    pub comp_id: String,
    /// Free-form kind label, e.g. "Lecture" or "Practical".
    #[serde(default)]
    pub kind: String,
    /// Cumulative counts, when the portal reports attendance for this unit.
    #[serde(default)]
    pub counts: Option<AttendanceCounts>,
}

/// One course on the student's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAttendance {
    pub course_id: String,
    /// Code used by the timetable, e.g. "CS101".
    pub course_code: String,
    pub course_name: String,
    /// Components in source order.
    #[serde(default)]
    pub components: Vec<CourseComponent>,
}

impl CourseAttendance {
    /// The first component carrying cumulative counts.
    pub fn attendance_component(&self) -> Option<&CourseComponent> {
        self.components.iter().find(|c| c.counts.is_some())
    }

    /// Cumulative counts of the attendance component, if any.
    pub fn counts(&self) -> Option<AttendanceCounts> {
        self.attendance_component().and_then(|c| c.counts)
    }
}

/// Attendance mark on a single lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceMark {
    Present,
    Absent,
    Unmarked,
}

impl AttendanceMark {
    /// Present or absent, as opposed to not yet recorded.
    pub fn is_definitive(self) -> bool {
        !matches!(self, AttendanceMark::Unmarked)
    }
}

impl fmt::Display for AttendanceMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceMark::Present => write!(f, "present"),
            AttendanceMark::Absent => write!(f, "absent"),
            AttendanceMark::Unmarked => write!(f, "unmarked"),
        }
    }
}

impl FromStr for AttendanceMark {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "p" => Ok(AttendanceMark::Present),
            "absent" | "a" => Ok(AttendanceMark::Absent),
            "" | "unmarked" | "-" | "na" | "n/a" => Ok(AttendanceMark::Unmarked),
            other => Err(format!("unknown attendance mark: {other}")),
        }
    }
}

/// A single held lecture and its mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureRecord {
    /// `None` when the portal's date text could not be parsed.
    pub date: Option<NaiveDateTime>,
    pub time_slot: String,
    pub mark: AttendanceMark,
}

impl LectureRecord {
    /// Whether this lecture was held on `day`.
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date.is_some_and(|d| d.date() == day)
    }
}

impl From<RawLectureRecord> for LectureRecord {
    fn from(raw: RawLectureRecord) -> Self {
        let mark = raw.mark.parse().unwrap_or_else(|e: String| {
            tracing::debug!("{e}, treating as unmarked");
            AttendanceMark::Unmarked
        });
        Self {
            date: parse_instant(&raw.date),
            time_slot: raw.time_slot,
            mark,
        }
    }
}

/// Kind of timetable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Class,
    Holiday,
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "class" | "lecture" | "lab" | "tutorial" => Ok(EntryKind::Class),
            "holiday" => Ok(EntryKind::Holiday),
            other => Err(format!("unknown schedule entry kind: {other}")),
        }
    }
}

/// One slot of the weekly timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub course_code: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub kind: EntryKind,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub faculty: String,
}

impl ScheduleEntry {
    /// Calendar day of the slot, taken from its start and falling back to its end.
    pub fn day(&self) -> Option<NaiveDate> {
        self.start.or(self.end).map(|instant| instant.date())
    }

    /// Whether this is a class slot for `course_code` (compared trimmed).
    pub fn is_class_for(&self, course_code: &str) -> bool {
        self.kind == EntryKind::Class && self.course_code.trim() == course_code.trim()
    }
}

impl From<RawScheduleEntry> for ScheduleEntry {
    fn from(raw: RawScheduleEntry) -> Self {
        let kind = raw.kind.parse().unwrap_or_else(|e: String| {
            tracing::debug!("{e}, treating as class");
            EntryKind::Class
        });
        Self {
            course_code: raw.course_code.trim().to_string(),
            start: parse_instant(&raw.start),
            end: parse_instant(&raw.end),
            kind,
            venue: raw.venue,
            faculty: raw.faculty,
        }
    }
}
