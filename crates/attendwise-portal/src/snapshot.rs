//! Offline portal backed by a JSON snapshot file.
//!
//! A snapshot holds everything the engine would otherwise fetch: the roster
//! with counts, timetable slots and per-component lecture history.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use attendwise_core::dates::parse_date;
use attendwise_core::error::UpstreamError;
use attendwise_core::model::CourseAttendance;
use attendwise_core::traits::{PortalClient, RawLectureRecord, RawScheduleEntry};

/// Lecture history of one course component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentLectures {
    pub course_id: String,
    pub comp_id: String,
    #[serde(default)]
    pub records: Vec<RawLectureRecord>,
}

/// On-disk snapshot of a student's portal data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalSnapshot {
    pub student_id: String,
    #[serde(default)]
    pub roster: Vec<CourseAttendance>,
    #[serde(default)]
    pub schedule: Vec<RawScheduleEntry>,
    #[serde(default)]
    pub lectures: Vec<ComponentLectures>,
}

/// Serves portal requests from a [`PortalSnapshot`].
pub struct SnapshotPortal {
    snapshot: PortalSnapshot,
}

impl SnapshotPortal {
    /// Read and decode a snapshot file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
        let snapshot: PortalSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse snapshot: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            courses = snapshot.roster.len(),
            slots = snapshot.schedule.len(),
            "snapshot loaded"
        );
        Ok(Self { snapshot })
    }

    pub fn student_id(&self) -> &str {
        &self.snapshot.student_id
    }
}

#[async_trait]
impl PortalClient for SnapshotPortal {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn fetch_roster(&self) -> Result<Vec<CourseAttendance>, UpstreamError> {
        Ok(self.snapshot.roster.clone())
    }

    async fn fetch_weekly_schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawScheduleEntry>, UpstreamError> {
        // Slots with unreadable start text are kept; the resolver skips them.
        Ok(self
            .snapshot
            .schedule
            .iter()
            .filter(|slot| parse_date(&slot.start).is_none_or(|day| day >= start && day <= end))
            .cloned()
            .collect())
    }

    async fn fetch_lecture_history(
        &self,
        student_id: &str,
        course_id: &str,
        comp_id: &str,
    ) -> Result<Vec<RawLectureRecord>, UpstreamError> {
        if student_id != self.snapshot.student_id {
            return Err(UpstreamError::AuthorizationExpired(format!(
                "snapshot belongs to student {}",
                self.snapshot.student_id
            )));
        }
        self.snapshot
            .lectures
            .iter()
            .find(|l| l.course_id == course_id && l.comp_id == comp_id)
            .map(|l| l.records.clone())
            .ok_or_else(|| UpstreamError::Status {
                status: 404,
                message: format!("no lectures for {course_id}/{comp_id}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "student_id": "s-1",
        "roster": [
            {
                "course_id": "c1",
                "course_code": "CS101",
                "course_name": "Programming",
                "components": [
                    {"comp_id": "c1-lec", "kind": "Lecture", "counts": {"present": 27, "total": 30}}
                ]
            }
        ],
        "schedule": [
            {"course_code": "CS101", "start": "19/10/2026 09:00", "end": "19/10/2026 10:00"},
            {"course_code": "CS101", "start": "27/10/2026 09:00", "end": "27/10/2026 10:00"}
        ],
        "lectures": [
            {
                "course_id": "c1",
                "comp_id": "c1-lec",
                "records": [{"date": "19/10/2026", "time_slot": "09:00", "mark": "P"}]
            }
        ]
    }"#;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn load() -> SnapshotPortal {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();
        SnapshotPortal::load(file.path()).await.unwrap()
    }

    #[tokio::test]
    async fn loads_roster_from_file() {
        let portal = load().await;
        assert_eq!(portal.student_id(), "s-1");
        let roster = portal.fetch_roster().await.unwrap();
        assert_eq!(roster[0].counts().unwrap().total(), 30);
    }

    #[tokio::test]
    async fn schedule_is_limited_to_requested_week() {
        let portal = load().await;
        let slots = portal
            .fetch_weekly_schedule(d(2026, 10, 19), d(2026, 10, 25))
            .await
            .unwrap();
        assert_eq!(slots.len(), 1);
        assert!(slots[0].start.starts_with("19/10/2026"));
    }

    #[tokio::test]
    async fn missing_component_is_not_found() {
        let portal = load().await;
        let records = portal
            .fetch_lecture_history("s-1", "c1", "c1-lec")
            .await
            .unwrap();
        assert_eq!(records[0].mark, "P");

        let err = portal
            .fetch_lecture_history("s-1", "c1", "c1-lab")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn other_student_is_rejected() {
        let portal = load().await;
        let err = portal
            .fetch_lecture_history("s-2", "c1", "c1-lec")
            .await
            .unwrap_err();
        assert!(err.is_authorization_expired());
    }

    #[tokio::test]
    async fn invalid_counts_fail_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"student_id": "s-1", "roster": [{"course_id": "c1", "course_code": "X",
                "course_name": "X", "components": [{"comp_id": "a", "counts": {"present": 5, "total": 4}}]}]}"#,
        )
        .unwrap();
        let err = SnapshotPortal::load(file.path()).await.err().unwrap();
        assert!(err.to_string().contains("failed to parse snapshot"));
    }
}
