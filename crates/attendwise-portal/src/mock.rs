//! Mock portal for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;

use attendwise_core::error::UpstreamError;
use attendwise_core::model::CourseAttendance;
use attendwise_core::traits::{PortalClient, RawLectureRecord, RawScheduleEntry};

/// An in-memory portal for exercising the engine without a network.
///
/// Responses are scripted up front; individual calls can be made to fail.
#[derive(Default)]
pub struct MockPortal {
    roster: Vec<CourseAttendance>,
    schedule: Vec<RawScheduleEntry>,
    /// `(course_id, comp_id)` → records.
    lectures: HashMap<(String, String), Vec<RawLectureRecord>>,
    roster_error: Option<UpstreamError>,
    schedule_error: Option<UpstreamError>,
    failing_components: HashMap<String, UpstreamError>,
    roster_calls: AtomicU32,
    schedule_calls: AtomicU32,
    history_calls: AtomicU32,
    /// Component ids in the order they were requested.
    requested: Mutex<Vec<String>>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(mut self, roster: Vec<CourseAttendance>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_schedule(mut self, schedule: Vec<RawScheduleEntry>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_lectures(
        mut self,
        course_id: &str,
        comp_id: &str,
        records: Vec<RawLectureRecord>,
    ) -> Self {
        self.lectures
            .insert((course_id.to_string(), comp_id.to_string()), records);
        self
    }

    pub fn failing_roster(mut self, error: UpstreamError) -> Self {
        self.roster_error = Some(error);
        self
    }

    pub fn failing_schedule(mut self, error: UpstreamError) -> Self {
        self.schedule_error = Some(error);
        self
    }

    /// Make every history fetch for `comp_id` fail with `error`.
    pub fn failing_component(mut self, comp_id: &str, error: UpstreamError) -> Self {
        self.failing_components.insert(comp_id.to_string(), error);
        self
    }

    pub fn roster_calls(&self) -> u32 {
        self.roster_calls.load(Ordering::Relaxed)
    }

    pub fn schedule_calls(&self) -> u32 {
        self.schedule_calls.load(Ordering::Relaxed)
    }

    pub fn history_calls(&self) -> u32 {
        self.history_calls.load(Ordering::Relaxed)
    }

    pub fn requested_components(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PortalClient for MockPortal {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_roster(&self) -> Result<Vec<CourseAttendance>, UpstreamError> {
        self.roster_calls.fetch_add(1, Ordering::Relaxed);
        match &self.roster_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.roster.clone()),
        }
    }

    async fn fetch_weekly_schedule(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<RawScheduleEntry>, UpstreamError> {
        self.schedule_calls.fetch_add(1, Ordering::Relaxed);
        match &self.schedule_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.schedule.clone()),
        }
    }

    async fn fetch_lecture_history(
        &self,
        _student_id: &str,
        course_id: &str,
        comp_id: &str,
    ) -> Result<Vec<RawLectureRecord>, UpstreamError> {
        self.history_calls.fetch_add(1, Ordering::Relaxed);
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(comp_id.to_string());

        if let Some(e) = self.failing_components.get(comp_id) {
            return Err(e.clone());
        }
        Ok(self
            .lectures
            .get(&(course_id.to_string(), comp_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mark: &str) -> RawLectureRecord {
        RawLectureRecord {
            date: "19/10/2026".into(),
            time_slot: "09:00".into(),
            mark: mark.into(),
        }
    }

    #[tokio::test]
    async fn scripted_history_and_counters() {
        let portal = MockPortal::new().with_lectures("c1", "c1-lec", vec![record("P")]);

        let records = portal
            .fetch_lecture_history("s-1", "c1", "c1-lec")
            .await
            .unwrap();
        assert_eq!(records, vec![record("P")]);

        let empty = portal
            .fetch_lecture_history("s-1", "c1", "c1-lab")
            .await
            .unwrap();
        assert!(empty.is_empty());

        assert_eq!(portal.history_calls(), 2);
        assert_eq!(portal.requested_components(), vec!["c1-lec", "c1-lab"]);
    }

    #[tokio::test]
    async fn injected_failures() {
        let portal = MockPortal::new()
            .failing_roster(UpstreamError::AuthorizationExpired("expired".into()))
            .failing_component("c1-lab", UpstreamError::Timeout(5));

        assert!(portal
            .fetch_roster()
            .await
            .unwrap_err()
            .is_authorization_expired());
        assert_eq!(
            portal
                .fetch_lecture_history("s-1", "c1", "c1-lab")
                .await
                .unwrap_err(),
            UpstreamError::Timeout(5)
        );
        assert_eq!(portal.roster_calls(), 1);
    }
}
