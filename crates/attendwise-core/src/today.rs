//! Per-course attendance status for the current day.
//!
//! A course is `Scheduled` while one of today's class slots has not ended
//! yet. Otherwise its components' lecture histories are searched for a
//! record dated today; the first component, in roster order, with a
//! present/absent mark decides. A course with a class today but no mark yet
//! is `Pending`; a course with neither gets no entry.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::calendar::is_working_day;
use crate::error::{AttendanceError, Result};
use crate::model::{AttendanceMark, CourseAttendance, LectureRecord, ScheduleEntry};
use crate::traits::LectureHistorySource;

/// Today's standing for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodayStatus {
    /// A class slot today has not finished yet.
    Scheduled,
    Present,
    Absent,
    /// Class held today but not marked yet.
    Pending,
}

impl fmt::Display for TodayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodayStatus::Scheduled => write!(f, "scheduled"),
            TodayStatus::Present => write!(f, "present"),
            TodayStatus::Absent => write!(f, "absent"),
            TodayStatus::Pending => write!(f, "pending"),
        }
    }
}

impl TodayStatus {
    /// Status implied by a lecture mark; unmarked lectures decide nothing.
    pub fn from_mark(mark: AttendanceMark) -> Option<Self> {
        match mark {
            AttendanceMark::Present => Some(TodayStatus::Present),
            AttendanceMark::Absent => Some(TodayStatus::Absent),
            AttendanceMark::Unmarked => None,
        }
    }
}

/// Resolve today's status for every course on the roster.
///
/// `schedule` may contain slots from other days; only those falling on
/// `now`'s date are considered. Courses resolve concurrently and a failed
/// history fetch only means "no data" for that component. A history source
/// reporting [`AttendanceError::Superseded`] aborts the whole resolution.
pub async fn resolve_today(
    courses: &[CourseAttendance],
    schedule: &[ScheduleEntry],
    history: &dyn LectureHistorySource,
    now: NaiveDateTime,
) -> Result<HashMap<String, TodayStatus>> {
    let today = now.date();
    if !is_working_day(today) {
        tracing::debug!(%today, "weekend, nothing to resolve");
        return Ok(HashMap::new());
    }

    let todays_slots: Vec<&ScheduleEntry> = schedule
        .iter()
        .filter(|entry| entry.day() == Some(today))
        .collect();

    let resolutions = courses.iter().map(|course| {
        let slots = &todays_slots;
        async move {
            let status = resolve_course(course, slots, history, now).await?;
            Ok::<_, AttendanceError>(status.map(|s| (course.course_id.clone(), s)))
        }
    });

    join_all(resolutions)
        .await
        .into_iter()
        .filter_map(|resolved| resolved.transpose())
        .collect()
}

async fn resolve_course(
    course: &CourseAttendance,
    todays_slots: &[&ScheduleEntry],
    history: &dyn LectureHistorySource,
    now: NaiveDateTime,
) -> Result<Option<TodayStatus>> {
    let classes: Vec<&ScheduleEntry> = todays_slots
        .iter()
        .copied()
        .filter(|entry| entry.is_class_for(&course.course_code))
        .collect();

    if classes.iter().any(|entry| entry.end.is_some_and(|end| end > now)) {
        return Ok(Some(TodayStatus::Scheduled));
    }

    let today = now.date();
    let fetches = course.components.iter().map(|component| async move {
        match history
            .lecture_history(&course.course_id, &component.comp_id)
            .await
        {
            Ok(records) => Ok(mark_on(&records, today)),
            Err(e @ AttendanceError::Superseded { .. }) => Err(e),
            Err(e) => {
                tracing::debug!(
                    course = %course.course_id,
                    component = %component.comp_id,
                    "no lecture data: {e}"
                );
                Ok(None)
            }
        }
    });

    // All components are fetched together; the first definitive one in
    // roster order wins.
    let marks = join_all(fetches)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    let marked = marks
        .into_iter()
        .find_map(|mark| mark.and_then(TodayStatus::from_mark));

    Ok(marked.or_else(|| (!classes.is_empty()).then_some(TodayStatus::Pending)))
}

/// The first definitive mark recorded on `day`, else any mark on `day`.
fn mark_on(records: &[LectureRecord], day: NaiveDate) -> Option<AttendanceMark> {
    let mut todays = records.iter().filter(|r| r.is_on(day));
    let first = todays.next()?;
    if first.mark.is_definitive() {
        return Some(first.mark);
    }
    todays
        .find(|r| r.mark.is_definitive())
        .map(|r| r.mark)
        .or(Some(first.mark))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::error::UpstreamError;
    use crate::model::{CourseComponent, EntryKind};

    /// In-memory history keyed by component id.
    #[derive(Default)]
    struct StubHistory {
        records: HashMap<String, Vec<LectureRecord>>,
        failing: HashSet<String>,
        superseded: HashSet<String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl StubHistory {
        fn with(mut self, comp_id: &str, records: Vec<LectureRecord>) -> Self {
            self.records.insert(comp_id.into(), records);
            self
        }

        fn failing(mut self, comp_id: &str) -> Self {
            self.failing.insert(comp_id.into());
            self
        }

        fn superseded(mut self, comp_id: &str) -> Self {
            self.superseded.insert(comp_id.into());
            self
        }
    }

    #[async_trait]
    impl LectureHistorySource for StubHistory {
        async fn lecture_history(
            &self,
            _course_id: &str,
            comp_id: &str,
        ) -> Result<Arc<Vec<LectureRecord>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(comp_id.to_string());
            if self.failing.contains(comp_id) {
                return Err(UpstreamError::Network("connection reset".into()).into());
            }
            if self.superseded.contains(comp_id) {
                return Err(AttendanceError::Superseded {
                    started: 0,
                    current: 1,
                });
            }
            Ok(Arc::new(self.records.get(comp_id).cloned().unwrap_or_default()))
        }
    }

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn course(id: &str, code: &str, comps: &[&str]) -> CourseAttendance {
        CourseAttendance {
            course_id: id.into(),
            course_code: code.into(),
            course_name: id.into(),
            components: comps
                .iter()
                .map(|c| CourseComponent {
                    comp_id: (*c).into(),
                    kind: String::new(),
                    counts: None,
                })
                .collect(),
        }
    }

    fn slot(code: &str, start: NaiveDateTime, end: NaiveDateTime) -> ScheduleEntry {
        ScheduleEntry {
            course_code: code.into(),
            start: Some(start),
            end: Some(end),
            kind: EntryKind::Class,
            venue: "LT-1".into(),
            faculty: String::new(),
        }
    }

    fn record(when: NaiveDateTime, mark: AttendanceMark) -> LectureRecord {
        LectureRecord {
            date: Some(when),
            time_slot: "09:00-10:00".into(),
            mark,
        }
    }

    // 2026-10-19 is a Monday, 2026-10-24 a Saturday.

    #[tokio::test]
    async fn weekend_resolves_nothing() {
        let history = StubHistory::default();
        let courses = [course("c1", "CS101", &["c1-lec"])];
        let schedule = [slot("CS101", at(24, 9, 0), at(24, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(24, 8, 0))
            .await
            .unwrap();
        assert!(map.is_empty());
        assert_eq!(history.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upcoming_class_is_scheduled_without_lookups() {
        let history = StubHistory::default();
        let courses = [course("c1", "CS101", &["c1-lec", "c1-lab"])];
        let schedule = [slot(" CS101 ", at(19, 9, 0), at(19, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(19, 9, 30))
            .await
            .unwrap();
        assert_eq!(map.get("c1"), Some(&TodayStatus::Scheduled));
        assert_eq!(history.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn finished_class_uses_lecture_mark() {
        let history = StubHistory::default()
            .with("c1-lec", vec![record(at(19, 9, 0), AttendanceMark::Absent)]);
        let courses = [course("c1", "CS101", &["c1-lec"])];
        let schedule = [slot("CS101", at(19, 9, 0), at(19, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(19, 11, 0))
            .await
            .unwrap();
        assert_eq!(map.get("c1"), Some(&TodayStatus::Absent));
    }

    #[tokio::test]
    async fn first_definitive_component_wins() {
        let history = StubHistory::default()
            .with("c1-lec", vec![record(at(19, 9, 0), AttendanceMark::Unmarked)])
            .with("c1-tut", vec![record(at(19, 11, 0), AttendanceMark::Present)])
            .with("c1-lab", vec![record(at(19, 14, 0), AttendanceMark::Absent)]);
        let courses = [course("c1", "CS101", &["c1-lec", "c1-tut", "c1-lab"])];
        let schedule = [slot("CS101", at(19, 9, 0), at(19, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(19, 17, 0))
            .await
            .unwrap();
        assert_eq!(map.get("c1"), Some(&TodayStatus::Present));
    }

    #[tokio::test]
    async fn marks_from_other_days_are_ignored() {
        let history = StubHistory::default()
            .with("c1-lec", vec![record(at(16, 9, 0), AttendanceMark::Present)]);
        let courses = [course("c1", "CS101", &["c1-lec"])];
        let schedule = [slot("CS101", at(19, 9, 0), at(19, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(19, 12, 0))
            .await
            .unwrap();
        assert_eq!(map.get("c1"), Some(&TodayStatus::Pending));
    }

    #[tokio::test]
    async fn no_class_and_no_mark_means_no_entry() {
        let history = StubHistory::default();
        let courses = [course("c1", "CS101", &["c1-lec"])];
        let schedule = [slot("MA201", at(19, 9, 0), at(19, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(19, 12, 0))
            .await
            .unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn holiday_slots_are_not_classes() {
        let history = StubHistory::default();
        let courses = [course("c1", "CS101", &["c1-lec"])];
        let mut holiday = slot("CS101", at(19, 9, 0), at(19, 18, 0));
        holiday.kind = EntryKind::Holiday;
        let map = resolve_today(&courses, &[holiday], &history, at(19, 12, 0))
            .await
            .unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn failed_component_does_not_abort_siblings() {
        let history = StubHistory::default()
            .failing("c1-lec")
            .with("c1-lab", vec![record(at(19, 14, 0), AttendanceMark::Present)])
            .failing("c2-lec");
        let courses = [
            course("c1", "CS101", &["c1-lec", "c1-lab"]),
            course("c2", "MA201", &["c2-lec"]),
        ];
        let schedule = [
            slot("CS101", at(19, 9, 0), at(19, 10, 0)),
            slot("MA201", at(19, 10, 0), at(19, 11, 0)),
        ];
        let map = resolve_today(&courses, &schedule, &history, at(19, 16, 0))
            .await
            .unwrap();
        assert_eq!(map.get("c1"), Some(&TodayStatus::Present));
        assert_eq!(map.get("c2"), Some(&TodayStatus::Pending));
        assert_eq!(history.calls.load(Ordering::SeqCst), 3);
        let seen = history.seen.lock().unwrap();
        assert!(seen.contains(&"c2-lec".to_string()));
    }

    #[tokio::test]
    async fn superseded_history_aborts_resolution() {
        let history = StubHistory::default()
            .with("c1-lec", vec![record(at(19, 9, 0), AttendanceMark::Present)])
            .superseded("c2-lec");
        let courses = [
            course("c1", "CS101", &["c1-lec"]),
            course("c2", "MA201", &["c2-lec"]),
        ];
        let schedule = [
            slot("CS101", at(19, 9, 0), at(19, 10, 0)),
            slot("MA201", at(19, 10, 0), at(19, 11, 0)),
        ];
        let err = resolve_today(&courses, &schedule, &history, at(19, 16, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::Superseded {
                started: 0,
                current: 1
            }
        ));
    }

    #[tokio::test]
    async fn slots_from_other_days_are_ignored() {
        let history = StubHistory::default();
        let courses = [course("c1", "CS101", &["c1-lec"])];
        let schedule = [slot("CS101", at(20, 9, 0), at(20, 10, 0))];
        let map = resolve_today(&courses, &schedule, &history, at(19, 8, 0))
            .await
            .unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn status_display() {
        assert_eq!(TodayStatus::Pending.to_string(), "pending");
    }
}
