//! Session context owning every piece of cached portal state.
//!
//! The roster, the lecture-history cache, the exclusion ledger and the last
//! projection live here instead of in globals. [`AttendanceSession::refresh`]
//! bumps a generation counter; a fetch that was launched under an older
//! generation is dropped when it completes instead of overwriting newer
//! data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::calendar::{is_working_day, week_end, week_start};
use crate::clock::{Clock, SystemClock};
use crate::error::{AttendanceError, Result};
use crate::ledger::{ExclusionEntry, ExclusionLedger};
use crate::model::{CourseAttendance, LectureRecord, ScheduleEntry};
use crate::projection::{project, Projection, ProjectionMode};
use crate::today::{resolve_today, TodayStatus};
use crate::traits::{LectureHistorySource, PortalClient};

type HistoryKey = (String, String);

#[derive(Default)]
struct SessionState {
    generation: u64,
    roster: Option<Arc<Vec<CourseAttendance>>>,
    history: HashMap<HistoryKey, Arc<Vec<LectureRecord>>>,
    ledger: ExclusionLedger,
    last_projection: Option<Arc<Projection>>,
}

impl SessionState {
    fn check_generation(&self, started: u64) -> Result<()> {
        if self.generation != started {
            tracing::warn!(
                started,
                current = self.generation,
                "discarding result fetched before refresh"
            );
            return Err(AttendanceError::Superseded {
                started,
                current: self.generation,
            });
        }
        Ok(())
    }
}

/// One student's view of the portal for the lifetime of the process.
pub struct AttendanceSession {
    portal: Arc<dyn PortalClient>,
    clock: Arc<dyn Clock>,
    student_id: String,
    state: Mutex<SessionState>,
}

impl AttendanceSession {
    pub fn new(portal: Arc<dyn PortalClient>, student_id: impl Into<String>) -> Self {
        Self {
            portal,
            clock: Arc::new(SystemClock),
            student_id: student_id.into(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Replace the clock used for "now" and "today".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Current session generation; bumped on every invalidation.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    // The lock is never held across an await, so a poisoned guard still
    // holds consistent data.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached roster, fetched on first use.
    pub async fn roster(&self) -> Result<Arc<Vec<CourseAttendance>>> {
        let started = {
            let state = self.state();
            if let Some(roster) = &state.roster {
                return Ok(Arc::clone(roster));
            }
            state.generation
        };
        self.fetch_roster(started).await
    }

    async fn fetch_roster(&self, started: u64) -> Result<Arc<Vec<CourseAttendance>>> {
        let roster = Arc::new(self.portal.fetch_roster().await?);
        tracing::info!(
            courses = roster.len(),
            portal = self.portal.name(),
            "roster fetched"
        );

        let mut state = self.state();
        state.check_generation(started)?;
        state.roster = Some(Arc::clone(&roster));
        Ok(roster)
    }

    /// Drop the roster, lecture-history cache and last projection.
    ///
    /// The exclusion ledger is kept. Fetches still in flight will have their
    /// results discarded.
    pub fn invalidate(&self) -> u64 {
        let mut state = self.state();
        state.generation += 1;
        state.roster = None;
        state.history.clear();
        state.last_projection = None;
        tracing::info!(generation = state.generation, "session invalidated");
        state.generation
    }

    /// Invalidate everything and fetch a fresh roster.
    pub async fn refresh(&self) -> Result<Arc<Vec<CourseAttendance>>> {
        let started = self.invalidate();
        self.fetch_roster(started).await
    }

    /// Attendance status of every course for today.
    ///
    /// Fails with [`AttendanceError::Superseded`] if the session was
    /// invalidated while the statuses were being resolved.
    pub async fn today_status(&self) -> Result<HashMap<String, TodayStatus>> {
        let started = self.generation();
        let now = self.clock.now();
        let today = now.date();
        let roster = self.roster().await?;
        if !is_working_day(today) {
            self.state().check_generation(started)?;
            return Ok(HashMap::new());
        }

        let schedule: Vec<ScheduleEntry> = self
            .portal
            .fetch_weekly_schedule(week_start(today), week_end(today))
            .await?
            .into_iter()
            .map(ScheduleEntry::from)
            .collect();
        tracing::debug!(slots = schedule.len(), "weekly schedule fetched");

        let statuses = resolve_today(&roster, &schedule, self, now).await?;
        self.state().check_generation(started)?;
        Ok(statuses)
    }

    /// Project the cached roster to `target_date` using the session ledger.
    pub async fn project(
        &self,
        target_date: NaiveDate,
        mode: ProjectionMode,
    ) -> Result<Arc<Projection>> {
        let started = self.generation();
        let roster = self.roster().await?;

        let mut state = self.state();
        state.check_generation(started)?;
        let projection = Arc::new(project(
            &roster,
            target_date,
            mode,
            &state.ledger,
            self.clock.today(),
        )?);
        state.last_projection = Some(Arc::clone(&projection));
        Ok(projection)
    }

    pub fn last_projection(&self) -> Option<Arc<Projection>> {
        self.state().last_projection.clone()
    }

    /// Add a planned absence; `course_id = None` covers every course.
    pub fn add_exclusion(&self, date: &str, course_id: Option<&str>) -> Result<ExclusionEntry> {
        let today = self.clock.today();
        self.state().ledger.add(date, course_id, today).cloned()
    }

    pub fn remove_exclusion(&self, index: usize) -> Result<ExclusionEntry> {
        self.state().ledger.remove(index)
    }

    /// Snapshot of the ledger in insertion order.
    pub fn exclusions(&self) -> Vec<ExclusionEntry> {
        self.state().ledger.list().to_vec()
    }
}

#[async_trait]
impl LectureHistorySource for AttendanceSession {
    async fn lecture_history(
        &self,
        course_id: &str,
        comp_id: &str,
    ) -> Result<Arc<Vec<LectureRecord>>> {
        let key = (course_id.to_string(), comp_id.to_string());
        let started = {
            let state = self.state();
            if let Some(records) = state.history.get(&key) {
                tracing::debug!(course_id, comp_id, "lecture history cache hit");
                return Ok(Arc::clone(records));
            }
            state.generation
        };

        let records: Vec<LectureRecord> = self
            .portal
            .fetch_lecture_history(&self.student_id, course_id, comp_id)
            .await?
            .into_iter()
            .map(LectureRecord::from)
            .collect();

        let mut state = self.state();
        state.check_generation(started)?;
        Ok(Arc::clone(
            state.history.entry(key).or_insert_with(|| Arc::new(records)),
        ))
    }
}
