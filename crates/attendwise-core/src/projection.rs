//! Forward projection of attendance to a future date.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{count_working_days, iter_working_days};
use crate::error::{AttendanceError, Result};
use crate::ledger::ExclusionLedger;
use crate::model::CourseAttendance;
use crate::ratio::{compute_ratio, Ratio, RiskStatus};

/// How future lectures are assumed to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// No further lectures: projected counts equal current counts.
    #[default]
    None,
    /// One lecture per course on every working day up to the target.
    Uniform,
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionMode::None => write!(f, "none"),
            ProjectionMode::Uniform => write!(f, "uniform"),
        }
    }
}

impl FromStr for ProjectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "baseline" => Ok(ProjectionMode::None),
            "uniform" | "daily" => Ok(ProjectionMode::Uniform),
            other => Err(format!("unknown projection mode: {other}")),
        }
    }
}

/// Projected standing of one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub course_id: String,
    pub course_name: String,
    pub current: Ratio,
    pub projected: Ratio,
    pub projected_present: u32,
    pub projected_total: u32,
    /// `projected.percentage - current.percentage`.
    pub delta: f64,
}

impl ProjectionResult {
    pub fn current_percentage(&self) -> f64 {
        self.current.percentage
    }

    pub fn projected_percentage(&self) -> f64 {
        self.projected.percentage
    }

    pub fn projected_status(&self) -> RiskStatus {
        self.projected.status
    }
}

/// Outcome of one projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub target_date: NaiveDate,
    pub mode: ProjectionMode,
    /// Working days strictly after today up to the target, inclusive.
    pub working_days: u32,
    /// One entry per course with recognised counts, in roster order.
    pub results: Vec<ProjectionResult>,
}

impl Projection {
    /// Courses not projected to be safe, in roster order.
    pub fn at_risk(&self) -> Vec<&ProjectionResult> {
        self.results
            .iter()
            .filter(|r| !r.projected.status.is_safe())
            .collect()
    }
}

/// Project every course's attendance forward to `target_date`.
///
/// Under [`ProjectionMode::Uniform`] each working day adds one lecture per
/// course; the student is assumed present unless the ledger excludes that
/// day for the course, in which case the lecture still counts toward the
/// total.
pub fn project(
    courses: &[CourseAttendance],
    target_date: NaiveDate,
    mode: ProjectionMode,
    ledger: &ExclusionLedger,
    today: NaiveDate,
) -> Result<Projection> {
    if target_date <= today {
        return Err(AttendanceError::validation(format!(
            "target date {target_date} must be after {today}"
        )));
    }

    let working_days = count_working_days(today, target_date);

    let results = courses
        .iter()
        .filter_map(|course| {
            let Some(counts) = course.counts() else {
                tracing::debug!(course = %course.course_id, "no attendance component, skipping");
                return None;
            };

            let (mut present, mut total) = (counts.present(), counts.total());
            if mode == ProjectionMode::Uniform {
                for day in iter_working_days(today, target_date) {
                    total = total.saturating_add(1);
                    if !ledger.is_excluded(day, &course.course_id) {
                        present = present.saturating_add(1);
                    }
                }
            }

            let current = compute_ratio(counts.present(), counts.total());
            let projected = compute_ratio(present, total);
            Some(ProjectionResult {
                course_id: course.course_id.clone(),
                course_name: course.course_name.clone(),
                current,
                projected,
                projected_present: present,
                projected_total: total,
                delta: projected.percentage - current.percentage,
            })
        })
        .collect();

    Ok(Projection {
        target_date,
        mode,
        working_days,
        results,
    })
}
