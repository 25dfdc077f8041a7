//! Planned future absences used by the projection engine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date;
use crate::error::{AttendanceError, Result};

/// Label given to exclusions that cover every course.
pub const ALL_COURSES_LABEL: &str = "All courses";

/// One planned absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    pub date: NaiveDate,
    /// `None` means every course on that day.
    pub course_id: Option<String>,
    pub label: String,
}

impl ExclusionEntry {
    pub fn is_full_day(&self) -> bool {
        self.course_id.is_none()
    }
}

/// Insertion-ordered set of exclusions, unique per `(date, course_id)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionLedger {
    entries: Vec<ExclusionEntry>,
}

impl ExclusionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exclusion from user-entered date text.
    pub fn add(
        &mut self,
        date: &str,
        course_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<&ExclusionEntry> {
        if date.trim().is_empty() {
            return Err(AttendanceError::validation("exclusion date is required"));
        }
        let parsed = parse_date(date).ok_or_else(|| {
            AttendanceError::validation(format!("unrecognised exclusion date: {}", date.trim()))
        })?;
        self.add_date(parsed, course_id, today)
    }

    /// Add an exclusion for an already-parsed date.
    ///
    /// The date must be strictly after `today`, and an identical
    /// `(date, course_id)` pair must not already exist.
    pub fn add_date(
        &mut self,
        date: NaiveDate,
        course_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<&ExclusionEntry> {
        if date <= today {
            return Err(AttendanceError::validation(format!(
                "exclusion date {date} must be after {today}"
            )));
        }

        let course_id = course_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        if self
            .entries
            .iter()
            .any(|e| e.date == date && e.course_id == course_id)
        {
            let scope = course_id.as_deref().unwrap_or(ALL_COURSES_LABEL);
            return Err(AttendanceError::validation(format!(
                "{date} is already excluded for {scope}"
            )));
        }

        let label = course_id
            .clone()
            .unwrap_or_else(|| ALL_COURSES_LABEL.to_string());
        tracing::debug!(%date, scope = %label, "exclusion added");
        self.entries.push(ExclusionEntry {
            date,
            course_id,
            label,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove the entry at `index` in insertion order.
    pub fn remove(&mut self, index: usize) -> Result<ExclusionEntry> {
        if index >= self.entries.len() {
            return Err(AttendanceError::NotFound {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[ExclusionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries that are no longer strictly in the future.
    pub fn retain_future(&mut self, today: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.date > today);
        before - self.entries.len()
    }

    /// Dates excluded for every course.
    pub fn full_day_dates(&self) -> BTreeSet<NaiveDate> {
        self.entries
            .iter()
            .filter(|e| e.is_full_day())
            .map(|e| e.date)
            .collect()
    }

    /// Dates excluded specifically for `course_id`.
    pub fn course_dates(&self, course_id: &str) -> BTreeSet<NaiveDate> {
        self.entries
            .iter()
            .filter(|e| e.course_id.as_deref() == Some(course_id))
            .map(|e| e.date)
            .collect()
    }

    /// Whether `course_id` is skipped on `date`, by either scope.
    pub fn is_excluded(&self, date: NaiveDate, course_id: &str) -> bool {
        self.entries.iter().any(|e| {
            e.date == date && e.course_id.as_deref().is_none_or(|id| id == course_id)
        })
    }
}
