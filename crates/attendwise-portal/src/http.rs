//! HTTP portal client.

use std::time::Duration;

use anyhow::{ensure, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use reqwest::Url;
use serde::Deserialize;
use tracing::instrument;

use attendwise_core::error::UpstreamError;
use attendwise_core::model::{AttendanceCounts, CourseAttendance, CourseComponent};
use attendwise_core::traits::{PortalClient, RawLectureRecord, RawScheduleEntry};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Portal client speaking the portal's JSON API with a bearer token.
pub struct HttpPortal {
    base_url: Url,
    token: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpPortal {
    pub fn new(base_url: &str, token: &str, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid portal base_url: {base_url}"))?;
        ensure!(
            !base_url.cannot_be_a_base(),
            "portal base_url cannot carry a path: {base_url}"
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url,
            token: token.to_string(),
            timeout_secs,
            client,
        })
    }

    /// Append path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Network(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(self.timeout_secs)
                } else {
                    UpstreamError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::AuthorizationExpired(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<PortalErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(UpstreamError::Status { status, message });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

#[derive(Deserialize)]
struct PortalErrorBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalCourse {
    course_id: String,
    #[serde(default)]
    course_code: String,
    #[serde(default)]
    course_name: String,
    #[serde(default)]
    components: Vec<PortalComponent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalComponent {
    comp_id: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    present: Option<u32>,
    #[serde(default)]
    total: Option<u32>,
}

impl TryFrom<PortalCourse> for CourseAttendance {
    type Error = UpstreamError;

    fn try_from(course: PortalCourse) -> Result<Self, Self::Error> {
        let components = course
            .components
            .into_iter()
            .map(|c| -> Result<CourseComponent, UpstreamError> {
                let counts = match (c.present, c.total) {
                    (Some(present), Some(total)) => Some(
                        AttendanceCounts::new(present, total)
                            .map_err(|e| UpstreamError::Malformed(format!("{}: {e}", c.comp_id)))?,
                    ),
                    _ => None,
                };
                Ok(CourseComponent {
                    comp_id: c.comp_id,
                    kind: c.kind,
                    counts,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CourseAttendance {
            course_id: course.course_id,
            course_code: course.course_code.trim().to_string(),
            course_name: course.course_name,
            components,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalSlot {
    course_code: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    venue: String,
    #[serde(default)]
    faculty: String,
}

impl From<PortalSlot> for RawScheduleEntry {
    fn from(slot: PortalSlot) -> Self {
        Self {
            course_code: slot.course_code,
            start: slot.start,
            end: slot.end,
            kind: slot.kind,
            venue: slot.venue,
            faculty: slot.faculty,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalLecture {
    #[serde(default)]
    date: String,
    #[serde(default)]
    time_slot: String,
    #[serde(default)]
    attendance: String,
}

impl From<PortalLecture> for RawLectureRecord {
    fn from(lecture: PortalLecture) -> Self {
        Self {
            date: lecture.date,
            time_slot: lecture.time_slot,
            mark: lecture.attendance,
        }
    }
}

#[async_trait]
impl PortalClient for HttpPortal {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_roster(&self) -> Result<Vec<CourseAttendance>, UpstreamError> {
        let courses: Vec<PortalCourse> = self.get_json(self.endpoint(&["roster"])?).await?;
        courses.into_iter().map(CourseAttendance::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn fetch_weekly_schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawScheduleEntry>, UpstreamError> {
        let mut url = self.endpoint(&["schedule"])?;
        url.query_pairs_mut()
            .append_pair("start", &start.format("%Y-%m-%d").to_string())
            .append_pair("end", &end.format("%Y-%m-%d").to_string());
        let slots: Vec<PortalSlot> = self.get_json(url).await?;
        Ok(slots.into_iter().map(RawScheduleEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_lecture_history(
        &self,
        student_id: &str,
        course_id: &str,
        comp_id: &str,
    ) -> Result<Vec<RawLectureRecord>, UpstreamError> {
        let url = self.endpoint(&[
            "students",
            student_id,
            "courses",
            course_id,
            "components",
            comp_id,
            "lectures",
        ])?;
        let lectures: Vec<PortalLecture> = self.get_json(url).await?;
        Ok(lectures.into_iter().map(RawLectureRecord::from).collect())
    }
}
