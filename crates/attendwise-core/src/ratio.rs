//! Attendance ratio and risk classification.
//!
//! All threshold comparisons are done in integer arithmetic so the 75% and
//! 65% boundaries are exact regardless of floating-point rounding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Risk band for an attendance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskStatus {
    /// At or above 75%.
    Safe,
    /// At or above 65% but below 75%.
    Warn,
    /// Below 65%.
    Danger,
}

impl RiskStatus {
    /// Classify `present / total` without going through floating point.
    fn classify(present: u64, total: u64) -> Self {
        if total == 0 || 4 * present >= 3 * total {
            RiskStatus::Safe
        } else if 20 * present >= 13 * total {
            RiskStatus::Warn
        } else {
            RiskStatus::Danger
        }
    }

    pub fn is_safe(self) -> bool {
        self == RiskStatus::Safe
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskStatus::Safe => write!(f, "safe"),
            RiskStatus::Warn => write!(f, "warn"),
            RiskStatus::Danger => write!(f, "danger"),
        }
    }
}

impl FromStr for RiskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(RiskStatus::Safe),
            "warn" | "warning" => Ok(RiskStatus::Warn),
            "danger" => Ok(RiskStatus::Danger),
            other => Err(format!("unknown risk status: {other}")),
        }
    }
}

/// Attendance standing for one set of cumulative counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    /// `100 * present / total`, or 0 when nothing has been held yet.
    pub percentage: f64,
    /// Risk band the percentage falls in.
    pub status: RiskStatus,
    /// Lectures that can still be skipped while staying at or above 75%.
    /// Only meaningful when `status` is safe.
    pub can_miss: u32,
    /// Consecutive lectures needed to climb back to 75%.
    /// Only meaningful when `status` is not safe.
    pub must_attend: u32,
}

impl Ratio {
    /// Percentage rounded to two decimals for display.
    pub fn rounded_percentage(&self) -> f64 {
        (self.percentage * 100.0).round() / 100.0
    }
}

/// Compute percentage, risk status and threshold distance.
///
/// `can_miss` is the largest `k` with `present / (total + k) >= 0.75`
/// and `must_attend` the smallest `k` with
/// `(present + k) / (total + k) >= 0.75`. Both are clamped at zero.
pub fn compute_ratio(present: u32, total: u32) -> Ratio {
    if total == 0 {
        return Ratio {
            percentage: 0.0,
            status: RiskStatus::Safe,
            can_miss: 0,
            must_attend: 0,
        };
    }

    let (p, t) = (present as u64, total as u64);
    let percentage = 100.0 * present as f64 / total as f64;

    // present / (total + k) >= 3/4  <=>  k <= (4p - 3t) / 3
    let can_miss = (4 * p).saturating_sub(3 * t) / 3;
    // (present + k) / (total + k) >= 3/4  <=>  k >= 3t - 4p
    let must_attend = (3 * t).saturating_sub(4 * p);

    Ratio {
        percentage,
        status: RiskStatus::classify(p, t),
        can_miss: u32::try_from(can_miss).unwrap_or(u32::MAX),
        must_attend: u32::try_from(must_attend).unwrap_or(u32::MAX),
    }
}
