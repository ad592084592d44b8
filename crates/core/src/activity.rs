//! Activity log review status and point summation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Review status of an activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Pending,
    Approved,
    Rejected,
    NeedsInfo,
}

impl LogStatus {
    /// Parse the `status` column. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "needs_info" => Ok(Self::NeedsInfo),
            other => Err(CoreError::Validation(format!(
                "Unknown log status '{other}'. Must be one of: pending, approved, rejected, needs_info"
            ))),
        }
    }

    /// Database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::NeedsInfo => "needs_info",
        }
    }

    /// Only approved logs count toward a user's total.
    pub fn counts_toward_points(self) -> bool {
        self == Self::Approved
    }
}

/// Sum the points of approved logs, ignoring every other status.
///
/// Logs with an unknown status (`None`) never count. The sum saturates
/// instead of overflowing.
pub fn approved_total<I>(logs: I) -> i64
where
    I: IntoIterator<Item = (Option<LogStatus>, i64)>,
{
    logs.into_iter()
        .filter(|(status, _)| status.is_some_and(LogStatus::counts_toward_points))
        .fold(0i64, |sum, (_, points)| sum.saturating_add(points))
}
