//! User-facing status messages

use crate::error::{DashboardError, ViewScope};
use serde::Serialize;
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// A stage finished
    Success,
    /// One view is blank, the rest stand
    Warning,
    /// Nothing downstream can be shown
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A message attached to one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// View it concerns
    pub scope: ViewScope,
    /// One-line message
    pub message: String,
    /// Full diagnostic, when there is more to say
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Notice {
    /// Informational notice
    pub fn info(scope: ViewScope, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            scope,
            message: message.into(),
            detail: None,
        }
    }

    /// Success notice
    pub fn success(scope: ViewScope, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            scope,
            message: message.into(),
            detail: None,
        }
    }

    /// Notice for a failure: an error if it halts the dashboard, a warning
    /// if it only blanks its own view
    #[must_use]
    pub fn from_error(err: &DashboardError) -> Self {
        Self {
            level: if err.is_fatal() {
                NoticeLevel::Error
            } else {
                NoticeLevel::Warning
            },
            scope: err.scope(),
            message: err.to_string(),
            detail: err.detail(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.scope, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_are_errors() {
        let notice = Notice::from_error(&DashboardError::IngestionFailure {
            detail: "not csv".into(),
        });
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.scope, ViewScope::Input);
    }

    #[test]
    fn contained_errors_are_warnings() {
        let notice = Notice::from_error(&DashboardError::MissingField {
            field: "path",
            view: ViewScope::Chart,
        });
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.scope, ViewScope::Chart);
        assert_eq!(
            notice.to_string(),
            "[warning] chart: cannot build chart: results have no 'path' column"
        );
    }

    #[test]
    fn pipeline_detail_is_kept() {
        let err = anyhow::anyhow!("exit 3");
        let notice = Notice::from_error(&DashboardError::pipeline_failure("scorer", &err));
        assert!(notice.detail.is_some());
    }
}
