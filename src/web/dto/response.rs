//! Response DTOs for Web API.

use serde::Serialize;

use crate::settings::SubmissionOutcome;
use crate::sync::SyncReport;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Success/failure envelope of the admin-ajax endpoint.
#[derive(Debug, Serialize)]
pub struct AjaxResponse<T: Serialize> {
    /// Whether the action succeeded.
    pub success: bool,
    /// Payload on success, error message on failure.
    pub data: T,
}

impl<T: Serialize> AjaxResponse<T> {
    /// Successful response.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl AjaxResponse<String> {
    /// Failed response carrying a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: message.into(),
        }
    }
}

/// Stored feed settings.
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    /// Raw feed URL list as stored.
    pub rss_feed_urls: String,
    /// Parsed feed sources.
    pub sources: Vec<String>,
}

/// Apply pass summary.
#[derive(Debug, Serialize)]
pub struct SyncReportResponse {
    /// "N of M sources synced successfully".
    pub summary: String,
    /// Per-source details.
    #[serde(flatten)]
    pub report: SyncReport,
}

impl From<SyncReport> for SyncReportResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            summary: report.summary(),
            report,
        }
    }
}

/// Result of a settings submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    /// Whether the stored feed URL list changed.
    pub changed: bool,
    /// Apply passes triggered by the submission.
    pub syncs: Vec<SyncReportResponse>,
}

impl From<SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            changed: outcome.changed,
            syncs: outcome.reports.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ajax_envelopes() {
        let ok = serde_json::to_value(AjaxResponse::success(vec![1, 2])).unwrap();
        assert_eq!(ok, json!({"success": true, "data": [1, 2]}));

        let err = serde_json::to_value(AjaxResponse::failure("denied")).unwrap();
        assert_eq!(err, json!({"success": false, "data": "denied"}));
    }

    #[test]
    fn test_sync_report_response() {
        let value = serde_json::to_value(SyncReportResponse::from(SyncReport::default())).unwrap();
        assert_eq!(
            value,
            json!({"summary": "0 of 0 sources synced successfully", "sources": []})
        );
    }
}
