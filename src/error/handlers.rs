//! Error handlers
//!
//! Converts storage errors into what the outer request layer hands back to callers.

use crate::error::types::StorageError;
use log::error;
use serde::Serialize;

/// Structured error object with a type tag and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

impl From<&StorageError> for ErrorReport {
    fn from(err: &StorageError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl ErrorReport {
    /// `{"type":"<kind>","message":"<message>"}`
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"type\":\"{}\",\"message\":\"unserializable error report: {}\"}}",
                self.kind, e
            )
        })
    }
}

/// Log a storage error that is about to leave the process boundary
pub fn handle_error(err: &StorageError) -> ErrorReport {
    error!("Storage error: {}", err);
    ErrorReport::from(err)
}

/// Convert error to an HTTP-style status code
pub fn error_to_status(err: &StorageError) -> u16 {
    match err {
        StorageError::InvalidKey(_) => 400,
        StorageError::NotFound { .. } => 404,
        StorageError::VersionConflict { .. } => 409,
        StorageError::Io { .. } => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    #[test]
    fn report_carries_type_tag_and_message() {
        let err = StorageError::not_found(Stage::Read, "Latest/demo");
        let report = ErrorReport::from(&err);
        assert_eq!(report.kind, "NotFound");
        assert!(report.message.contains("Latest/demo"));
        assert_eq!(error_to_status(&err), 404);
    }

    #[test]
    fn report_serializes_to_error_object() {
        let err = StorageError::not_found(Stage::Read, "Latest/demo");
        assert_eq!(
            ErrorReport::from(&err).to_json(),
            r#"{"type":"NotFound","message":"[read] Not found: Latest/demo"}"#
        );

        let report = ErrorReport::from(&StorageError::InvalidKey("a\"b".into()));
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["type"], "InvalidKey");
        assert_eq!(value["message"], report.message.as_str());
    }

    #[test]
    fn status_codes_per_kind() {
        assert_eq!(error_to_status(&StorageError::InvalidKey("..".into())), 400);
        let conflict = StorageError::VersionConflict {
            unit: "demo".into(),
            revision: 2,
        };
        assert_eq!(error_to_status(&conflict), 409);
        assert_eq!(handle_error(&conflict).kind, "VersionConflict");
    }
}
