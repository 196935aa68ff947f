use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    #[serde(rename = "name", alias = "student_name", alias = "studentName")]
    pub student_name: String,
    pub subject: String,
    pub grade: i64,
    pub grade_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CreateGradeRequest {
    pub student_name: String,
    pub subject: String,
    pub grade: i64,
    pub grade_date: String,
}

// Absent fields are left untouched by the backend, so they must not be sent as null.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UpdateGradeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_date: Option<String>,
}

impl UpdateGradeRequest {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.grade.is_none() && self.grade_date.is_none()
    }
}

/// The `{success, data, error, errors}` wrapper every grades endpoint answers with.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Envelope of `GET /api/grades`.
pub type GradeListResponse = Envelope<Vec<GradeRecord>>;
/// Envelope of the single-record endpoints.
pub type GradeResponse = Envelope<GradeRecord>;

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                error: self.error,
                errors: self.errors.unwrap_or_default(),
            });
        }
        self.data.ok_or(ApiError::MissingData)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok" && self.database == "connected"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Display class the web front ends attached to a grade cell.
    pub fn css_class(self) -> &'static str {
        match self {
            Verdict::Pass => "grade-pass",
            Verdict::Fail => "grade-fail",
        }
    }

    pub fn is_failing(self) -> bool {
        self == Verdict::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_row_with_name_field() {
        let raw = r#"{
            "id": 1,
            "student_id": 1,
            "name": "Mario Rossi",
            "subject": "Matematica",
            "grade": 8,
            "grade_date": "2026-01-28",
            "created_at": "2026-01-28T10:30:00"
        }"#;
        let record: GradeRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.student_name, "Mario Rossi");
        assert_eq!(record.created_at.as_deref(), Some("2026-01-28T10:30:00"));
    }

    #[test]
    fn list_and_single_envelopes_are_distinct_shapes() {
        let list = r#"{"success": true, "data": [{"id": 2, "student_id": 3, "name": "Anna",
            "subject": "Storia", "grade": 5, "grade_date": "2024-03-05"}]}"#;
        let records = serde_json::from_str::<GradeListResponse>(list)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].created_at, None);

        // A list body is not a single record.
        assert!(serde_json::from_str::<GradeResponse>(list).is_err());
    }

    #[test]
    fn failed_envelope_carries_validation_errors() {
        let raw = r#"{"success": false, "error": "Dati non validi", "errors": ["voto mancante"]}"#;
        let err = serde_json::from_str::<GradeResponse>(raw)
            .unwrap()
            .into_result()
            .unwrap_err();
        match err {
            ApiError::Rejected { error, errors } => {
                assert_eq!(error.as_deref(), Some("Dati non validi"));
                assert_eq!(errors, vec!["voto mancante".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn successful_envelope_without_data_is_an_error() {
        let env: GradeResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(env.into_result(), Err(ApiError::MissingData)));
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let req = UpdateGradeRequest {
            grade: Some(9),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"grade":9}"#);
        assert!(UpdateGradeRequest::default().is_empty());
    }

    #[test]
    fn verdict_maps_to_display_class() {
        assert_eq!(Verdict::Pass.css_class(), "grade-pass");
        assert_eq!(Verdict::Fail.css_class(), "grade-fail");
        assert!(Verdict::Fail.is_failing());
    }
}
