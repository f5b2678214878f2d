//! Wire shapes for resume endpoints, exactly as the backend emits them:
//! snake_case list rows, camelCase detail envelope with snake_case skill
//! rows, and an untyped `parsedData` blob left to the normalizer.

use serde::Deserialize;
use serde_json::Value;

use crate::types::EntityStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeSummaryDto {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeSkillDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub proficiency: Option<f64>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeDetailDto {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default, rename = "parsedData")]
    pub parsed_data: Value,
    #[serde(default)]
    pub skills: Vec<ResumeSkillDto>,
    #[serde(default, rename = "createdAt")]
    pub created_at: String,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_rows_decode_from_snake_case() {
        let dto: ResumeSummaryDto = serde_json::from_str(
            r#"{"id":"r-1","filename":"cv.pdf","mime_type":"application/pdf",
                "status":"processing","created_at":"2024-03-01T10:00:00Z",
                "updated_at":"2024-03-01T10:05:00Z"}"#,
        )
        .unwrap();
        assert_eq!(dto.id, "r-1");
        assert_eq!(dto.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(dto.status, EntityStatus::Processing);
    }

    #[test]
    fn detail_envelope_decodes_with_missing_optionals() {
        let dto: ResumeDetailDto =
            serde_json::from_str(r#"{"id":"r-1","status":"queued"}"#).unwrap();
        assert_eq!(dto.id, "r-1");
        assert!(dto.parsed_data.is_null());
        assert!(dto.skills.is_empty());
        assert_eq!(dto.filename, None);
    }
}
