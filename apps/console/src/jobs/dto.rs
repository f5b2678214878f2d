//! Wire shapes for job endpoints: snake_case list rows, camelCase detail
//! envelope with snake_case requirement and soft-skill rows. `inferred` is
//! kept as raw JSON because backends have sent it as a bool and as 0/1.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::EntityStatus;

/// Where a job description came from. `null` while processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    File,
    Text,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSummaryDto {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<JobSource>,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRequirementDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub inferred: Value,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoftSkillDto {
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub importance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobDetailDto {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<JobSource>,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default, rename = "parsedData")]
    pub parsed_data: Value,
    #[serde(default)]
    pub requirements: Vec<JobRequirementDto>,
    #[serde(default)]
    pub soft_skills: Vec<SoftSkillDto>,
    #[serde(default, rename = "createdAt")]
    pub created_at: String,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: String,
}
