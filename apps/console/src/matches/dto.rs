//! Wire shapes for match endpoints: snake_case list rows and a camelCase
//! detail envelope whose nested `match` result carries a snake_case summary.
//! Strengths, weaknesses and job highlights stay raw JSON for the
//! normalizer.

use serde::Deserialize;
use serde_json::Value;

use crate::types::MatchStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct MatchSummaryDto {
    pub id: String,
    #[serde(default)]
    pub resume_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub result_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementCoverageDto {
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub candidate_has_experience: Value,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub matched_skill: Option<String>,
    #[serde(default)]
    pub inferred: Value,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementAnalysisDto {
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub matched_skill: Option<String>,
    #[serde(default)]
    pub inferred: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchCandidateDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub degrees: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchResultSummaryDto {
    #[serde(default)]
    pub overall_match_score: f64,
    #[serde(default)]
    pub candidate: Option<MatchCandidateDto>,
    #[serde(default)]
    pub requirements: Vec<RequirementCoverageDto>,
    #[serde(default)]
    pub strengths: Value,
    #[serde(default)]
    pub weaknesses: Value,
    #[serde(default)]
    pub job_highlights: Value,
    #[serde(default)]
    pub raw_details: Vec<RequirementAnalysisDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchResultDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub summary: MatchResultSummaryDto,
    #[serde(default, rename = "completedAt")]
    pub completed_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDetailDto {
    pub id: String,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default, rename = "resumeId")]
    pub resume_id: String,
    #[serde(default, rename = "jobId")]
    pub job_id: String,
    #[serde(default)]
    pub error: Option<String>,
    /// Present only once the computation completed successfully.
    #[serde(default, rename = "match")]
    pub result: Option<MatchResultDto>,
}
