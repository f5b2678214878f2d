//! Match view models and normalizers. The nested result summary is the most
//! shape-variant payload in the system; everything flexible goes through the
//! shared normalize helpers.

use serde::Serialize;

use crate::matches::dto::{
    MatchCandidateDto, MatchDetailDto, MatchResultDto, MatchSummaryDto, RequirementAnalysisDto,
    RequirementCoverageDto,
};
use crate::normalize::{highlight_list, string_list, truthy};
use crate::types::{HasId, MatchStatus, StatusLike, SummaryRow};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: String,
    pub resume_id: String,
    pub job_id: String,
    pub status: MatchStatus,
    pub result_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub error_message: Option<String>,
}

/// Per-requirement coverage row with the candidate's alignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementCoverage {
    pub requirement: Option<String>,
    pub importance: Option<f64>,
    pub candidate_has_experience: bool,
    pub similarity: f64,
    pub matched_skill: Option<String>,
    pub inferred: bool,
    pub comments: String,
}

/// Raw per-requirement analysis row, before the narrative pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementAnalysis {
    pub requirement: Option<String>,
    pub importance: Option<f64>,
    pub similarity: f64,
    pub matched_skill: Option<String>,
    pub inferred: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub name: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub degrees: Vec<String>,
    pub certifications: Vec<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: String,
    pub score: f64,
    pub completed_at: String,
    pub overall_match_score: f64,
    pub candidate: Option<MatchCandidate>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub requirements: Vec<RequirementCoverage>,
    pub raw_details: Vec<RequirementAnalysis>,
    pub job_highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub id: String,
    pub status: MatchStatus,
    pub resume_id: String,
    pub job_id: String,
    pub error: Option<String>,
    /// Present only when the status is terminal-success.
    pub result: Option<MatchResult>,
}

pub fn normalize_summary(dto: MatchSummaryDto) -> MatchSummary {
    MatchSummary {
        id: dto.id,
        resume_id: dto.resume_id,
        job_id: dto.job_id,
        status: dto.status,
        result_id: dto.result_id,
        created_at: dto.created_at,
        updated_at: dto.updated_at,
        error_message: dto.error_message,
    }
}

fn normalize_coverage(dto: RequirementCoverageDto) -> RequirementCoverage {
    RequirementCoverage {
        requirement: dto.skill,
        importance: dto.importance,
        candidate_has_experience: truthy(&dto.candidate_has_experience),
        similarity: dto.similarity,
        matched_skill: dto.matched_skill,
        inferred: truthy(&dto.inferred),
        comments: dto.comments,
    }
}

fn normalize_analysis(dto: RequirementAnalysisDto) -> RequirementAnalysis {
    RequirementAnalysis {
        requirement: dto.requirement,
        importance: dto.importance,
        similarity: dto.similarity,
        matched_skill: dto.matched_skill,
        inferred: truthy(&dto.inferred),
    }
}

fn normalize_candidate(dto: MatchCandidateDto) -> MatchCandidate {
    MatchCandidate {
        name: dto.name,
        skills: dto.skills,
        experience_years: dto.experience_years,
        degrees: dto.degrees,
        certifications: dto.certifications,
        summary: dto.summary,
    }
}

fn normalize_result(dto: MatchResultDto) -> MatchResult {
    let summary = dto.summary;
    MatchResult {
        id: dto.id,
        score: dto.score,
        completed_at: dto.completed_at,
        overall_match_score: summary.overall_match_score,
        candidate: summary.candidate.map(normalize_candidate),
        strengths: string_list(Some(&summary.strengths)),
        gaps: string_list(Some(&summary.weaknesses)),
        requirements: summary
            .requirements
            .into_iter()
            .map(normalize_coverage)
            .collect(),
        raw_details: summary
            .raw_details
            .into_iter()
            .map(normalize_analysis)
            .collect(),
        job_highlights: highlight_list(Some(&summary.job_highlights)),
    }
}

pub fn normalize_detail(dto: MatchDetailDto) -> MatchDetail {
    MatchDetail {
        id: dto.id,
        status: dto.status,
        resume_id: dto.resume_id,
        job_id: dto.job_id,
        error: dto.error,
        result: dto.result.map(normalize_result),
    }
}

impl HasId for MatchSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl StatusLike for MatchSummary {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl SummaryRow for MatchSummary {
    fn status_str(&self) -> &'static str {
        self.status.as_str()
    }

    fn updated_at(&self) -> Option<&str> {
        Some(&self.updated_at)
    }
}

impl StatusLike for MatchDetail {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
