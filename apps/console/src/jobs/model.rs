//! Job view models and normalizers, including the inferred-requirement
//! importance filter and the flexible highlights/overview handling.

use serde::Serialize;
use serde_json::Value;

use crate::jobs::dto::{JobDetailDto, JobRequirementDto, JobSummaryDto, SoftSkillDto};
use crate::normalize::{
    highlight_list, join_overview, non_empty_text, overview_entries, truthy, OverviewEntry,
};
use crate::types::{EntityStatus, HasId, StatusLike, SummaryRow};

pub use crate::jobs::dto::JobSource;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: String,
    pub title: Option<String>,
    pub source: Option<JobSource>,
    pub status: EntityStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequirement {
    pub id: String,
    pub skill: String,
    pub importance: Option<f64>,
    pub inferred: bool,
    pub created_at: String,
}

/// Soft-skill row. The backend has emitted the score under `value` and
/// under `importance`; both land on both fields so consumers can read
/// either.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftSkill {
    pub skill: String,
    pub value: Option<f64>,
    pub importance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobParsedSummary {
    pub highlights: Vec<String>,
    pub overview: Option<String>,
    pub overview_entries: Vec<OverviewEntry>,
    /// O*NET classification blob, kept opaque.
    pub onet: Option<Value>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: String,
    pub title: Option<String>,
    pub source: Option<JobSource>,
    pub status: EntityStatus,
    pub parsed_data: Option<JobParsedSummary>,
    pub requirements: Vec<JobRequirement>,
    pub soft_skills: Vec<SoftSkill>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn normalize_summary(dto: JobSummaryDto) -> JobSummary {
    JobSummary {
        id: dto.id,
        title: dto.title,
        source: dto.source,
        status: dto.status,
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}

fn normalize_requirement(dto: JobRequirementDto) -> JobRequirement {
    JobRequirement {
        id: dto.id,
        skill: dto.skill,
        importance: dto.importance,
        inferred: truthy(&dto.inferred),
        created_at: dto.created_at,
    }
}

/// The display filter for requirements: inferred rows with a scored
/// importance below the floor are dropped; explicit rows and unscored
/// inferred rows always stay.
fn requirement_passes(requirement: &JobRequirement, min_inferred_importance: f64) -> bool {
    match (requirement.inferred, requirement.importance) {
        (true, Some(importance)) => importance >= min_inferred_importance,
        _ => true,
    }
}

fn normalize_soft_skill(dto: SoftSkillDto) -> SoftSkill {
    let score = dto.value.or(dto.importance);
    SoftSkill {
        skill: dto.skill,
        value: score,
        importance: score,
    }
}

fn normalize_parsed(value: &Value) -> Option<JobParsedSummary> {
    let record = value.as_object()?;
    let entries = overview_entries(record.get("overview"));
    Some(JobParsedSummary {
        highlights: highlight_list(record.get("highlights")),
        overview: join_overview(&entries),
        overview_entries: entries,
        onet: record.get("onet").filter(|v| !v.is_null()).cloned(),
        message: non_empty_text(record.get("message")),
    })
}

pub fn normalize_detail(dto: JobDetailDto, min_inferred_importance: f64) -> JobDetail {
    JobDetail {
        id: dto.id,
        title: dto.title,
        source: dto.source,
        status: dto.status,
        parsed_data: normalize_parsed(&dto.parsed_data),
        requirements: dto
            .requirements
            .into_iter()
            .map(normalize_requirement)
            .filter(|requirement| requirement_passes(requirement, min_inferred_importance))
            .collect(),
        soft_skills: dto.soft_skills.into_iter().map(normalize_soft_skill).collect(),
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}

impl HasId for JobSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl StatusLike for JobSummary {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl SummaryRow for JobSummary {
    fn status_str(&self) -> &'static str {
        self.status.as_str()
    }

    fn updated_at(&self) -> Option<&str> {
        Some(&self.updated_at)
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl StatusLike for JobDetail {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
