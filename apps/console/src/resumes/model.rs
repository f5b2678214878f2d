//! Resume view models and their normalizers. The snake_case→camelCase
//! rename and all defensive parsing of `parsedData` happen here and nowhere
//! else.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::{non_empty_text, section_map, SectionValue};
use crate::resumes::dto::{ResumeDetailDto, ResumeSkillDto, ResumeSummaryDto};
use crate::types::{EntityStatus, HasId, StatusLike, SummaryRow};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: String,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub status: EntityStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Skill extracted from resume content; years and proficiency are nullable
/// when the pipeline could not infer them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSkill {
    pub id: String,
    pub skill: String,
    pub experience_years: Option<f64>,
    pub proficiency: Option<f64>,
    pub created_at: String,
}

/// High-level candidate profile from the parsed blob. Unrecognized profile
/// keys survive in `extra` rather than being dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub total_experience_years: Option<f64>,
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeParsedSummary {
    pub sections: Option<BTreeMap<String, SectionValue>>,
    pub profile: Option<CandidateProfile>,
    pub statistics: Option<Map<String, Value>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDetail {
    pub id: String,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub status: EntityStatus,
    pub parsed_data: Option<ResumeParsedSummary>,
    pub skills: Vec<CandidateSkill>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn normalize_summary(dto: ResumeSummaryDto) -> ResumeSummary {
    ResumeSummary {
        id: dto.id,
        filename: dto.filename,
        mime_type: dto.mime_type,
        status: dto.status,
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}

fn normalize_skill(dto: ResumeSkillDto) -> CandidateSkill {
    CandidateSkill {
        id: dto.id,
        skill: dto.skill,
        experience_years: dto.experience_years,
        proficiency: dto.proficiency,
        created_at: dto.created_at,
    }
}

/// Normalize the free-form `parsedData` blob. Anything that is not an
/// object has no parsed structure and becomes `None`; inside an object every
/// field degrades gracefully when absent or oddly shaped.
fn normalize_parsed(value: &Value) -> Option<ResumeParsedSummary> {
    let record = value.as_object()?;
    Some(ResumeParsedSummary {
        sections: section_map(record.get("sections")),
        profile: record.get("profile").and_then(normalize_profile),
        statistics: record
            .get("statistics")
            .and_then(Value::as_object)
            .cloned(),
        message: non_empty_text(record.get("message")),
    })
}

fn normalize_profile(value: &Value) -> Option<CandidateProfile> {
    let record = value.as_object()?;
    // Experience has shipped under both the camelCase and the legacy
    // snake_case key.
    let total_experience_years = record
        .get("totalExperienceYears")
        .and_then(Value::as_f64)
        .or_else(|| record.get("total_experience_years").and_then(Value::as_f64));
    let mut extra = record.clone();
    for key in [
        "name",
        "summary",
        "totalExperienceYears",
        "total_experience_years",
    ] {
        extra.remove(key);
    }
    Some(CandidateProfile {
        name: non_empty_text(record.get("name")),
        total_experience_years,
        summary: non_empty_text(record.get("summary")),
        extra,
    })
}

pub fn normalize_detail(dto: ResumeDetailDto) -> ResumeDetail {
    ResumeDetail {
        id: dto.id,
        filename: dto.filename,
        mime_type: dto.mime_type,
        status: dto.status,
        parsed_data: normalize_parsed(&dto.parsed_data),
        skills: dto.skills.into_iter().map(normalize_skill).collect(),
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}

impl HasId for ResumeSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl StatusLike for ResumeSummary {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl SummaryRow for ResumeSummary {
    fn status_str(&self) -> &'static str {
        self.status.as_str()
    }

    fn updated_at(&self) -> Option<&str> {
        Some(&self.updated_at)
    }

    fn title(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

impl StatusLike for ResumeDetail {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
