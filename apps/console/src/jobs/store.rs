//! Job store: cache plus fetch/mutate interface for the job family. Jobs
//! are created from raw text or an uploaded file; both paths validate before
//! any request is issued.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::backend::{BackendClient, FileUpload};
use crate::errors::{ConsoleError, Result};
use crate::jobs::dto::{JobDetailDto, JobSummaryDto};
use crate::jobs::model::{normalize_detail, normalize_summary, JobDetail, JobSummary};
use crate::realtime::EntityKind;
use crate::session::Session;
use crate::sync::{EntityCache, RowMeta, WatchTarget};
use crate::types::CreateReceipt;

/// Text-mode submission. `description_text` is the current field name;
/// `text` is the legacy one older forms still send.
#[derive(Debug, Clone, Default)]
pub struct JobTextDraft {
    pub title: Option<String>,
    pub description_text: Option<String>,
    pub text: Option<String>,
}

impl JobTextDraft {
    fn description(&self) -> Option<&str> {
        self.description_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .or_else(|| {
                self.text
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
            })
    }
}

pub struct JobStore {
    client: BackendClient,
    cache: EntityCache<JobSummary, JobDetail>,
    /// Inferred requirements below this importance are dropped at
    /// normalization.
    min_inferred_importance: f64,
}

impl JobStore {
    pub fn new(client: BackendClient, min_inferred_importance: f64) -> Arc<Self> {
        Arc::new(JobStore {
            client,
            cache: EntityCache::new(),
            min_inferred_importance,
        })
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<JobSummary>> {
        if let Some(cached) = self.cache.cached_list() {
            return Ok(cached);
        }
        self.fetch_list(session).await
    }

    async fn fetch_list(&self, session: &Session) -> Result<Vec<JobSummary>> {
        let ticket = self.cache.begin_list_fetch();
        let rows: Vec<JobSummaryDto> = self.client.get_json("/jobs", session.token()).await?;
        let rows: Vec<JobSummary> = rows.into_iter().map(normalize_summary).collect();
        self.cache.apply_list(ticket, rows.clone());
        Ok(rows)
    }

    pub async fn detail(&self, id: &str, session: &Session) -> Result<JobDetail> {
        if let Some(cached) = self.cache.cached_detail(id) {
            return Ok(cached);
        }
        self.fetch_detail(id, session).await
    }

    async fn fetch_detail(&self, id: &str, session: &Session) -> Result<JobDetail> {
        let ticket = self.cache.begin_detail_fetch(id);
        let dto: JobDetailDto = self
            .client
            .get_json(&format!("/jobs/{id}"), session.token())
            .await?;
        let detail = normalize_detail(dto, self.min_inferred_importance);
        self.cache.apply_detail(id, ticket, detail.clone());
        Ok(detail)
    }

    /// Create a job from a text description. Rejected locally when neither
    /// description field carries text.
    pub async fn create_from_text(
        &self,
        draft: JobTextDraft,
        session: &Session,
    ) -> Result<CreateReceipt> {
        let Some(description) = draft.description() else {
            return Err(ConsoleError::validation(
                "Provide a job description before submitting.",
            ));
        };
        let body = json!({
            "title": draft.title,
            "description_text": description,
        });
        let receipt: CreateReceipt = self
            .client
            .post_json("/jobs", &body, session.token())
            .await?;
        info!(id = %receipt.id, "job submitted from text");
        self.cache.invalidate_list();
        Ok(receipt)
    }

    /// Create a job from an uploaded description file. Requires file bytes
    /// and a title.
    pub async fn create_from_file(
        &self,
        file: FileUpload,
        title: &str,
        session: &Session,
    ) -> Result<CreateReceipt> {
        if file.is_empty() {
            return Err(ConsoleError::validation(
                "Select a job description file before uploading.",
            ));
        }
        if title.trim().is_empty() {
            return Err(ConsoleError::validation("Job title is required."));
        }
        let receipt: CreateReceipt = self
            .client
            .upload_multipart("/jobs", "file", file, &[("title", title)], session.token())
            .await?;
        info!(id = %receipt.id, "job uploaded from file");
        self.cache.invalidate_list();
        Ok(receipt)
    }

    pub async fn delete(&self, id: &str, session: &Session) -> Result<()> {
        self.client
            .delete(&format!("/jobs/{id}"), session.token())
            .await?;
        self.cache.remove(id);
        Ok(())
    }

    pub fn select(&self, id: Option<&str>) {
        self.cache.select(id);
    }

    pub fn cached_list(&self) -> Option<Vec<JobSummary>> {
        self.cache.cached_list()
    }

    pub fn cached_detail(&self, id: &str) -> Option<JobDetail> {
        self.cache.cached_detail(id)
    }
}

#[async_trait]
impl WatchTarget for JobStore {
    fn kind(&self) -> EntityKind {
        EntityKind::Job
    }

    fn row_meta(&self, id: &str) -> Option<RowMeta> {
        self.cache.row_meta(id)
    }

    fn selected_id(&self) -> Option<String> {
        self.cache.selected_id()
    }

    fn detail_pending(&self, id: &str) -> bool {
        self.cache.detail_pending(id)
    }

    fn poll_delay(&self, interval: Duration) -> Option<Duration> {
        self.cache.poll_delay(interval)
    }

    async fn refresh_list(&self, session: &Session) -> Result<()> {
        self.fetch_list(session).await.map(|_| ())
    }

    async fn refresh_detail(&self, id: &str, session: &Session) -> Result<()> {
        self.fetch_detail(id, session).await.map(|_| ())
    }
}
