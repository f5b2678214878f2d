//! Resume store: cache plus fetch/mutate interface for the resume family.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::backend::{BackendClient, FileUpload};
use crate::errors::{ConsoleError, Result};
use crate::realtime::EntityKind;
use crate::resumes::dto::{ResumeDetailDto, ResumeSummaryDto};
use crate::resumes::model::{normalize_detail, normalize_summary, ResumeDetail, ResumeSummary};
use crate::session::Session;
use crate::sync::{EntityCache, RowMeta, WatchTarget};
use crate::types::CreateReceipt;

pub struct ResumeStore {
    client: BackendClient,
    cache: EntityCache<ResumeSummary, ResumeDetail>,
}

impl ResumeStore {
    pub fn new(client: BackendClient) -> Arc<Self> {
        Arc::new(ResumeStore {
            client,
            cache: EntityCache::new(),
        })
    }

    /// Current resume list: the cached snapshot when one exists, otherwise a
    /// fetch.
    pub async fn list(&self, session: &Session) -> Result<Vec<ResumeSummary>> {
        if let Some(cached) = self.cache.cached_list() {
            return Ok(cached);
        }
        self.fetch_list(session).await
    }

    async fn fetch_list(&self, session: &Session) -> Result<Vec<ResumeSummary>> {
        let ticket = self.cache.begin_list_fetch();
        let rows: Vec<ResumeSummaryDto> =
            self.client.get_json("/resumes", session.token()).await?;
        let rows: Vec<ResumeSummary> = rows.into_iter().map(normalize_summary).collect();
        self.cache.apply_list(ticket, rows.clone());
        Ok(rows)
    }

    pub async fn detail(&self, id: &str, session: &Session) -> Result<ResumeDetail> {
        if let Some(cached) = self.cache.cached_detail(id) {
            return Ok(cached);
        }
        self.fetch_detail(id, session).await
    }

    async fn fetch_detail(&self, id: &str, session: &Session) -> Result<ResumeDetail> {
        let ticket = self.cache.begin_detail_fetch(id);
        let dto: ResumeDetailDto = self
            .client
            .get_json(&format!("/resumes/{id}"), session.token())
            .await?;
        let detail = normalize_detail(dto);
        self.cache.apply_detail(id, ticket, detail.clone());
        Ok(detail)
    }

    /// Upload a resume file. The file must carry bytes; an empty selection
    /// is rejected before any request goes out.
    pub async fn upload(&self, file: FileUpload, session: &Session) -> Result<CreateReceipt> {
        if file.is_empty() {
            return Err(ConsoleError::validation(
                "Please select a resume file before uploading.",
            ));
        }
        let receipt: CreateReceipt = self
            .client
            .upload_multipart("/resumes", "file", file, &[], session.token())
            .await?;
        info!(id = %receipt.id, "resume uploaded");
        self.cache.invalidate_list();
        Ok(receipt)
    }

    /// Delete a resume. On success the id disappears from the cached list
    /// and detail map immediately; on failure the cache is untouched and the
    /// error propagates for user-facing retry.
    pub async fn delete(&self, id: &str, session: &Session) -> Result<()> {
        self.client
            .delete(&format!("/resumes/{id}"), session.token())
            .await?;
        self.cache.remove(id);
        Ok(())
    }

    pub fn select(&self, id: Option<&str>) {
        self.cache.select(id);
    }

    pub fn cached_list(&self) -> Option<Vec<ResumeSummary>> {
        self.cache.cached_list()
    }

    pub fn cached_detail(&self, id: &str) -> Option<ResumeDetail> {
        self.cache.cached_detail(id)
    }
}

#[async_trait]
impl WatchTarget for ResumeStore {
    fn kind(&self) -> EntityKind {
        EntityKind::Resume
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
