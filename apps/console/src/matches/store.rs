//! Match store: cache plus fetch/mutate interface for match computations,
//! including the quota-aware match request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::backend::BackendClient;
use crate::errors::{ConsoleError, Result};
use crate::matches::dto::{MatchDetailDto, MatchSummaryDto};
use crate::matches::model::{normalize_detail, normalize_summary, MatchDetail, MatchSummary};
use crate::realtime::EntityKind;
use crate::session::Session;
use crate::sync::{EntityCache, RowMeta, WatchTarget};
use crate::types::CreateReceipt;

/// Wire message the backend answers with when the match quota is exhausted.
const UPGRADE_REQUIRED: &str = "upgrade_required";

pub struct MatchStore {
    client: BackendClient,
    cache: EntityCache<MatchSummary, MatchDetail>,
}

impl MatchStore {
    pub fn new(client: BackendClient) -> Arc<Self> {
        Arc::new(MatchStore {
            client,
            cache: EntityCache::new(),
        })
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<MatchSummary>> {
        if let Some(cached) = self.cache.cached_list() {
            return Ok(cached);
        }
        self.fetch_list(session).await
    }

    async fn fetch_list(&self, session: &Session) -> Result<Vec<MatchSummary>> {
        let ticket = self.cache.begin_list_fetch();
        let rows: Vec<MatchSummaryDto> =
            self.client.get_json("/matches", session.token()).await?;
        let rows: Vec<MatchSummary> = rows.into_iter().map(normalize_summary).collect();
        self.cache.apply_list(ticket, rows.clone());
        Ok(rows)
    }

    pub async fn detail(&self, id: &str, session: &Session) -> Result<MatchDetail> {
        if let Some(cached) = self.cache.cached_detail(id) {
            return Ok(cached);
        }
        self.fetch_detail(id, session).await
    }

    async fn fetch_detail(&self, id: &str, session: &Session) -> Result<MatchDetail> {
        let ticket = self.cache.begin_detail_fetch(id);
        let dto: MatchDetailDto = self
            .client
            .get_json(&format!("/matches/{id}"), session.token())
            .await?;
        let detail = normalize_detail(dto);
        self.cache.apply_detail(id, ticket, detail.clone());
        Ok(detail)
    }

    /// Queue a match computation between a resume and a job. A quota
    /// rejection is remapped into an upgrade prompt; every other error
    /// passes through unchanged.
    pub async fn request_match(
        &self,
        resume_id: &str,
        job_id: &str,
        session: &Session,
    ) -> Result<CreateReceipt> {
        if resume_id.trim().is_empty() || job_id.trim().is_empty() {
            return Err(ConsoleError::validation(
                "Select both a resume and a job before requesting a match.",
            ));
        }
        let body = json!({ "resumeId": resume_id, "jobId": job_id });
        let receipt: CreateReceipt = self
            .client
            .post_json("/matches", &body, session.token())
            .await
            .map_err(|err| match err {
                ConsoleError::Transport { message } if message == UPGRADE_REQUIRED => {
                    ConsoleError::Quota(
                        "Match limit reached. Upgrade to Pro to request more matches.".to_string(),
                    )
                }
                other => other,
            })?;
        info!(id = %receipt.id, resume_id, job_id, "match requested");
        self.cache.invalidate_list();
        Ok(receipt)
    }

    pub fn select(&self, id: Option<&str>) {
        self.cache.select(id);
    }

    pub fn cached_list(&self) -> Option<Vec<MatchSummary>> {
        self.cache.cached_list()
    }

    pub fn cached_detail(&self, id: &str) -> Option<MatchDetail> {
        self.cache.cached_detail(id)
    }
}

#[async_trait]
impl WatchTarget for MatchStore {
    fn kind(&self) -> EntityKind {
        EntityKind::Match
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_ids_are_rejected_before_any_request() {
        let store = MatchStore::new(BackendClient::with_base_url("http://127.0.0.1:1"));
        let err = store
            .request_match("", "j-1", &Session::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
        assert!(err.to_string().contains("Select both a resume and a job"));
    }
}
