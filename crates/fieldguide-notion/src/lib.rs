//! Notion database client: implements [`KnowledgeBase`] over the public REST API.
//!
//! `POST {base}/databases/{id}/query` with the `Notion-Version` header and a bearer token. Paged
//! responses (`has_more` / `next_cursor`) are followed until exhausted or a cursor comes back a
//! second time; every failure is returned as an [`ApiError`] so the caller can fall back to an
//! empty dataset.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use fieldguide_core::{ApiError, CoreConfig, KnowledgeBase, RawResultSet, Secrets};
use reqwest::StatusCode;

const SOURCE_NAME: &str = "notion";
const VERSION_HEADER: &str = "Notion-Version";

pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    version: String,
    api_key: String,
    timeout: Duration,
}

impl NotionClient {
    pub fn new(
        base_url: &str,
        version: &str,
        secrets: &Secrets,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.to_string(),
            api_key: secrets.notion_key().to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &CoreConfig, secrets: &Secrets) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            &config.notion_version,
            secrets,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn query_url(&self, database_id: &str) -> String {
        format!("{}/databases/{}/query", self.base_url, database_id)
    }

    fn map_transport(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout.as_secs())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }

    /// One page of results starting at `cursor`.
    async fn query_page(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> Result<RawResultSet, ApiError> {
        let body = match cursor {
            Some(c) => serde_json::json!({ "start_cursor": c }),
            None => serde_json::json!({}),
        };
        let resp = self
            .client
            .post(self.query_url(database_id))
            .header(VERSION_HEADER, &self.version)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text().await.map_err(|e| self.map_transport(e))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl KnowledgeBase for NotionClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn query_database(&self, database_id: &str) -> Result<RawResultSet, ApiError> {
        let started = Instant::now();
        let mut merged = RawResultSet::default();
        let mut cursor: Option<String> = None;
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages = 0usize;
        loop {
            let page = self.query_page(database_id, cursor.as_deref()).await.map_err(|e| {
                tracing::warn!(
                    target: "fieldguide::notion",
                    database_id,
                    pages,
                    error = %e,
                    "Database query failed"
                );
                e
            })?;
            pages += 1;
            merged.results.extend(page.results);
            match page.next_cursor.filter(|_| page.has_more) {
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    tracing::warn!(
                        target: "fieldguide::notion",
                        database_id,
                        cursor = %next,
                        pages,
                        "Cursor already visited, stopping pagination"
                    );
                    break;
                }
                None => break,
            }
        }
        tracing::info!(
            target: "fieldguide::notion",
            database_id,
            pages,
            results = merged.results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Database query complete"
        );
        Ok(merged)
    }
}
