//! Source that GETs tables from a static file server.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use quizboard_core::error::SourceError;
use quizboard_core::model::Selection;
use quizboard_core::traits::{SourceFetcher, SourceKind};

use crate::template::PathTemplates;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches `{base_url}/{rendered template}` over HTTP.
pub struct HttpSource {
    base_url: String,
    paths: PathTemplates,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, paths: PathTemplates, timeout_secs: u64) -> Result<Self, SourceError> {
        let timeout_secs = if timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            paths,
            timeout_secs,
            client,
        })
    }

    pub fn url(&self, kind: SourceKind, selection: &Selection) -> String {
        let path = self.paths.render(kind, selection);
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SourceFetcher for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, kind, selection), fields(kind = %kind, selection = %selection))]
    async fn fetch(&self, kind: SourceKind, selection: &Selection) -> Result<String, SourceError> {
        let url = self.url(kind, selection);

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                SourceError::Network(format!("{} not reachable: {e}", self.base_url))
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(SourceError::NotFound(url));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status,
                message: body,
            });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else {
                SourceError::Network(format!("failed to read body of {url}: {e}"))
            }
        })?;
        tracing::debug!("fetched {} bytes from {url}", text.len());
        Ok(text)
    }
}
