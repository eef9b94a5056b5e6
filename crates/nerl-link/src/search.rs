//! Search service client
//!
//! Queries the full-text search endpoint for knowledge-base candidates.
//! One GET per mention with `q` and `size` parameters; the response is an
//! Elasticsearch-style hit envelope.

use std::time::Duration;

use serde::Deserialize;

use nerl_core::{CandidateSearch, NerlError, Result, SearchConfig, SearchHit};

/// HTTP client for the candidate search service
pub struct ElasticSearchClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize, Default)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source", default)]
    source: RawSource,
    #[serde(rename = "_score", default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSource {
    resource: Option<String>,
    label: Option<String>,
}

impl ElasticSearchClient {
    /// Create a client from config, with the per-request timeout applied
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NerlError::Search(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl CandidateSearch for ElasticSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("size", &limit.to_string())])
            .send()
            .await
            .map_err(|e| NerlError::Search(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NerlError::Search(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| NerlError::Search(format!("invalid response body: {e}")))?;

        Ok(body
            .hits
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                resource: hit.source.resource,
                label: hit.source.label,
                score: hit.score.unwrap_or(0.0),
            })
            .collect())
    }
}
