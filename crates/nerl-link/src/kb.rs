//! Knowledge-base client
//!
//! Counts the triples describing an entity by posting a templated SPARQL
//! query to a Trident endpoint. The identifier separator is rewritten
//! from the search service's form (`/m/`) to the knowledge base's native
//! form (`m.`) before templating.

use std::time::Duration;

use serde::Deserialize;

use nerl_core::{FactCount, KnowledgeBaseConfig, NerlError, Result};

/// HTTP client for the SPARQL fact-count endpoint
pub struct TridentClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct KbResponse {
    #[serde(default)]
    stats: KbStats,
}

#[derive(Debug, Deserialize, Default)]
struct KbStats {
    /// Arrives as a JSON string in practice; tolerate numbers too
    #[serde(default)]
    nresults: serde_json::Value,
}

impl TridentClient {
    /// Create a client from config, with the per-request timeout applied
    pub fn from_config(config: &KnowledgeBaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NerlError::KnowledgeBase(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

/// Rewrite a search-service identifier into the knowledge base's form
fn native_id(entity_id: &str) -> String {
    entity_id.replace("/m/", "m.")
}

/// Build the fact-count query for one entity
fn fact_query(entity_id: &str) -> String {
    format!(
        "SELECT DISTINCT * WHERE {{ <http://rdf.freebase.com/ns/{}> ?p ?o. }}",
        native_id(entity_id)
    )
}

fn parse_nresults(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

#[async_trait::async_trait]
impl FactCount for TridentClient {
    async fn count_facts(&self, entity_id: &str) -> Result<u64> {
        let query = fact_query(entity_id);
        let response = self
            .client
            .post(&self.base_url)
            .form(&[("print", "false"), ("query", query.as_str())])
            .send()
            .await
            .map_err(|e| NerlError::KnowledgeBase(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NerlError::KnowledgeBase(format!(
                "knowledge base returned status {}",
                response.status()
            )));
        }

        let body: KbResponse = response
            .json()
            .await
            .map_err(|e| NerlError::KnowledgeBase(format!("invalid response body: {e}")))?;

        Ok(parse_nresults(&body.stats.nresults))
    }
}
