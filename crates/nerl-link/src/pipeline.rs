//! Per-record linking pipeline
//!
//! One pure transformation from a raw archive record block to the list of
//! linked mentions it produces. Execution strategy (sequential loop or
//! parallel map over documents) is the caller's choice; the pipeline
//! itself holds no cross-document state.

use std::sync::Arc;

use tracing::debug;

use nerl_core::{AppConfig, CandidateSearch, FactCount, LinkedMention, MentionRecognizer, Result};
use nerl_extract::{MentionDetector, TokenExtractor};
use nerl_warc::WarcRecord;

use crate::candidates::{filter_top, rank_candidates, retrieve_candidates, select_best};

/// The entity-linking pipeline for one document at a time
pub struct LinkPipeline {
    search: Arc<dyn CandidateSearch>,
    kb: Arc<dyn FactCount>,
    extractor: TokenExtractor,
    detector: MentionDetector,
    results_count: usize,
}

impl LinkPipeline {
    /// Assemble the pipeline from its collaborators.
    ///
    /// The recognizer is expensive to build; construct it once per worker
    /// and share it. The pipeline only borrows it through the detector.
    pub fn new(
        recognizer: Arc<dyn MentionRecognizer>,
        search: Arc<dyn CandidateSearch>,
        kb: Arc<dyn FactCount>,
        config: &AppConfig,
    ) -> Self {
        Self {
            search,
            kb,
            extractor: TokenExtractor::new(),
            detector: MentionDetector::new(recognizer, config.pipeline.filter_stopwords),
            results_count: config.search.results_count,
        }
    }

    /// Process one raw record block.
    ///
    /// Unusable records (missing identifier header) produce no output and
    /// no error.
    pub async fn process_block(&self, raw: &str) -> Result<Vec<LinkedMention>> {
        let record = WarcRecord::parse(raw);
        let Some(document_id) = record.trec_id() else {
            debug!("skipping record without TREC id");
            return Ok(Vec::new());
        };
        self.process_document(document_id, record.payload()).await
    }

    /// Link all mentions of one document payload.
    ///
    /// Mentions are processed in lexicographic order so repeated runs over
    /// identical input produce byte-identical output.
    pub async fn process_document(
        &self,
        document_id: &str,
        payload: &str,
    ) -> Result<Vec<LinkedMention>> {
        let tokens = self.extractor.extract(payload);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mentions = self.detector.detect(&tokens)?;
        let mut ordered: Vec<String> = mentions.into_keys().collect();
        ordered.sort();

        let mut linked = Vec::new();
        for mention in &ordered {
            let set = retrieve_candidates(self.search.as_ref(), mention, self.results_count).await;
            if set.is_empty() {
                continue;
            }
            let mut candidates = filter_top(set);
            rank_candidates(self.kb.as_ref(), &mut candidates).await;
            if let Some(best) = select_best(candidates) {
                linked.push(LinkedMention::new(document_id, mention.as_str(), best.entity_id));
            }
        }

        debug!(document_id, linked = linked.len(), "document processed");
        Ok(linked)
    }
}
