//! Candidate-set transformations
//!
//! Pure stages of the linking decision: retrieve-and-merge, top-score
//! filtering, knowledge-base ranking, and best-candidate selection.
//! Service failures degrade to empty data here and are never propagated.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::warn;

use nerl_core::{Candidate, CandidateSearch, FactCount};

/// Candidates for one mention, keyed by entity id, plus the maximum
/// relevance score observed across all hits
#[derive(Debug, Default)]
pub struct CandidateSet {
    pub by_id: HashMap<String, Candidate>,
    pub max_score: f64,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// Query the search service for one mention and merge the hit list.
///
/// Each entity id keeps the maximum score seen across its hits; the label
/// of the last hit wins. A failed or empty response yields an empty set.
pub async fn retrieve_candidates(
    search: &dyn CandidateSearch,
    mention: &str,
    limit: usize,
) -> CandidateSet {
    let hits = match search.search(mention, limit).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!(mention, error = %e, "search failed, mention gets no candidates");
            Vec::new()
        }
    };

    let mut set = CandidateSet::default();
    for hit in hits {
        let id = hit.resource.unwrap_or_default();
        let label = hit.label.unwrap_or_default();
        let entry = set
            .by_id
            .entry(id.clone())
            .or_insert_with(|| Candidate::new(id, label.clone(), hit.score));
        entry.score = entry.score.max(hit.score);
        entry.label = label;
        if entry.score > set.max_score {
            set.max_score = entry.score;
        }
    }
    set
}

/// Keep candidates tied at the maximum relevance score.
///
/// Candidates without an entity id are excluded; ties are kept intact for
/// the ranking stage to resolve.
pub fn filter_top(set: CandidateSet) -> Vec<Candidate> {
    let max_score = set.max_score;
    set.by_id
        .into_values()
        .filter(|c| !c.entity_id.is_empty() && c.score >= max_score)
        .collect()
}

/// Populate fact counts and ranks from the knowledge base.
///
/// Fact counts for all candidates of a mention are fetched concurrently;
/// there is no ordering dependency between them. A failed call leaves the
/// candidate at zero facts and rank zero, it is not removed.
pub async fn rank_candidates(kb: &dyn FactCount, candidates: &mut [Candidate]) {
    let counts =
        futures::future::join_all(candidates.iter().map(|c| kb.count_facts(&c.entity_id))).await;

    for (candidate, result) in candidates.iter_mut().zip(counts) {
        let facts = match result {
            Ok(n) => n,
            Err(e) => {
                warn!(entity_id = %candidate.entity_id, error = %e, "fact count failed");
                0
            }
        };
        candidate.facts = facts;
        candidate.rank = if facts > 0 {
            (facts as f64).ln() * candidate.score
        } else {
            0.0
        };
    }
}

/// Pick the single best candidate by rank.
///
/// Rank ties are broken by ascending entity id so output is deterministic
/// even when the search service reorders equal-scored hits between runs.
pub fn select_best(mut candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.sort_by(|a, b| {
        b.rank
            .partial_cmp(&a.rank)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    candidates.into_iter().next()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nerl_core::{NerlError, Result, SearchHit};

    struct FixedSearch {
        hits: Vec<SearchHit>,
    }

    #[async_trait::async_trait]
    impl CandidateSearch for FixedSearch {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
            Ok(self.hits.clone())
        }
    }

    struct FailingSearch;

    #[async_trait::async_trait]
    impl CandidateSearch for FailingSearch {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
            Err(NerlError::Search("connection refused".to_string()))
        }
    }

    struct FactTable(HashMap<String, u64>);

    #[async_trait::async_trait]
    impl FactCount for FactTable {
        async fn count_facts(&self, entity_id: &str) -> Result<u64> {
            self.0
                .get(entity_id)
                .copied()
                .ok_or_else(|| NerlError::KnowledgeBase("unknown entity".to_string()))
        }
    }

    fn hit(resource: &str, label: &str, score: f64) -> SearchHit {
        SearchHit {
            resource: Some(resource.to_string()),
            label: Some(label.to_string()),
            score,
        }
    }

    #[tokio::test]
    async fn test_retrieve_keeps_max_score_per_id() {
        let search = FixedSearch {
            hits: vec![
                hit("/m/05qtj", "Paris", 8.0),
                hit("/m/05qtj", "Paris, France", 12.0),
                hit("/m/05qtj", "Paris (city)", 5.0),
            ],
        };
        let set = retrieve_candidates(&search, "Paris", 20).await;
        assert_eq!(set.len(), 1);
        let candidate = &set.by_id["/m/05qtj"];
        assert_eq!(candidate.score, 12.0);
        // Last-seen label wins
        assert_eq!(candidate.label, "Paris (city)");
        assert_eq!(set.max_score, 12.0);
    }

    #[test]
    fn test_retrieve_failure_yields_empty_set() {
        let set = tokio_test::block_on(retrieve_candidates(&FailingSearch, "Paris", 20));
        assert!(set.is_empty());
        assert_eq!(set.max_score, 0.0);
    }

    #[tokio::test]
    async fn test_filter_keeps_ties_and_drops_missing_ids() {
        let search = FixedSearch {
            hits: vec![
                hit("/m/05qtj", "Paris", 12.0),
                hit("/m/0x1", "Paris TX", 12.0),
                hit("/m/low", "Paris Hilton", 3.0),
                SearchHit {
                    resource: None,
                    label: Some("orphan".to_string()),
                    score: 12.0,
                },
            ],
        };
        let set = retrieve_candidates(&search, "Paris", 20).await;
        let top = filter_top(set);
        let mut ids: Vec<&str> = top.iter().map(|c| c.entity_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, ["/m/05qtj", "/m/0x1"]);
    }

    #[tokio::test]
    async fn test_rank_formula() {
        let kb = FactTable(HashMap::from([
            ("/m/05qtj".to_string(), 500u64),
            ("/m/0x1".to_string(), 2u64),
            ("/m/none".to_string(), 0u64),
        ]));
        let mut candidates = vec![
            Candidate::new("/m/05qtj", "Paris", 12.0),
            Candidate::new("/m/0x1", "Paris TX", 12.0),
            Candidate::new("/m/none", "ghost", 12.0),
        ];
        rank_candidates(&kb, &mut candidates).await;

        assert!((candidates[0].rank - (500f64).ln() * 12.0).abs() < 1e-9);
        assert!((candidates[1].rank - (2f64).ln() * 12.0).abs() < 1e-9);
        assert_eq!(candidates[2].facts, 0);
        assert_eq!(candidates[2].rank, 0.0);
    }

    #[tokio::test]
    async fn test_rank_failure_degrades_to_zero() {
        let kb = FactTable(HashMap::new());
        let mut candidates = vec![Candidate::new("/m/unknown", "x", 9.0)];
        rank_candidates(&kb, &mut candidates).await;
        assert_eq!(candidates[0].facts, 0);
        assert_eq!(candidates[0].rank, 0.0);
    }

    #[test]
    fn test_select_best_by_rank() {
        let mut a = Candidate::new("/m/05qtj", "Paris", 12.0);
        a.rank = 74.5;
        let mut b = Candidate::new("/m/0x1", "Paris TX", 12.0);
        b.rank = 8.3;
        let best = select_best(vec![b, a]).unwrap();
        assert_eq!(best.entity_id, "/m/05qtj");
    }

    #[test]
    fn test_select_tie_breaks_on_entity_id() {
        let mut a = Candidate::new("/m/bbb", "b", 1.0);
        a.rank = 5.0;
        let mut b = Candidate::new("/m/aaa", "a", 1.0);
        b.rank = 5.0;
        let best = select_best(vec![a, b]).unwrap();
        assert_eq!(best.entity_id, "/m/aaa");
    }

    #[test]
    fn test_select_empty_is_none() {
        assert!(select_best(Vec::new()).is_none());
    }

    #[test]
    fn test_zero_rank_candidate_can_still_win_alone() {
        let only = Candidate::new("/m/solo", "solo", 4.0);
        let best = select_best(vec![only]).unwrap();
        assert_eq!(best.entity_id, "/m/solo");
        assert_eq!(best.rank, 0.0);
    }
}
