//! NERL Link - Entity-linking decision pipeline
//!
//! Takes detected mentions through candidate retrieval, top-score
//! filtering, knowledge-base corroboration, and best-candidate selection:
//! - HTTP clients for the search service and the SPARQL endpoint
//! - Pure candidate-set transformations (retrieve, filter, rank, select)
//! - The per-record pipeline composing all stages
//! - The append-only TSV output sink

pub mod candidates;
pub mod kb;
pub mod output;
pub mod pipeline;
pub mod search;

pub use candidates::{filter_top, rank_candidates, retrieve_candidates, select_best, CandidateSet};
pub use kb::TridentClient;
pub use output::OutputSink;
pub use pipeline::LinkPipeline;
pub use search::ElasticSearchClient;
