//! NERL Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the NERL system:
//! - Named-entity labels and linkability rules
//! - Candidate and linked-mention models
//! - Collaborator traits (search service, knowledge base, recognizer)
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, KnowledgeBaseConfig, LoggingConfig, PipelineConfig, SearchConfig,
};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for NERL operations
#[derive(Error, Debug)]
pub enum NerlError {
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Search service error: {0}")]
    Search(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NerlError>;

// ============================================================================
// Named-Entity Labels
// ============================================================================

/// Coarse named-entity categories assigned by the recognizer.
///
/// The set mirrors the OntoNotes label inventory used by common NER
/// models. Numeric and temporal categories are recognized but never
/// linked against the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NerLabel {
    Person,
    Norp,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl NerLabel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Norp => "NORP",
            Self::Fac => "FAC",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Loc => "LOC",
            Self::Product => "PRODUCT",
            Self::Event => "EVENT",
            Self::WorkOfArt => "WORK_OF_ART",
            Self::Law => "LAW",
            Self::Language => "LANGUAGE",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Percent => "PERCENT",
            Self::Money => "MONEY",
            Self::Quantity => "QUANTITY",
            Self::Ordinal => "ORDINAL",
            Self::Cardinal => "CARDINAL",
        }
    }

    /// Whether mentions of this category are worth linking.
    ///
    /// Numeric, temporal, and quantity categories carry no stable
    /// knowledge-base identity and are dropped before retrieval.
    pub fn is_linkable(&self) -> bool {
        !matches!(
            self,
            Self::Date
                | Self::Time
                | Self::Percent
                | Self::Money
                | Self::Quantity
                | Self::Ordinal
                | Self::Cardinal
        )
    }
}

impl std::fmt::Display for NerLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Mention and Candidate Models
// ============================================================================

/// A recognized entity span, before any linking decision
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSpan {
    /// Surface text of the mention
    pub text: String,
    /// Coarse entity category
    pub label: NerLabel,
}

/// Mentions of one document, keyed by surface text.
///
/// Two spans with identical text collapse to one entry; the label of the
/// later span wins. This matches dictionary semantics downstream.
pub type MentionMap = HashMap<String, NerLabel>;

/// One hit returned by the search service
#[derive(Debug, Clone, Default)]
pub struct SearchHit {
    /// Knowledge-base resource identifier (e.g. `/m/05qtj`)
    pub resource: Option<String>,
    /// Human-readable entity label
    pub label: Option<String>,
    /// Retrieval relevance score
    pub score: f64,
}

/// A linking candidate for one (mention, entity id) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Knowledge-base resource identifier
    pub entity_id: String,
    /// Human-readable label from the search service (last hit wins)
    pub label: String,
    /// Maximum relevance score seen across all hits for this id
    pub score: f64,
    /// Number of knowledge-base triples describing this entity
    pub facts: u64,
    /// Combined rank; meaningful only after the ranking stage
    pub rank: f64,
}

impl Candidate {
    /// Create a candidate with neutral fact and rank defaults
    pub fn new(entity_id: impl Into<String>, label: impl Into<String>, score: f64) -> Self {
        Self {
            entity_id: entity_id.into(),
            label: label.into(),
            score,
            facts: 0,
            rank: 0.0,
        }
    }
}

/// The final (document, mention, entity) linking decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedMention {
    /// Document identifier recovered from the archive record
    pub document_id: String,
    /// Mention surface text
    pub mention: String,
    /// Chosen knowledge-base entity identifier
    pub entity_id: String,
}

impl LinkedMention {
    pub fn new(
        document_id: impl Into<String>,
        mention: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            mention: mention.into(),
            entity_id: entity_id.into(),
        }
    }

    /// Render as one tab-separated output line, newline-terminated
    pub fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}\n", self.document_id, self.mention, self.entity_id)
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Full-text search service yielding knowledge-base candidates.
///
/// Implementations issue one query per mention; a failed call surfaces as
/// an error that callers absorb into an empty candidate set.
#[async_trait::async_trait]
pub trait CandidateSearch: Send + Sync {
    /// Search for candidate entities matching the mention text
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// Knowledge-base triple store answering fact-count queries
#[async_trait::async_trait]
pub trait FactCount: Send + Sync {
    /// Count the triples whose subject is the given entity
    async fn count_facts(&self, entity_id: &str) -> Result<u64>;
}

/// Named-entity recognizer over plain text.
///
/// Treated as an opaque capability: text in, labeled spans out. The model
/// behind it is expensive to build and cheap to reuse, so implementations
/// are constructed once per worker and shared by reference.
pub trait MentionRecognizer: Send + Sync {
    /// Recognize entity spans in the given text
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>>;
}

// ============================================================================
// Tests
// ============================================================================
