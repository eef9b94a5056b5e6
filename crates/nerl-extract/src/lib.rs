//! NERL Extract - Text extraction and mention detection
//!
//! Turns archive payload markup into a token stream and the token stream
//! into a map of named-entity mentions:
//! - Markup tokenizer with script/style/title suppression
//! - English stop-word filtering
//! - Mention detection over the joined token stream
//! - A built-in heuristic recognizer usable without an external model

pub mod html;
pub mod mentions;
pub mod ner;
pub mod stopwords;

pub use html::TokenExtractor;
pub use mentions::MentionDetector;
pub use ner::HeuristicRecognizer;
pub use stopwords::is_stopword;
