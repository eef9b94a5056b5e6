//! Mention detection
//!
//! Joins the document's token stream into one sentence, hands it to the
//! recognizer, and keeps only linkable mentions. Mentions are keyed by
//! surface text, so duplicate spans collapse with the last label winning.

use std::sync::Arc;

use tracing::debug;

use nerl_core::{MentionMap, MentionRecognizer, Result};

use crate::stopwords::is_stopword;

/// Detects named-entity mentions in a token stream
pub struct MentionDetector {
    recognizer: Arc<dyn MentionRecognizer>,
    filter_stopwords: bool,
}

impl MentionDetector {
    pub fn new(recognizer: Arc<dyn MentionRecognizer>, filter_stopwords: bool) -> Self {
        Self {
            recognizer,
            filter_stopwords,
        }
    }

    /// Detect linkable mentions in the given token stream.
    ///
    /// A stream of fewer than two tokens produces an empty sentence and
    /// therefore no mentions (preserved from historical behavior).
    pub fn detect(&self, tokens: &[String]) -> Result<MentionMap> {
        let kept: Vec<&str> = if self.filter_stopwords {
            tokens
                .iter()
                .filter(|t| !is_stopword(t))
                .map(|t| t.as_str())
                .collect()
        } else {
            tokens.iter().map(|t| t.as_str()).collect()
        };

        let sentence = if kept.len() > 1 {
            kept.join(" ")
        } else {
            String::new()
        };

        if sentence.is_empty() {
            return Ok(MentionMap::new());
        }

        let spans = self.recognizer.recognize(&sentence)?;
        let mut mentions = MentionMap::new();
        for span in spans {
            if span.label.is_linkable() {
                mentions.insert(span.text, span.label);
            }
        }

        debug!(mentions = mentions.len(), "detected mentions");
        Ok(mentions)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nerl_core::{NerLabel, RecognizedSpan};

    /// Recognizer returning a fixed span list, recording its input
    struct FixedRecognizer {
        spans: Vec<RecognizedSpan>,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl FixedRecognizer {
        fn new(spans: Vec<RecognizedSpan>) -> Self {
            Self {
                spans,
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    impl MentionRecognizer for FixedRecognizer {
        fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self.spans.clone())
        }
    }

    fn span(text: &str, label: NerLabel) -> RecognizedSpan {
        RecognizedSpan {
            text: text.to_string(),
            label,
        }
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_non_linkable_labels_dropped() {
        let recognizer = Arc::new(FixedRecognizer::new(vec![
            span("Paris", NerLabel::Gpe),
            span("2009", NerLabel::Date),
            span("500", NerLabel::Cardinal),
        ]));
        let detector = MentionDetector::new(recognizer, false);
        let mentions = detector.detect(&tokens(&["Paris", "2009", "500"])).unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions.get("Paris"), Some(&NerLabel::Gpe));
    }

    #[test]
    fn test_duplicate_mentions_last_label_wins() {
        let recognizer = Arc::new(FixedRecognizer::new(vec![
            span("Washington", NerLabel::Person),
            span("Washington", NerLabel::Gpe),
        ]));
        let detector = MentionDetector::new(recognizer, false);
        let mentions = detector
            .detect(&tokens(&["Washington", "twice", "here"]))
            .unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions.get("Washington"), Some(&NerLabel::Gpe));
    }

    #[test]
    fn test_single_token_yields_no_mentions() {
        let recognizer = Arc::new(FixedRecognizer::new(vec![span("Paris", NerLabel::Gpe)]));
        let detector = MentionDetector::new(recognizer.clone(), false);
        let mentions = detector.detect(&tokens(&["Paris"])).unwrap();
        assert!(mentions.is_empty());
        // Recognizer must not run on an empty sentence
        assert!(recognizer.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_tokens_yield_no_mentions() {
        let recognizer = Arc::new(FixedRecognizer::new(vec![]));
        let detector = MentionDetector::new(recognizer, true);
        assert!(detector.detect(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_stopword_filtering_shapes_sentence() {
        let recognizer = Arc::new(FixedRecognizer::new(vec![]));
        let detector = MentionDetector::new(recognizer.clone(), true);
        detector
            .detect(&tokens(&["the", "president", "of", "France"]))
            .unwrap();
        let seen = recognizer.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["president France"]);
    }

    #[test]
    fn test_sentence_joins_all_tokens_without_filter() {
        let recognizer = Arc::new(FixedRecognizer::new(vec![]));
        let detector = MentionDetector::new(recognizer.clone(), false);
        detector
            .detect(&tokens(&["the", "president", "of", "France"]))
            .unwrap();
        let seen = recognizer.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["the president of France"]);
    }
}
