//! Heuristic named-entity recognizer
//!
//! A rule-based stand-in for a statistical NER model: regex patterns for
//! numeric and temporal categories, a small gazetteer for well-known
//! places and organizations, and a capitalized-run scanner for everything
//! else. It implements [`MentionRecognizer`], so a real model can be
//! swapped in behind the same trait without touching the pipeline.

use std::collections::HashMap;

use regex::Regex;

use nerl_core::{MentionRecognizer, NerLabel, RecognizedSpan, Result};

/// Organization-name suffixes triggering an ORG label
const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Ltd", "LLC", "Company", "Bank", "University", "Institute", "Group",
    "Association", "Ministry", "Agency",
];

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Rule-based recognizer over plain text
pub struct HeuristicRecognizer {
    /// Regex patterns mapped to a fixed label
    patterns: Vec<(Regex, NerLabel)>,
    /// Known surface forms mapped to a label
    gazetteer: HashMap<String, NerLabel>,
}

impl HeuristicRecognizer {
    pub fn new() -> Self {
        let mut recognizer = Self {
            patterns: Vec::new(),
            gazetteer: HashMap::new(),
        };
        recognizer.init_patterns();
        recognizer.init_gazetteer();
        recognizer
    }

    fn init_patterns(&mut self) {
        self.add_pattern(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$", NerLabel::Date);
        self.add_pattern(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$", NerLabel::Date);
        self.add_pattern(r"^\d+(\.\d+)?%$", NerLabel::Percent);
        self.add_pattern(r"^\$\d[\d,]*(\.\d+)?$", NerLabel::Money);
        self.add_pattern(r"^\d+(st|nd|rd|th)$", NerLabel::Ordinal);
        self.add_pattern(r"^\d[\d,]*$", NerLabel::Cardinal);
    }

    fn init_gazetteer(&mut self) {
        for month in MONTHS {
            self.add_term(*month, NerLabel::Date);
        }
        for place in [
            "Paris",
            "London",
            "Berlin",
            "Amsterdam",
            "Rome",
            "Madrid",
            "Tokyo",
            "Beijing",
            "Moscow",
            "Washington",
            "New York",
            "Los Angeles",
            "France",
            "Germany",
            "Italy",
            "Spain",
            "Japan",
            "China",
            "Russia",
            "England",
            "America",
            "Europe",
            "United States",
            "United Kingdom",
            "Netherlands",
        ] {
            self.add_term(place, NerLabel::Gpe);
        }
        for org in ["NASA", "UNESCO", "NATO", "FIFA", "BBC", "CNN", "IBM", "Google", "Microsoft"] {
            self.add_term(org, NerLabel::Org);
        }
        for lang in ["English", "French", "German", "Spanish", "Dutch", "Chinese", "Japanese"] {
            self.add_term(lang, NerLabel::Language);
        }
    }

    /// Register a whole-token regex pattern
    pub fn add_pattern(&mut self, pattern: &str, label: NerLabel) {
        if let Ok(re) = Regex::new(pattern) {
            self.patterns.push((re, label));
        }
    }

    /// Register a known surface form
    pub fn add_term(&mut self, term: impl Into<String>, label: NerLabel) {
        self.gazetteer.insert(term.into(), label);
    }

    fn pattern_label(&self, token: &str) -> Option<NerLabel> {
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(token))
            .map(|(_, label)| *label)
    }

    /// Label a run of capitalized tokens
    fn classify_run(&self, run: &[&str]) -> Option<(String, NerLabel)> {
        let text = run.join(" ");

        if let Some(label) = self.gazetteer.get(&text) {
            return Some((text, *label));
        }
        // Longest gazetteer prefix, so "New York visited" still hits "New York"
        for len in (1..run.len()).rev() {
            let prefix = run[..len].join(" ");
            if let Some(label) = self.gazetteer.get(&prefix) {
                return Some((prefix, *label));
            }
        }

        if run.iter().any(|t| ORG_SUFFIXES.contains(t)) {
            return Some((text, NerLabel::Org));
        }
        if run.len() >= 2 {
            return Some((text, NerLabel::Person));
        }
        // Lone all-caps tokens read as acronyms
        let only = run[0];
        if only.len() >= 2 && only.chars().all(|c| c.is_ascii_uppercase()) {
            return Some((text, NerLabel::Org));
        }

        None
    }
}

impl Default for HeuristicRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionRecognizer for HeuristicRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut spans = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        let flush = |run: &mut Vec<&str>, spans: &mut Vec<RecognizedSpan>| {
            if run.is_empty() {
                return;
            }
            if let Some((text, label)) = self.classify_run(run) {
                spans.push(RecognizedSpan { text, label });
            }
            run.clear();
        };

        for token in tokens {
            if let Some(label) = self.pattern_label(token) {
                flush(&mut run, &mut spans);
                spans.push(RecognizedSpan {
                    text: token.to_string(),
                    label,
                });
                continue;
            }
            let capitalized = token
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase());
            if capitalized {
                run.push(token);
            } else {
                flush(&mut run, &mut spans);
            }
        }
        flush(&mut run, &mut spans);

        Ok(spans)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_of(spans: &[RecognizedSpan], text: &str) -> Vec<NerLabel> {
        spans
            .iter()
            .filter(|s| s.text == text)
            .map(|s| s.label)
            .collect()
    }

    #[test]
    fn test_gazetteer_place() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("a trip to Paris in spring").unwrap();
        assert_eq!(labels_of(&spans, "Paris"), vec![NerLabel::Gpe]);
    }

    #[test]
    fn test_capitalized_run_is_person() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("Barack Obama visited Paris").unwrap();
        assert_eq!(labels_of(&spans, "Barack Obama"), vec![NerLabel::Person]);
        assert_eq!(labels_of(&spans, "Paris"), vec![NerLabel::Gpe]);
    }

    #[test]
    fn test_org_suffix() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("shares of Acme Corp fell today").unwrap();
        assert_eq!(labels_of(&spans, "Acme Corp"), vec![NerLabel::Org]);
    }

    #[test]
    fn test_acronym_is_org() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("scientists at CERN published results").unwrap();
        assert_eq!(labels_of(&spans, "CERN"), vec![NerLabel::Org]);
    }

    #[test]
    fn test_numeric_patterns() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("revenue grew 15% to $4,000 in 2009").unwrap();
        assert_eq!(labels_of(&spans, "15%"), vec![NerLabel::Percent]);
        assert_eq!(labels_of(&spans, "$4,000"), vec![NerLabel::Money]);
        assert_eq!(labels_of(&spans, "2009"), vec![NerLabel::Cardinal]);
    }

    #[test]
    fn test_date_pattern() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("published on 2009-11-05 online").unwrap();
        assert_eq!(labels_of(&spans, "2009-11-05"), vec![NerLabel::Date]);
    }

    #[test]
    fn test_lowercase_text_yields_nothing() {
        let ner = HeuristicRecognizer::new();
        let spans = ner.recognize("nothing interesting happens here").unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_custom_term() {
        let mut ner = HeuristicRecognizer::new();
        ner.add_term("Rustlandia", NerLabel::Gpe);
        let spans = ner.recognize("welcome to Rustlandia friends").unwrap();
        assert_eq!(labels_of(&spans, "Rustlandia"), vec![NerLabel::Gpe]);
    }
}
