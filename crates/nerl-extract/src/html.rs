//! Markup tokenizer
//!
//! Single-pass scanner over HTML-ish payloads. Text inside script, style,
//! and title elements is suppressed; everything else is split into
//! word tokens. Chunks yielding only one or two words are joined into a
//! single token so short multi-word names ("New York") survive chunk
//! boundaries intact.

use regex::Regex;

/// Extracts word tokens from markup text.
///
/// Region tracking is deliberately loose: any closing tag clears all
/// three suppression flags, regardless of which element it closes.
/// Nested or interleaved regions are therefore not tracked precisely.
/// This matches historical behavior and keeps output byte-compatible
/// with prior runs; do not "fix" it without revisiting stored output.
pub struct TokenExtractor {
    word_re: Regex,
}

impl TokenExtractor {
    pub fn new() -> Self {
        Self {
            // \w+ is Unicode-aware, matching the original tokenization
            word_re: Regex::new(r"\w+").expect("static regex"),
        }
    }

    /// Tokenize one document's markup in a single pass
    pub fn extract(&self, markup: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut in_script = false;
        let mut in_style = false;
        let mut in_title = false;

        let mut rest = markup;
        while !rest.is_empty() {
            match rest.find('<') {
                None => {
                    self.handle_data(rest, in_script || in_style || in_title, &mut tokens);
                    break;
                }
                Some(lt) => {
                    self.handle_data(&rest[..lt], in_script || in_style || in_title, &mut tokens);
                    rest = &rest[lt..];

                    if rest.starts_with("<!--") {
                        match rest.find("-->") {
                            Some(end) => {
                                rest = &rest[end + 3..];
                                continue;
                            }
                            None => break,
                        }
                    }

                    match rest.find('>') {
                        None => break,
                        Some(gt) => {
                            Self::handle_tag(
                                &rest[1..gt],
                                &mut in_script,
                                &mut in_style,
                                &mut in_title,
                            );
                            rest = &rest[gt + 1..];
                        }
                    }
                }
            }
        }

        tokens
    }

    fn handle_tag(tag: &str, in_script: &mut bool, in_style: &mut bool, in_title: &mut bool) {
        let tag = tag.trim();
        if tag.starts_with('/') {
            // Any closing tag clears every suppressed region (see note above)
            *in_script = false;
            *in_style = false;
            *in_title = false;
            return;
        }

        let name: String = tag
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
            .collect::<String>()
            .to_ascii_lowercase();

        match name.as_str() {
            "script" => *in_script = true,
            "style" => *in_style = true,
            "title" => *in_title = true,
            _ => {}
        }
    }

    fn handle_data(&self, data: &str, suppressed: bool, tokens: &mut Vec<String>) {
        if suppressed || data.is_empty() {
            return;
        }
        let words: Vec<&str> = self.word_re.find_iter(data).map(|m| m.as_str()).collect();
        if words.is_empty() {
            return;
        }
        if words.len() <= 2 {
            tokens.push(words.join(" "));
        } else {
            for word in words {
                tokens.push(word.to_string());
            }
        }
    }
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
