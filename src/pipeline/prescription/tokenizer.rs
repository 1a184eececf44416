//! Line tokenizer for prescription text.
//!
//! Splits one line into word and aside tokens. Parenthesized text becomes a
//! single aside token. Commas and semicolons separate words like whitespace.
//! Glued forms ("Tab.Metformin") and glued strengths ("500mg") are split so
//! the parser only ever sees one field per token.

use std::sync::LazyLock;

use regex::Regex;

use super::vocabulary::{match_form, match_unit, GLUED_FORM_PREFIXES};

/// "500mg" or "500mg." at the end of a sentence.
static RE_GLUED_STRENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([A-Za-z/]+)\.?$").expect("valid regex"));

/// Leading list number of a numbered line, e.g. "1." in "1.Tab.Metformin".
static RE_LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\.").expect("valid regex"));

static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    /// Parenthesized text, e.g. a brand name "(Lantus)".
    Aside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Original text, without surrounding parentheses for asides.
    pub text: String,
    /// Lowercased text.
    pub lower: String,
}

impl Token {
    fn word(text: &str) -> Self {
        Self {
            kind: TokenKind::Word,
            text: text.to_string(),
            lower: text.to_lowercase(),
        }
    }

    fn aside(text: &str) -> Self {
        Self {
            kind: TokenKind::Aside,
            text: text.trim().to_string(),
            lower: text.trim().to_lowercase(),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Word made only of letters and digits.
    pub fn is_alphanumeric_word(&self) -> bool {
        self.is_word() && !self.text.is_empty() && self.text.chars().all(char::is_alphanumeric)
    }

    pub fn is_number(&self) -> bool {
        self.is_word() && RE_NUMBER.is_match(&self.text)
    }

    /// Leading run of letters and digits, e.g. "Glycomet" in "Glycomet-GP".
    pub fn alphanumeric_prefix(&self) -> Option<&str> {
        if !self.is_word() {
            return None;
        }
        let end = self
            .text
            .find(|c: char| !c.is_alphanumeric())
            .unwrap_or(self.text.len());
        self.text.get(..end).filter(|prefix| !prefix.is_empty())
    }

    /// Lowercased text for phrase comparison: a single trailing period
    /// (sentence end) is ignored, so "daily." matches "daily".
    pub fn phrase_key(&self) -> &str {
        self.lower.strip_suffix('.').unwrap_or(&self.lower)
    }
}

/// Tokenize a single line.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '(' => {
                flush_word(&mut word, &mut tokens);
                let mut aside = String::new();
                let mut depth = 1usize;
                for inner in chars.by_ref() {
                    match inner {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    aside.push(inner);
                }
                tokens.push(Token::aside(&aside));
            }
            ')' | ',' | ';' => flush_word(&mut word, &mut tokens),
            c if c.is_whitespace() => flush_word(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush_word(&mut word, &mut tokens);

    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    split_word(word, tokens);
    word.clear();
}

/// Byte length of a dotted form abbreviation at the start of `raw`.
fn leading_form_prefix(raw: &str) -> Option<usize> {
    GLUED_FORM_PREFIXES
        .iter()
        .find(|p| raw.get(..p.len()).is_some_and(|head| head.eq_ignore_ascii_case(p)))
        .map(|p| p.len())
}

/// Push a raw word, splitting glued form prefixes and glued strengths.
fn split_word(raw: &str, tokens: &mut Vec<Token>) {
    // "1.Tab.Metformin": the list number is dropped when a form follows it.
    if let Some(marker) = RE_LIST_MARKER.find(raw) {
        let rest = &raw[marker.end()..];
        if leading_form_prefix(rest).is_some() || match_form(&rest.to_lowercase()).is_some() {
            split_word(rest, tokens);
            return;
        }
    }

    if let Some(len) = leading_form_prefix(raw).filter(|&len| raw.len() > len) {
        let (form, rest) = raw.split_at(len);
        tokens.push(Token::word(form));
        split_word(rest, tokens);
        return;
    }

    if let Some(caps) = RE_GLUED_STRENGTH.captures(raw) {
        let number = &caps[1];
        let unit = &caps[2];
        if match_unit(&unit.to_lowercase()).is_some() {
            tokens.push(Token::word(number));
            tokens.push(Token::word(unit));
            return;
        }
    }

    tokens.push(Token::word(raw));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn splits_on_whitespace_and_separators() {
        let tokens = tokenize_line("Tab. Metformin, 500 mg;  Twice daily");
        assert_eq!(
            texts(&tokens),
            vec!["Tab.", "Metformin", "500", "mg", "Twice", "daily"]
        );
    }

    #[test]
    fn parenthesized_text_becomes_one_aside() {
        let tokens = tokenize_line("Inj. Insulin Glargine (Lantus Solostar) 100 IU/ml");
        assert_eq!(tokens[3].kind, TokenKind::Aside);
        assert_eq!(tokens[3].text, "Lantus Solostar");
        assert_eq!(tokens[4].text, "100");
        assert_eq!(tokens[5].text, "IU/ml");
    }

    #[test]
    fn unclosed_aside_runs_to_end_of_line() {
        let tokens = tokenize_line("Tab. Foo (bar baz");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::Aside);
        assert_eq!(tokens[2].text, "bar baz");
    }

    #[test]
    fn glued_form_prefix_is_split() {
        let tokens = tokenize_line("Tab.Metformin");
        assert_eq!(texts(&tokens), vec!["Tab.", "Metformin"]);
    }

    #[test]
    fn glued_strength_is_split_only_for_known_units() {
        let tokens = tokenize_line("500mg 2.5ml 10x");
        assert_eq!(texts(&tokens), vec!["500", "mg", "2.5", "ml", "10x"]);
    }

    #[test]
    fn glued_strength_with_sentence_period() {
        let tokens = tokenize_line("500mg. 2.5ml.");
        assert_eq!(texts(&tokens), vec!["500", "mg", "2.5", "ml"]);
    }

    #[test]
    fn list_number_before_form_is_dropped() {
        assert_eq!(
            texts(&tokenize_line("1.Tab.Metformin")),
            vec!["Tab.", "Metformin"]
        );
        assert_eq!(texts(&tokenize_line("12.Syrup")), vec!["Syrup"]);
        // Decimal strengths are not list numbers.
        assert_eq!(texts(&tokenize_line("2.5ml")), vec!["2.5", "ml"]);
        assert_eq!(texts(&tokenize_line("3.Metformin")), vec!["3.Metformin"]);
    }

    #[test]
    fn alphanumeric_prefix_of_hyphenated_word() {
        let tokens = tokenize_line("Glycomet-GP --- (Lantus)");
        assert_eq!(tokens[0].alphanumeric_prefix(), Some("Glycomet"));
        assert_eq!(tokens[1].alphanumeric_prefix(), None);
        assert_eq!(tokens[2].alphanumeric_prefix(), None);
    }

    #[test]
    fn empty_and_blank_lines_yield_no_tokens() {
        assert!(tokenize_line("").is_empty());
        assert!(tokenize_line("   \t ").is_empty());
    }

    #[test]
    fn word_classification() {
        let tokens = tokenize_line("B12 500 --- daily.");
        assert!(tokens[0].is_alphanumeric_word());
        assert!(tokens[1].is_number());
        assert!(!tokens[2].is_alphanumeric_word());
        assert_eq!(tokens[3].phrase_key(), "daily");
    }
}
