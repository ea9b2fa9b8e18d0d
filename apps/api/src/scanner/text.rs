//! Text normalization shared by every extraction pass.
//!
//! Lowercases, drops punctuation and collapses whitespace, while keeping the
//! characters that carry meaning in technical terms (`c++`, `c#`, `node.js`, `.net`).

/// A single token of input text.
///
/// `raw` keeps the original casing so strict-case vocabulary terms (`Go`, `R`)
/// can be told apart from ordinary English words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub norm: String,
}

/// Words ignored when comparing titles and role headlines.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "of", "on", "or",
    "our", "the", "to", "we", "with", "you", "your", "job", "role", "position", "hiring",
    "seeking", "looking", "wanted", "opening", "description",
];

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '&')
}

/// Splits text into normalized tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars().chain(std::iter::once(' ')) {
        if is_token_char(c) {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            if let Some(token) = finish_token(&current) {
                tokens.push(token);
            }
            current.clear();
        }
    }

    tokens
}

fn finish_token(candidate: &str) -> Option<Token> {
    let mut trimmed = candidate.trim_matches('&').trim_end_matches(['.', '&']);
    // One leading dot is part of the term (".net"); an ellipsis is not.
    if trimmed.starts_with("..") {
        trimmed = trimmed.trim_start_matches(['.', '&']);
    }
    if !trimmed.chars().any(char::is_alphanumeric) {
        return None;
    }
    Some(Token {
        raw: trimmed.to_string(),
        norm: trimmed.to_lowercase(),
    })
}

/// Normalized form of `text`: lowercase tokens joined by single spaces.
pub fn normalize(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|t| t.norm)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokens worth comparing between a job title and a resume headline.
pub fn content_tokens(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in tokenize(text) {
        if is_stopword(&token.norm) || token.norm.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !seen.contains(&token.norm) {
            seen.push(token.norm);
        }
    }
    seen
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
