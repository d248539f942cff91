//! # Text Wrapping
//!
//! Character-budget line breaking for text boxes. Everything here counts
//! `char`s, never bytes, so Cyrillic or CJK text wraps at the same column
//! as ASCII.
//!
//! The default tokenizer keeps a word glued to a single trailing delimiter
//! (plus one optional space) when that delimiter is not itself followed by
//! another delimiter. That way `"a. b. c"` breaks after `"a."`, never
//! between `"a"` and `"."`. A custom [`WordPattern`] replaces it with a
//! regex whose matches are the tokens.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, TrellisError};

/// How text is split into atomic tokens before packing.
#[derive(Debug, Clone, Default)]
pub enum WordPattern {
    /// Word + one glued delimiter + optional space, else a word run, else
    /// a single delimiter.
    #[default]
    Default,
    /// Every match of the regex is one token.
    Regex(Regex),
}

impl WordPattern {
    /// Compile a custom pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(WordPattern::Regex)
            .map_err(|e| TrellisError::InvalidParameter {
                name: "word_pattern".to_string(),
                expected: "a valid regular expression",
                found: e.to_string(),
            })
    }

    /// Split `text` into tokens.
    pub fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            WordPattern::Default => default_tokens(text),
            WordPattern::Regex(re) => re.find_iter(text).map(|m| m.as_str()).collect(),
        }
    }
}

fn word_char_regex() -> Option<&'static Regex> {
    static WORD: OnceLock<Option<Regex>> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"^\w$").ok()).as_ref()
}

/// Unicode `\w`: letters, combining marks, digits and connector
/// punctuation, so an accent written as a separate code point stays in
/// its word.
fn is_word_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    match word_char_regex() {
        Some(word) => word.is_match(c.encode_utf8(&mut buf)),
        None => c.is_alphanumeric() || c == '_',
    }
}

fn default_tokens(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = chars.len();
    let byte_at = |k: usize| if k < len { chars[k].0 } else { text.len() };
    let is_delim_at = |k: usize| k < len && !is_word_char(chars[k].1);

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < len {
        let start = chars[i].0;

        if !is_word_char(chars[i].1) {
            tokens.push(&text[start..byte_at(i + 1)]);
            i += 1;
            continue;
        }

        let mut end = i;
        while end < len && is_word_char(chars[end].1) {
            end += 1;
        }

        // chars[end] is a delimiter; glue it (and one space) when the
        // next char is not another delimiter.
        if end < len {
            let after = end + 1;
            if after < len && chars[after].1.is_whitespace() && !is_delim_at(after + 1) {
                end = after + 1;
            } else if !is_delim_at(after) {
                end = after;
            }
        }

        tokens.push(&text[start..byte_at(end)]);
        i = end;
    }
    tokens
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedily pack tokens into lines of at most `maxlen` chars.
///
/// A token whose trimmed length exceeds `maxlen` is force-split into
/// `maxlen`-sized chunks. A budget of zero is treated as one.
pub fn word_wrap(text: &str, maxlen: usize, pattern: &WordPattern) -> Vec<String> {
    let maxlen = maxlen.max(1);
    let mut lines = vec![String::new()];

    for word in pattern.tokens(text) {
        let word_len = word.trim_end().chars().count();
        let last_len = lines.last().map(|l| l.chars().count()).unwrap_or(0);

        if word_len > maxlen {
            lines.extend(chunk_chars(word, maxlen));
        } else if last_len != 0 && last_len + word_len > maxlen {
            lines.push(word.to_string());
        } else if let Some(last) = lines.last_mut() {
            last.push_str(word);
        }
    }

    lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.trim().to_string())
        .collect()
}

fn chunk_chars(word: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// Cut `text` to `maxlen` chars, the last of which are `trailer`.
///
/// A no-op when the text already fits. Fails when the budget is smaller
/// than the trailer itself.
pub fn truncate(text: &str, maxlen: usize, trailer: &str) -> Result<String> {
    if text.chars().count() <= maxlen {
        return Ok(text.to_string());
    }

    let trailer_len = trailer.chars().count();
    if maxlen < trailer_len {
        return Err(TrellisError::TruncationImpossible {
            maxlen,
            trailer: trailer.to_string(),
        });
    }

    let mut out: String = text.chars().take(maxlen - trailer_len).collect();
    out.push_str(trailer);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, maxlen: usize) -> Vec<String> {
        word_wrap(text, maxlen, &WordPattern::Default)
    }

    fn wrap_with(text: &str, maxlen: usize, pattern: &str) -> Vec<String> {
        word_wrap(text, maxlen, &WordPattern::new(pattern).unwrap())
    }

    #[test]
    fn test_truncate_noop_when_fits() {
        assert_eq!(truncate("1234567890", 10, "...").unwrap(), "1234567890");
    }

    #[test]
    fn test_truncate_appends_trailer() {
        assert_eq!(truncate("1234567890", 5, "...").unwrap(), "12...");
    }

    #[test]
    fn test_truncate_budget_smaller_than_trailer() {
        assert!(matches!(
            truncate("1234567890", 2, "..."),
            Err(TrellisError::TruncationImpossible { maxlen: 2, .. })
        ));
    }

    #[test]
    fn test_truncate_counts_chars() {
        let out = truncate("абвгдежз", 6, "…").unwrap();
        assert_eq!(out, "абвгд…");
        assert_eq!(out.chars().count(), 6);
    }

    #[test]
    fn test_delimiter_glued_to_word() {
        assert_eq!(wrap("a. b. c", 4), vec!["a.", "b. c"]);
        assert_eq!(wrap("a. b. c", 5), vec!["a. b.", "c"]);
        assert_eq!(wrap("a.b...c", 5), vec!["a.b..", ".c"]);
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(wrap("а. бв. г", 4), vec!["а.", "бв.", "г"]);
        assert_eq!(wrap("а. бв. г", 5), vec!["а.", "бв. г"]);
        assert_eq!(wrap("а.бв...г", 5), vec!["а.бв.", "..г"]);
    }

    #[test]
    fn test_custom_word_pattern() {
        assert_eq!(wrap_with("a. b. c", 4, "."), vec!["a. b", ". c"]);
        assert_eq!(wrap_with("a. b. c", 5, "."), vec!["a. b.", "c"]);
        assert_eq!(wrap_with("a.b...c", 5, "."), vec!["a.b..", ".c"]);
    }

    #[test]
    fn test_long_word_force_split() {
        assert_eq!(
            wrap("a. b. c. defghijklmnop", 5),
            vec!["a. b.", "c.", "defgh", "ijklm", "nop"]
        );
    }

    #[test]
    fn test_lines_respect_budget_and_keep_token_order() {
        let text = "The quick brown fox jumps over the lazy dog. Again, and again!";
        for width in 1..20 {
            let lines = wrap(text, width);
            for line in &lines {
                assert!(line.chars().count() <= width, "{line:?} > {width}");
            }
            let joined: String = lines.concat().chars().filter(|c| !c.is_whitespace()).collect();
            let expected: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(joined, expected);
        }
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn test_default_tokens() {
        assert_eq!(default_tokens("hello world"), vec!["hello ", "world"]);
        assert_eq!(default_tokens("a.b...c"), vec!["a.", "b", ".", ".", ".", "c"]);
        assert_eq!(default_tokens("end."), vec!["end."]);
    }

    #[test]
    fn test_combining_marks_stay_in_their_word() {
        assert_eq!(
            default_tokens("cafe\u{301}s ok"),
            vec!["cafe\u{301}s ", "ok"]
        );
        assert!(is_word_char('\u{301}'));
        assert!(is_word_char('\u{203F}'));
        assert!(!is_word_char('-'));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  foo \n\t bar  baz "), "foo bar baz");
    }

    #[test]
    fn test_bad_pattern_rejected() {
        assert!(matches!(
            WordPattern::new("("),
            Err(TrellisError::InvalidParameter { .. })
        ));
    }
}
