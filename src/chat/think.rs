//! `<think>` block handling for full and streamed replies

use once_cell::sync::Lazy;
use regex::Regex;

const OPEN_TAG: &str = "<think>";
const CLOSE_TAG: &str = "</think>";

/// Matches a complete `<think>...</think>` block, across lines
static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("think block pattern"));

/// Reply with any `<think>` block split out
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub thinking: Option<String>,
    pub response: String,
}

/// Separate thinking from the answer in a complete reply.
///
/// An opening tag with no close means the model never got past thinking, so
/// the answer is empty.
pub fn parse_think_tags(content: &str) -> ParsedReply {
    if let Some(caps) = THINK_BLOCK.captures(content) {
        let thinking = caps.get(1).map(|m| m.as_str().trim().to_string());
        let response = THINK_BLOCK.replace_all(content, "").trim().to_string();
        return ParsedReply { thinking, response };
    }

    match content.trim_start().strip_prefix(OPEN_TAG) {
        Some(rest) => ParsedReply {
            thinking: Some(rest.trim().to_string()),
            response: String::new(),
        },
        None => ParsedReply {
            thinking: None,
            response: content.trim().to_string(),
        },
    }
}

/// A run of streamed text, classified by whether it sat inside `<think>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Answer(String),
    Thinking(String),
}

/// Splits streamed tokens into answer and thinking text as they arrive.
///
/// Tags may be cut across tokens, so a trailing fragment that could still
/// become a tag is held back until the next token decides it.
#[derive(Debug, Default)]
pub struct ThinkFilter {
    pending: String,
    inside: bool,
}

impl ThinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: &str) -> Vec<Segment> {
        self.pending.push_str(token);
        let mut out = Vec::new();

        loop {
            let tag = if self.inside { CLOSE_TAG } else { OPEN_TAG };
            match self.pending.find(tag) {
                Some(pos) => {
                    let before: String = self.pending.drain(..pos).collect();
                    self.pending.drain(..tag.len());
                    self.emit(&mut out, before);
                    self.inside = !self.inside;
                }
                None => {
                    let keep = partial_tag_suffix(&self.pending, tag);
                    let split = self.pending.len() - keep;
                    let ready: String = self.pending.drain(..split).collect();
                    self.emit(&mut out, ready);
                    return out;
                }
            }
        }
    }

    /// Flush whatever was held back once the stream ends.
    pub fn finish(&mut self) -> Vec<Segment> {
        let rest = std::mem::take(&mut self.pending);
        let mut out = Vec::new();
        self.emit(&mut out, rest);
        out
    }

    fn emit(&self, out: &mut Vec<Segment>, text: String) {
        if text.is_empty() {
            return;
        }
        out.push(if self.inside {
            Segment::Thinking(text)
        } else {
            Segment::Answer(text)
        });
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of `tag`.
fn partial_tag_suffix(text: &str, tag: &str) -> usize {
    (1..tag.len())
        .rev()
        .find(|&n| text.ends_with(&tag[..n]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(tokens: &[&str]) -> (String, String) {
        let mut filter = ThinkFilter::new();
        let mut segments = Vec::new();
        for token in tokens {
            segments.extend(filter.push(token));
        }
        segments.extend(filter.finish());

        let mut answer = String::new();
        let mut thinking = String::new();
        for segment in segments {
            match segment {
                Segment::Answer(s) => answer.push_str(&s),
                Segment::Thinking(s) => thinking.push_str(&s),
            }
        }
        (answer, thinking)
    }

    #[test]
    fn test_parse_think_tags() {
        let parsed = parse_think_tags("<think>hmm, tricky</think>\nJust use a Vec.");
        assert_eq!(parsed.thinking.as_deref(), Some("hmm, tricky"));
        assert_eq!(parsed.response, "Just use a Vec.");

        let plain = parse_think_tags("  no tags here ");
        assert_eq!(plain.thinking, None);
        assert_eq!(plain.response, "no tags here");

        let unterminated = parse_think_tags("<think>still going");
        assert_eq!(unterminated.thinking.as_deref(), Some("still going"));
        assert_eq!(unterminated.response, "");
    }

    #[test]
    fn test_parse_think_tags_multiline() {
        let parsed = parse_think_tags("<think>line one\nline two</think>Answer.");
        assert_eq!(parsed.thinking.as_deref(), Some("line one\nline two"));
        assert_eq!(parsed.response, "Answer.");
    }

    #[test]
    fn test_filter_plain_tokens_pass_through() {
        assert_eq!(
            collect(&["Hello", ", ", "world"]),
            ("Hello, world".to_string(), String::new())
        );
    }

    #[test]
    fn test_filter_tags_split_across_tokens() {
        let (answer, thinking) = collect(&["<thi", "nk>plan", " it</th", "ink>", "Do X."]);
        assert_eq!(answer, "Do X.");
        assert_eq!(thinking, "plan it");
    }

    #[test]
    fn test_filter_holds_back_only_possible_tags() {
        let mut filter = ThinkFilter::new();
        assert_eq!(filter.push("a < b"), vec![Segment::Answer("a < b".to_string())]);
        assert_eq!(filter.push("x <th"), vec![Segment::Answer("x ".to_string())]);
        assert_eq!(filter.push("ree"), vec![Segment::Answer("<three".to_string())]);
    }

    #[test]
    fn test_filter_unterminated_think_stays_hidden() {
        let (answer, thinking) = collect(&["<think>", "never closes"]);
        assert_eq!(answer, "");
        assert_eq!(thinking, "never closes");
    }

    #[test]
    fn test_partial_tag_suffix() {
        assert_eq!(partial_tag_suffix("abc<", OPEN_TAG), 1);
        assert_eq!(partial_tag_suffix("abc<thin", OPEN_TAG), 5);
        assert_eq!(partial_tag_suffix("abc", OPEN_TAG), 0);
        assert_eq!(partial_tag_suffix("x</", CLOSE_TAG), 2);
    }
}
