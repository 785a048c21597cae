//! Segment splitting
//!
//! Splits a whole document into sentence-level spans. The layout of the
//! document is described by a [`SplitMode`]; sentence boundaries inside a
//! line or paragraph are found with the rules in [`rules`].

pub mod rules;

use crate::error::{CoreError, Result};
use regex::Regex;
use rules::{is_closer, is_opener, is_sentence_start, SentenceRules};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// How the input document is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitMode {
    /// Every line is exactly one sentence
    Sentence,
    /// Every line is a paragraph that may hold several sentences
    #[default]
    Paragraph,
    /// Paragraphs are separated by blank lines; single line breaks are wrapping
    WrappedText,
}

impl SplitMode {
    /// Configuration name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Sentence => "sentence",
            SplitMode::Paragraph => "paragraph",
            SplitMode::WrappedText => "wrapped_text",
        }
    }
}

impl FromStr for SplitMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sentence" => Ok(SplitMode::Sentence),
            "paragraph" => Ok(SplitMode::Paragraph),
            "wrapped_text" => Ok(SplitMode::WrappedText),
            _ => Err(CoreError::UnknownSplitMode(s.to_string())),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn paragraph_break() -> &'static Regex {
    static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
    PARAGRAPH_BREAK.get_or_init(|| {
        Regex::new(r"\r?\n[ \t\r]*\n").expect("paragraph break pattern is valid")
    })
}

/// Sentence splitter with a shared rule set
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    rules: Arc<SentenceRules>,
}

impl PartialEq for SentenceSplitter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rules, &other.rules) || self.rules == other.rules
    }
}

impl Eq for SentenceSplitter {}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSplitter {
    /// Splitter with English non-breaking prefixes
    pub fn new() -> Self {
        Self::with_rules(SentenceRules::english())
    }

    /// Splitter with a custom non-breaking prefix list
    pub fn with_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_rules(SentenceRules::with_prefixes(prefixes))
    }

    /// Splitter over an explicit rule set
    pub fn with_rules(rules: SentenceRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Rules in use
    pub fn rules(&self) -> &SentenceRules {
        &self.rules
    }

    /// Lazily split `text` into segment spans.
    ///
    /// The returned stream is `Clone`; cloning it before iterating restarts
    /// the split from the same position.
    pub fn segments<'a>(&'a self, text: &'a str, mode: SplitMode) -> SegmentStream<'a> {
        SegmentStream {
            text,
            rules: &self.rules,
            mode,
            cursor: 0,
            block: None,
        }
    }
}

/// Iterator over segment spans of a document
#[derive(Debug, Clone)]
pub struct SegmentStream<'a> {
    text: &'a str,
    rules: &'a SentenceRules,
    mode: SplitMode,
    /// Start of the next line or paragraph; past the end once exhausted
    cursor: usize,
    /// Remaining part of the line or paragraph being sentence-split
    block: Option<Range<usize>>,
}

impl SegmentStream<'_> {
    fn next_block(&mut self) -> Option<Range<usize>> {
        if self.cursor > self.text.len() {
            return None;
        }
        let start = self.cursor;
        let block = match self.mode {
            SplitMode::Sentence | SplitMode::Paragraph => match self.text[start..].find('\n') {
                Some(offset) => {
                    self.cursor = start + offset + 1;
                    start..start + offset
                }
                None => {
                    self.cursor = self.text.len() + 1;
                    start..self.text.len()
                }
            },
            SplitMode::WrappedText => match paragraph_break().find_at(self.text, start) {
                Some(found) => {
                    self.cursor = found.end();
                    start..found.start()
                }
                None => {
                    self.cursor = self.text.len() + 1;
                    start..self.text.len()
                }
            },
        };
        Some(block)
    }

    /// Take the next sentence from the current block
    fn next_sentence(&mut self, block: Range<usize>) -> Option<Range<usize>> {
        let start = skip_whitespace(self.text, block.start, block.end);
        if start >= block.end {
            return None;
        }

        match find_boundary(self.text, self.rules, start, block.end) {
            Some((end, next)) => {
                self.block = Some(next..block.end);
                Some(start..end)
            }
            None => {
                self.block = None;
                Some(start..trim_end(self.text, start, block.end))
            }
        }
    }
}

impl Iterator for SegmentStream<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(block) = self.block.take() {
                if let Some(span) = self.next_sentence(block) {
                    return Some(span);
                }
                continue;
            }

            let block = self.next_block()?;
            match self.mode {
                SplitMode::Sentence => {
                    let start = skip_whitespace(self.text, block.start, block.end);
                    return Some(start..trim_end(self.text, start, block.end));
                }
                SplitMode::Paragraph | SplitMode::WrappedText => {
                    self.block = Some(block);
                }
            }
        }
    }
}

fn skip_whitespace(text: &str, from: usize, to: usize) -> usize {
    text[from..to]
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map_or(to, |(offset, _)| from + offset)
}

fn trim_end(text: &str, from: usize, to: usize) -> usize {
    from + text[from..to].trim_end().len()
}

/// Find the first sentence boundary in `text[start..end]`.
///
/// Returns the end of the sentence (after terminators and closing marks) and
/// the start of the following one.
fn find_boundary(
    text: &str,
    rules: &SentenceRules,
    start: usize,
    end: usize,
) -> Option<(usize, usize)> {
    let region = &text[start..end];
    let mut chars = region.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if !rules.terminators.is_terminator(ch) {
            continue;
        }

        let run_start = start + offset;
        let mut wide = rules.terminators.is_wide(ch);
        let mut run_len = 1;
        let mut sentence_end = run_start + ch.len_utf8();

        while let Some(&(next_offset, next)) = chars.peek() {
            if rules.terminators.is_terminator(next) {
                wide |= rules.terminators.is_wide(next);
                run_len += 1;
            } else if !is_closer(next) {
                break;
            }
            sentence_end = start + next_offset + next.len_utf8();
            chars.next();
        }

        if sentence_end >= end {
            return None;
        }

        let next_start = skip_whitespace(text, sentence_end, end);
        if next_start >= end {
            return None;
        }

        if wide {
            return Some((sentence_end, next_start));
        }

        // ASCII terminators need whitespace before the next sentence
        if next_start == sentence_end {
            continue;
        }

        let Some(next_char) = text[next_start..].chars().next() else {
            return None;
        };
        if !is_sentence_start(next_char) {
            continue;
        }

        if run_len == 1 && text[run_start..].starts_with('.') {
            let word = word_before(text, start, run_start);
            if is_initial(word) || rules.prefixes.suppresses(word, next_char) {
                continue;
            }
        }

        return Some((sentence_end, next_start));
    }

    None
}

/// Word immediately before a dot, without leading openers
fn word_before(text: &str, floor: usize, dot: usize) -> &str {
    let word_start = text[floor..dot]
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace())
        .map_or(floor, |(offset, ch)| floor + offset + ch.len_utf8());
    text[word_start..dot].trim_start_matches(is_opener)
}

fn is_initial(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_uppercase())
}
