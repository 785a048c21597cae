//! Character tables for sentence boundary decisions
//!
//! Lookups are O(1) with an ASCII fast path.

use std::collections::HashSet;

/// Non-breaking prefixes used when no list is configured
pub const DEFAULT_PREFIXES: &[&str] = &[
    // Titles
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Rev", "Hon", "Gen", "Col", "Capt", "Lt",
    "Sgt", "Gov", "Sen", "Rep", "Pres", "Mt", "Messrs",
    // Latin and common abbreviations
    "e.g", "i.e", "etc", "vs", "cf", "al", "approx", "ca", "viz", "Inc", "Ltd", "Co", "Corp",
    // Months
    "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
    // Places
    "U.S", "U.K", "U.S.A", "Ave", "Blvd", "Rd",
];

/// Prefixes that only suppress a boundary when a number follows
pub const NUMERIC_ONLY_PREFIXES: &[&str] = &["No", "Nos", "Art", "Nr", "pp", "Fig", "Vol"];

/// Fast terminator lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermTable {
    /// ASCII lookup table for chars 0-127
    ascii_table: [bool; 128],
    /// Non-ASCII terminators that still need trailing whitespace
    other: HashSet<char>,
    /// Full-width terminators break without trailing whitespace
    wide: HashSet<char>,
}

impl TermTable {
    /// Create from lists of whitespace-delimited and full-width terminators
    pub fn new(terminators: &[char], wide: &[char]) -> Self {
        let table = Self {
            ascii_table: [false; 128],
            other: HashSet::new(),
            wide: wide.iter().copied().collect(),
        };
        table.with_extra(terminators)
    }

    /// Add whitespace-delimited terminators
    pub fn with_extra(mut self, terminators: &[char]) -> Self {
        for &ch in terminators {
            if ch.is_ascii() {
                self.ascii_table[ch as usize] = true;
            } else {
                self.other.insert(ch);
            }
        }
        self
    }

    /// Check if character terminates a sentence
    #[inline]
    pub fn is_terminator(&self, ch: char) -> bool {
        if ch.is_ascii() {
            self.ascii_table[ch as usize]
        } else {
            self.other.contains(&ch) || self.wide.contains(&ch)
        }
    }

    /// Check if character is a full-width terminator
    #[inline]
    pub fn is_wide(&self, ch: char) -> bool {
        self.wide.contains(&ch)
    }
}

impl Default for TermTable {
    fn default() -> Self {
        Self::new(&['.', '!', '?', '…'], &['。', '！', '？', '｡'])
    }
}

/// Case-insensitive prefix lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    always: HashSet<String>,
    numeric_only: HashSet<String>,
}

impl PrefixTable {
    /// Build from a list of prefixes written without their trailing dot
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            always: prefixes
                .into_iter()
                .map(|prefix| normalize(prefix.as_ref()))
                .filter(|prefix| !prefix.is_empty())
                .collect(),
            numeric_only: NUMERIC_ONLY_PREFIXES.iter().map(|p| normalize(p)).collect(),
        }
    }

    /// Whether `word` (the text before a dot) suppresses a boundary.
    /// `next` is the first character of the following word.
    pub fn suppresses(&self, word: &str, next: char) -> bool {
        let key = normalize(word);
        if self.always.contains(&key) {
            return true;
        }
        next.is_ascii_digit() && self.numeric_only.contains(&key)
    }

    /// Number of configured prefixes
    pub fn len(&self) -> usize {
        self.always.len()
    }

    /// Whether no prefixes are configured
    pub fn is_empty(&self) -> bool {
        self.always.is_empty()
    }
}

fn normalize(prefix: &str) -> String {
    prefix.trim().trim_end_matches('.').to_lowercase()
}

/// Closing quotes and brackets that stay attached to a sentence end
#[inline]
pub fn is_closer(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | ')' | ']' | '}' | '”' | '’' | '»' | '」' | '』' | '）' | '】'
    )
}

/// Opening quotes and brackets that may start a sentence
#[inline]
pub fn is_opener(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '(' | '[' | '{' | '“' | '‘' | '«' | '「' | '『' | '（' | '【' | '¿' | '¡'
    )
}

/// Whether `ch` can begin a new sentence
#[inline]
pub fn is_sentence_start(ch: char) -> bool {
    is_opener(ch) || (ch.is_alphanumeric() && !ch.is_lowercase())
}

/// Full rule set consulted by the splitter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceRules {
    /// Terminator characters
    pub terminators: TermTable,
    /// Non-breaking prefixes
    pub prefixes: PrefixTable,
}

impl SentenceRules {
    /// English defaults
    pub fn english() -> Self {
        Self {
            terminators: TermTable::default(),
            prefixes: PrefixTable::new(DEFAULT_PREFIXES),
        }
    }

    /// Default terminators with a custom prefix list
    pub fn with_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terminators: TermTable::default(),
            prefixes: PrefixTable::new(prefixes),
        }
    }

    /// Also break on `terminators` when whitespace and a sentence start follow
    pub fn with_terminators(mut self, terminators: &[char]) -> Self {
        self.terminators = self.terminators.with_extra(terminators);
        self
    }
}
