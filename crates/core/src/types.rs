use std::fmt;
use std::str::FromStr;

use crate::error::OptionsError;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;
pub const DEFAULT_MIN_FUZZY_LEN: usize = 10;
pub const DEFAULT_MIN_BLOCK_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const LOWEST: Confidence = Confidence::Low;

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence: {other}")),
        }
    }
}

/// One clinical record of a subject.
///
/// `text` is only rewritten by the batch redundancy pass; everything else is
/// identity and ordering metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub record_id: String,
    pub subject_id: String,
    /// ISO `YYYY-MM-DD`; lexicographic order is chronological order.
    pub date: String,
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub question_id: u32,
    pub quoted_text: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Approximate { similarity: f64 },
}

impl MatchKind {
    pub fn is_exact(self) -> bool {
        matches!(self, MatchKind::Exact)
    }
}

/// A citation pinned to a byte range of its record's text.
///
/// `start_char..end_char` is always a non-empty range on `char` boundaries of
/// the text the span was resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSpan {
    pub record_id: String,
    pub question_id: u32,
    pub start_char: usize,
    pub end_char: usize,
    pub confidence: Confidence,
    pub match_index: usize,
    pub kind: MatchKind,
}

impl ResolvedSpan {
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start_char..self.end_char)
    }
}

/// Text removed from `record_id` because it repeats `duplicate_of`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateLink {
    pub record_id: String,
    /// Offset in the edited text of `record_id` where the removed bytes sat.
    pub was_at: usize,
    pub size: usize,
    pub duplicate_of: String,
    pub offset_start: usize,
    pub offset_end: usize,
}

/// Citations the extraction layer produced for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCitations {
    pub record_id: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub similarity_threshold: f64,
    /// Patterns shorter than this many characters never go to fuzzy search.
    pub min_fuzzy_len: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_fuzzy_len: DEFAULT_MIN_FUZZY_LEN,
        }
    }
}

impl ResolveOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.similarity_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(OptionsError::SimilarityThreshold(self.similarity_threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DedupOptions {
    /// Minimum block size in bytes.
    pub min_block_len: usize,
    /// Off by default: a dropped record can no longer receive citations.
    pub drop_exact_duplicates: bool,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            min_block_len: DEFAULT_MIN_BLOCK_LEN,
            drop_exact_duplicates: false,
        }
    }
}

impl DedupOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.min_block_len == 0 {
            return Err(OptionsError::MinBlockLen);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolveStats {
    pub citations: u64,
    pub exact_matches: u64,
    pub approximate_matches: u64,
    pub not_found: u64,
    pub degenerate: u64,
    pub empty: u64,
    pub records_missing: u64,
}

impl ResolveStats {
    pub fn unresolved(&self) -> u64 {
        self.not_found + self.degenerate + self.empty
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DedupStats {
    pub documents: u64,
    pub exact_duplicates_dropped: u64,
    pub documents_edited: u64,
    pub blocks: u64,
    pub bytes_removed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T, S> {
    pub result: T,
    pub stats: S,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupResult {
    pub documents: Vec<Document>,
    pub links: Vec<DuplicateLink>,
}
