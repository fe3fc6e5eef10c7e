use std::collections::HashMap;
use std::io;

use citespan_core::{
    Citation, Confidence, DedupStats, Document, DuplicateLink, MatchKind, RecordCitations,
    ResolveStats, ResolvedSpan,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonInput {
    #[serde(default)]
    pub(crate) subject_id: Option<String>,
    pub(crate) documents: Vec<JsonDocument>,
    #[serde(default)]
    pub(crate) citations: Vec<JsonCitation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonDocument {
    pub(crate) record_id: String,
    #[serde(default)]
    pub(crate) date: String,
    #[serde(rename = "type", default)]
    pub(crate) kind: String,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonCitation {
    pub(crate) record_id: String,
    pub(crate) question_id: u32,
    pub(crate) quoted_text: String,
    #[serde(default)]
    pub(crate) confidence: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSpan {
    pub(crate) record_id: String,
    pub(crate) question_id: u32,
    pub(crate) start_char: usize,
    pub(crate) end_char: usize,
    pub(crate) confidence: &'static str,
    pub(crate) match_index: usize,
    #[serde(rename = "match")]
    pub(crate) match_kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) similarity: Option<f64>,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonDuplicateLink {
    pub(crate) record_id: String,
    pub(crate) was_at: usize,
    pub(crate) size: usize,
    pub(crate) duplicate_of: String,
    pub(crate) offset_start: usize,
    pub(crate) offset_end: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) subject_id: Option<String>,
    pub(crate) spans: Vec<JsonSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) documents: Option<Vec<JsonDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) duplicate_links: Option<Vec<JsonDuplicateLink>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonResolveStats {
    pub(crate) citations: u64,
    pub(crate) exact_matches: u64,
    pub(crate) approximate_matches: u64,
    pub(crate) not_found: u64,
    pub(crate) degenerate: u64,
    pub(crate) empty: u64,
    pub(crate) records_missing: u64,
}

impl From<ResolveStats> for JsonResolveStats {
    fn from(stats: ResolveStats) -> Self {
        Self {
            citations: stats.citations,
            exact_matches: stats.exact_matches,
            approximate_matches: stats.approximate_matches,
            not_found: stats.not_found,
            degenerate: stats.degenerate,
            empty: stats.empty,
            records_missing: stats.records_missing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonDedupStats {
    pub(crate) documents: u64,
    pub(crate) exact_duplicates_dropped: u64,
    pub(crate) documents_edited: u64,
    pub(crate) blocks: u64,
    pub(crate) bytes_removed: u64,
}

impl From<DedupStats> for JsonDedupStats {
    fn from(stats: DedupStats) -> Self {
        Self {
            documents: stats.documents,
            exact_duplicates_dropped: stats.exact_duplicates_dropped,
            documents_edited: stats.documents_edited,
            blocks: stats.blocks,
            bytes_removed: stats.bytes_removed,
        }
    }
}

pub(crate) fn read_input(raw: &str) -> io::Result<JsonInput> {
    serde_json::from_str(raw)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("json decode: {e}")))
}

pub(crate) fn map_documents(input: &JsonInput) -> Vec<Document> {
    let subject_id = input.subject_id.clone().unwrap_or_default();
    input
        .documents
        .iter()
        .map(|d| Document {
            record_id: d.record_id.clone(),
            subject_id: subject_id.clone(),
            date: d.date.clone(),
            kind: d.kind.clone(),
            text: d.text.clone(),
        })
        .collect()
}

/// Groups citations by record, records in first-seen order. A missing
/// confidence defaults to `high`.
pub(crate) fn map_citations(citations: &[JsonCitation]) -> io::Result<Vec<RecordCitations>> {
    let mut out: Vec<RecordCitations> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for c in citations {
        let confidence = match c.confidence.as_deref() {
            Some(raw) => raw
                .parse::<Confidence>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            None => Confidence::High,
        };
        let slot = *slots.entry(c.record_id.as_str()).or_insert_with(|| {
            out.push(RecordCitations {
                record_id: c.record_id.clone(),
                citations: Vec::new(),
            });
            out.len() - 1
        });
        out[slot].citations.push(Citation {
            question_id: c.question_id,
            quoted_text: c.quoted_text.clone(),
            confidence,
        });
    }
    Ok(out)
}

pub(crate) fn map_spans(spans: &[ResolvedSpan], documents: &[Document]) -> Vec<JsonSpan> {
    let texts: HashMap<&str, &str> = documents
        .iter()
        .map(|d| (d.record_id.as_str(), d.text.as_str()))
        .collect();

    spans
        .iter()
        .map(|span| {
            let (match_kind, similarity) = match span.kind {
                MatchKind::Exact => ("exact", None),
                MatchKind::Approximate { similarity } => ("approximate", Some(similarity)),
            };
            let text = texts
                .get(span.record_id.as_str())
                .and_then(|text| span.slice(text))
                .unwrap_or_default()
                .to_string();
            JsonSpan {
                record_id: span.record_id.clone(),
                question_id: span.question_id,
                start_char: span.start_char,
                end_char: span.end_char,
                confidence: span.confidence.as_str(),
                match_index: span.match_index,
                match_kind,
                similarity,
                text,
            }
        })
        .collect()
}

pub(crate) fn map_output_documents(documents: &[Document]) -> Vec<JsonDocument> {
    documents
        .iter()
        .map(|d| JsonDocument {
            record_id: d.record_id.clone(),
            date: d.date.clone(),
            kind: d.kind.clone(),
            text: d.text.clone(),
        })
        .collect()
}

pub(crate) fn map_links(links: &[DuplicateLink]) -> Vec<JsonDuplicateLink> {
    links
        .iter()
        .map(|l| JsonDuplicateLink {
            record_id: l.record_id.clone(),
            was_at: l.was_at,
            size: l.size,
            duplicate_of: l.duplicate_of.clone(),
            offset_start: l.offset_start,
            offset_end: l.offset_end,
        })
        .collect()
}

pub(crate) fn write_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::other(format!("json encode: {e}")))?;
    println!("{json}");
    Ok(())
}
