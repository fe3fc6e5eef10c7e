use citespan_core::{DedupStats, ResolveStats};

use crate::json::{JsonDuplicateLink, JsonReport, JsonSpan};

const PREVIEW_CHARS: usize = 80;

fn preview(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}...")
}

pub(crate) fn format_resolve_stats(stats: &ResolveStats) -> String {
    let mut out = String::new();
    out.push_str("== resolve stats ==\n");
    out.push_str(&format!(
        "citations={} exact={} approximate={}\n",
        stats.citations, stats.exact_matches, stats.approximate_matches
    ));

    let mut misses: Vec<(&str, u64)> = vec![
        ("not_found", stats.not_found),
        ("degenerate", stats.degenerate),
        ("empty", stats.empty),
        ("records_missing", stats.records_missing),
    ];
    misses.retain(|(_, v)| *v > 0);
    if !misses.is_empty() {
        out.push_str("unresolved:\n");
        for (k, v) in misses {
            out.push_str(&format!("- {k}={v}\n"));
        }
    }
    out.push('\n');
    out
}

pub(crate) fn format_dedup_stats(stats: &DedupStats) -> String {
    let mut out = String::new();
    out.push_str("== dedupe stats ==\n");
    out.push_str(&format!(
        "documents={} exact_duplicates_dropped={} edited={} blocks={} bytes_removed={}\n",
        stats.documents,
        stats.exact_duplicates_dropped,
        stats.documents_edited,
        stats.blocks,
        stats.bytes_removed
    ));
    out.push('\n');
    out
}

fn format_spans(spans: &[JsonSpan]) -> String {
    let mut out = String::new();
    out.push_str(&format!("spans: {}\n", spans.len()));

    for span in spans {
        out.push('\n');
        let similarity = span
            .similarity
            .map(|s| format!(" similarity={s:.3}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "[{}] q{} {}..{} {} #{} confidence={}{}\n",
            span.record_id,
            span.question_id,
            span.start_char,
            span.end_char,
            span.match_kind,
            span.match_index,
            span.confidence,
            similarity
        ));
        out.push_str(&format!("text={}\n", preview(&span.text)));
    }

    out.push('\n');
    out
}

fn format_links(links: &[JsonDuplicateLink]) -> String {
    let mut out = String::new();
    out.push_str(&format!("duplicate links: {}\n", links.len()));
    for link in links {
        out.push_str(&format!(
            "- [{}] @{} size={} <- [{}] {}..{}\n",
            link.record_id,
            link.was_at,
            link.size,
            link.duplicate_of,
            link.offset_start,
            link.offset_end
        ));
    }
    out.push('\n');
    out
}

pub(crate) fn format_text_report(report: &JsonReport) -> String {
    let mut out = String::new();
    if let Some(subject_id) = &report.subject_id {
        out.push_str(&format!("subject: {subject_id}\n\n"));
    }
    if let Some(links) = &report.duplicate_links {
        out.push_str(&format_links(links));
    }
    out.push_str(&format_spans(&report.spans));
    out
}
