
use std::collections::HashMap;

use crate::error::ResolveError;
use crate::normalize::{NormalizedText, fold_chars, normalize};
use crate::observe::{MatchEvent, MatchObserver, TracingObserver};
use crate::search::{find_from, fuzzy_find_from};
use crate::types::{
    Citation, Confidence, Document, MatchKind, Outcome, RecordCitations, ResolveOptions,
    ResolveStats, ResolvedSpan,
};

/// A document normalized and case-folded once, ready for many citations.
#[derive(Debug, Clone)]
pub struct PreparedDocument<'d> {
    record_id: &'d str,
    text: &'d str,
    normalized: NormalizedText,
    folded: Vec<char>,
}

impl<'d> PreparedDocument<'d> {
    pub fn new(document: &'d Document) -> Self {
        let normalized = normalize(&document.text);
        let folded = normalized.folded();
        Self {
            record_id: &document.record_id,
            text: &document.text,
            normalized,
            folded,
        }
    }

    pub fn record_id(&self) -> &'d str {
        self.record_id
    }

    pub fn text(&self) -> &'d str {
        self.text
    }
}

#[derive(Debug, Clone, Copy)]
struct Located {
    start: usize,
    end: usize,
    kind: MatchKind,
}

/// Turns quoted excerpts into byte spans of the source text.
///
/// Resolution is read-only over the document, so one resolver and one
/// `PreparedDocument` can be shared across threads.
#[derive(Debug, Clone)]
pub struct SpanResolver<O = TracingObserver> {
    options: ResolveOptions,
    observer: O,
}

impl SpanResolver<TracingObserver> {
    pub fn new(options: ResolveOptions) -> Self {
        Self::with_observer(options, TracingObserver)
    }
}

impl Default for SpanResolver<TracingObserver> {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

impl<O: MatchObserver> SpanResolver<O> {
    pub fn with_observer(options: ResolveOptions, observer: O) -> Self {
        Self { options, observer }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn prepare<'d>(&self, document: &'d Document) -> PreparedDocument<'d> {
        PreparedDocument::new(document)
    }

    pub fn resolve(&self, citation: &Citation, document: &Document) -> Option<ResolvedSpan> {
        self.resolve_prepared(citation, &self.prepare(document))
    }

    pub fn resolve_prepared(
        &self,
        citation: &Citation,
        document: &PreparedDocument<'_>,
    ) -> Option<ResolvedSpan> {
        match self.try_resolve_prepared(citation, document) {
            Ok(span) => Some(span),
            Err(err) => {
                self.report(&err, citation, document.record_id);
                None
            }
        }
    }

    pub fn try_resolve(
        &self,
        citation: &Citation,
        document: &Document,
    ) -> Result<ResolvedSpan, ResolveError> {
        self.try_resolve_prepared(citation, &self.prepare(document))
    }

    /// Exact search first, then the first window above the similarity
    /// threshold. Only the earliest occurrence is returned.
    pub fn try_resolve_prepared(
        &self,
        citation: &Citation,
        document: &PreparedDocument<'_>,
    ) -> Result<ResolvedSpan, ResolveError> {
        let pattern = prepare_pattern(citation).ok_or(ResolveError::EmptyInput)?;
        let located =
            self.locate(&pattern, document, 0)
                .ok_or_else(|| ResolveError::NoMatch {
                    record_id: document.record_id.to_string(),
                })?;
        self.finish(citation, document, located, 0)
    }

    /// Every non-overlapping occurrence, left to right, numbered by
    /// `match_index`. Exact hits are taken while they last; after that one
    /// approximate hit at a time is tried on the rest of the text.
    pub fn resolve_all(&self, citation: &Citation, document: &Document) -> Vec<ResolvedSpan> {
        self.resolve_all_prepared(citation, &self.prepare(document))
    }

    pub fn resolve_all_prepared(
        &self,
        citation: &Citation,
        document: &PreparedDocument<'_>,
    ) -> Vec<ResolvedSpan> {
        self.try_resolve_all_prepared(citation, document)
            .unwrap_or_else(|err| {
                self.report(&err, citation, document.record_id);
                Vec::new()
            })
    }

    /// Like `resolve_all_prepared`, but an empty result is an error: the
    /// degenerate guard if that is all that was found, `NoMatch` otherwise.
    pub fn try_resolve_all_prepared(
        &self,
        citation: &Citation,
        document: &PreparedDocument<'_>,
    ) -> Result<Vec<ResolvedSpan>, ResolveError> {
        let pattern = prepare_pattern(citation).ok_or(ResolveError::EmptyInput)?;

        let mut out = Vec::new();
        let mut cursor = 0usize;
        let mut degenerate = None;
        while let Some(located) = self.locate(&pattern, document, cursor) {
            cursor = located.end;
            match self.finish(citation, document, located, out.len()) {
                Ok(span) => out.push(span),
                Err(err) => degenerate = Some(err),
            }
        }

        if out.is_empty() {
            return Err(degenerate.unwrap_or_else(|| ResolveError::NoMatch {
                record_id: document.record_id.to_string(),
            }));
        }
        Ok(out)
    }

    /// Resolves every citation of every request independently. Requests for
    /// unknown records are skipped and reported.
    pub fn resolve_batch(
        &self,
        requests: &[RecordCitations],
        documents: &[Document],
    ) -> Outcome<Vec<ResolvedSpan>, ResolveStats> {
        self.batch(requests, documents, |citation, prepared| {
            self.try_resolve_prepared(citation, prepared)
                .map(|span| vec![span])
        })
    }

    /// `resolve_batch` with every occurrence of each citation. Match counts
    /// in the stats are per span, not per citation.
    pub fn resolve_batch_all(
        &self,
        requests: &[RecordCitations],
        documents: &[Document],
    ) -> Outcome<Vec<ResolvedSpan>, ResolveStats> {
        self.batch(requests, documents, |citation, prepared| {
            self.try_resolve_all_prepared(citation, prepared)
        })
    }

    fn batch<F>(
        &self,
        requests: &[RecordCitations],
        documents: &[Document],
        mut resolve_one: F,
    ) -> Outcome<Vec<ResolvedSpan>, ResolveStats>
    where
        F: FnMut(&Citation, &PreparedDocument<'_>) -> Result<Vec<ResolvedSpan>, ResolveError>,
    {
        let by_id: HashMap<&str, &Document> = documents
            .iter()
            .map(|doc| (doc.record_id.as_str(), doc))
            .collect();

        let mut stats = ResolveStats::default();
        let mut spans = Vec::new();
        for request in requests {
            let Some(document) = by_id.get(request.record_id.as_str()) else {
                stats.records_missing += 1;
                self.observer.on_event(MatchEvent::RecordMissing {
                    record_id: request.record_id.clone(),
                });
                continue;
            };

            let prepared = self.prepare(document);
            for citation in &request.citations {
                stats.citations += 1;
                match resolve_one(citation, &prepared) {
                    Ok(found) => {
                        for span in found {
                            if span.kind.is_exact() {
                                stats.exact_matches += 1;
                            } else {
                                stats.approximate_matches += 1;
                            }
                            spans.push(span);
                        }
                    }
                    Err(err) => {
                        match err {
                            ResolveError::EmptyInput => stats.empty += 1,
                            ResolveError::NoMatch { .. } => stats.not_found += 1,
                            ResolveError::DegenerateMatch { .. } => stats.degenerate += 1,
                        }
                        self.report(&err, citation, prepared.record_id);
                    }
                }
            }
        }

        Outcome {
            result: spans,
            stats,
        }
    }

    fn locate(
        &self,
        pattern: &[char],
        document: &PreparedDocument<'_>,
        from: usize,
    ) -> Option<Located> {
        if let Some(start) = find_from(pattern, &document.folded, from) {
            return Some(Located {
                start,
                end: start + pattern.len(),
                kind: MatchKind::Exact,
            });
        }
        fuzzy_find_from(
            pattern,
            &document.folded,
            from,
            self.options.similarity_threshold,
            self.options.min_fuzzy_len,
        )
        .map(|m| Located {
            start: m.start,
            end: m.end,
            kind: MatchKind::Approximate {
                similarity: m.similarity,
            },
        })
    }

    fn finish(
        &self,
        citation: &Citation,
        document: &PreparedDocument<'_>,
        located: Located,
        match_index: usize,
    ) -> Result<ResolvedSpan, ResolveError> {
        let (start_char, end_char) =
            document
                .normalized
                .to_original(located.start, located.end, &self.observer);
        if start_char == 0 && end_char == 0 {
            return Err(ResolveError::DegenerateMatch {
                record_id: document.record_id.to_string(),
            });
        }
        debug_assert!(start_char < end_char && end_char <= document.text.len());

        let confidence = match located.kind {
            MatchKind::Exact => citation.confidence,
            MatchKind::Approximate { similarity } => {
                self.observer.on_event(MatchEvent::ApproximateMatch {
                    record_id: document.record_id.to_string(),
                    question_id: citation.question_id,
                    similarity,
                });
                Confidence::LOWEST
            }
        };

        Ok(ResolvedSpan {
            record_id: document.record_id.to_string(),
            question_id: citation.question_id,
            start_char,
            end_char,
            confidence,
            match_index,
            kind: located.kind,
        })
    }

    fn report(&self, err: &ResolveError, citation: &Citation, record_id: &str) {
        let event = match err {
            ResolveError::EmptyInput => MatchEvent::EmptyCitation {
                record_id: record_id.to_string(),
                question_id: citation.question_id,
            },
            ResolveError::NoMatch { .. } => MatchEvent::NoMatch {
                record_id: record_id.to_string(),
                question_id: citation.question_id,
                quoted_text: citation.quoted_text.clone(),
            },
            ResolveError::DegenerateMatch { .. } => MatchEvent::DegenerateMatch {
                record_id: record_id.to_string(),
                question_id: citation.question_id,
                quoted_text: citation.quoted_text.clone(),
            },
        };
        self.observer.on_event(event);
    }
}

fn prepare_pattern(citation: &Citation) -> Option<Vec<char>> {
    let normalized = normalize(&citation.quoted_text);
    if normalized.is_empty() {
        return None;
    }
    Some(fold_chars(&normalized.chars))
}

/// Resolves one citation with default options, logging failures via
/// `tracing`.
pub fn resolve_span(citation: &Citation, document: &Document) -> Option<ResolvedSpan> {
    SpanResolver::default().resolve(citation, document)
}
