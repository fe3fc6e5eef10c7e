use crate::dedupe::prepare_subject_documents;
use crate::error::OptionsError;
use crate::observe::{MatchEvent, MatchObserver, TracingObserver};
use crate::redundancy::{Block, find_blocks};
use crate::types::{DedupOptions, DedupResult, DedupStats, Document, DuplicateLink, Outcome};
use crate::util::divider_index;

/// Post-edit texts of the records processed so far, back to back.
#[derive(Debug, Default)]
struct Reference {
    text: String,
    dividers: Vec<usize>,
    record_ids: Vec<String>,
}

impl Reference {
    fn push(&mut self, record_id: &str, text: &str) {
        self.dividers.push(self.text.len());
        self.record_ids.push(record_id.to_string());
        self.text.push_str(text);
    }

    /// Splits `[offset, offset + size)` into per-record pieces:
    /// `(record index, intra-record offset, piece size)`.
    fn locate(&self, offset: usize, size: usize) -> Vec<(usize, usize, usize)> {
        let mut pieces = Vec::new();
        let mut at = offset;
        let mut remaining = size;
        while remaining > 0 {
            let Some(idx) = divider_index(&self.dividers, at) else {
                break;
            };
            let record_end = self
                .dividers
                .get(idx + 1)
                .copied()
                .unwrap_or(self.text.len());
            let piece = remaining.min(record_end.saturating_sub(at));
            if piece == 0 {
                break;
            }
            pieces.push((idx, at - self.dividers[idx], piece));
            at += piece;
            remaining -= piece;
        }
        pieces
    }
}

/// Removes text that later records copy from earlier ones.
#[derive(Debug, Clone)]
pub struct Deduplicator<O = TracingObserver> {
    options: DedupOptions,
    observer: O,
}

impl Deduplicator<TracingObserver> {
    pub fn new(options: DedupOptions) -> Self {
        Self::with_observer(options, TracingObserver)
    }
}

impl<O: MatchObserver> Deduplicator<O> {
    pub fn with_observer(options: DedupOptions, observer: O) -> Self {
        Self { options, observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn prepare(&self, documents: Vec<Document>) -> Outcome<Vec<Document>, DedupStats> {
        let (documents, dropped) = prepare_subject_documents(
            documents,
            self.options.drop_exact_duplicates,
            &self.observer,
        );
        Outcome {
            stats: DedupStats {
                documents: documents.len() as u64 + dropped,
                exact_duplicates_dropped: dropped,
                ..DedupStats::default()
            },
            result: documents,
        }
    }

    /// One left-to-right pass over the subject's records in date order.
    ///
    /// Each record is compared against the already edited text of all
    /// earlier records. Blocks are cut in a single sweep using cumulative
    /// offsets; the record is swept again until nothing of `min_block_len`
    /// or more is left, so a second run over the output finds no blocks.
    pub fn run(
        &self,
        documents: Vec<Document>,
    ) -> Result<Outcome<DedupResult, DedupStats>, OptionsError> {
        self.options.validate()?;
        Ok(self.run_validated(documents))
    }

    fn run_validated(&self, documents: Vec<Document>) -> Outcome<DedupResult, DedupStats> {
        let Outcome {
            result: documents,
            mut stats,
        } = self.prepare(documents);

        let mut reference = Reference::default();
        let mut links = Vec::new();
        let mut edited_documents = Vec::with_capacity(documents.len());

        for mut document in documents {
            let first_link = links.len();
            let edited = self.elide_record(&document, &reference, &mut links);
            links[first_link..].sort_by_key(|link: &DuplicateLink| link.was_at);

            let record_links = &links[first_link..];
            if !record_links.is_empty() {
                stats.documents_edited += 1;
                stats.bytes_removed += (document.text.len() - edited.len()) as u64;
                for link in record_links {
                    self.observer.on_event(MatchEvent::DuplicateBlock {
                        record_id: link.record_id.clone(),
                        duplicate_of: link.duplicate_of.clone(),
                        was_at: link.was_at,
                        size: link.size,
                    });
                }
            }

            reference.push(&document.record_id, &edited);
            document.text = edited;
            edited_documents.push(document);
        }
        stats.blocks = links.len() as u64;

        Outcome {
            result: DedupResult {
                documents: edited_documents,
                links,
            },
            stats,
        }
    }

    fn elide_record(
        &self,
        document: &Document,
        reference: &Reference,
        links: &mut Vec<DuplicateLink>,
    ) -> String {
        let first_link = links.len();
        let mut edited = document.text.clone();

        loop {
            let blocks = find_blocks(&edited, &reference.text, self.options.min_block_len);
            if blocks.is_empty() {
                return edited;
            }

            let sweep_start = links.len();
            let mut removed = 0usize;
            let mut cursor = 0usize;
            for block in blocks {
                let Some(block) = trim_overlap(block, cursor) else {
                    continue;
                };
                cursor = block.offset_in_candidate + block.size;

                let was_at = block.offset_in_candidate - removed;
                edited.replace_range(was_at..was_at + block.size, "");
                removed += block.size;

                // Links from earlier sweeps point into text that just shrank.
                for link in &mut links[first_link..sweep_start] {
                    if link.was_at > was_at {
                        link.was_at = link.was_at.saturating_sub(block.size).max(was_at);
                    }
                }

                for (idx, offset_start, size) in
                    reference.locate(block.offset_in_reference, block.size)
                {
                    links.push(DuplicateLink {
                        record_id: document.record_id.clone(),
                        was_at,
                        size,
                        duplicate_of: reference.record_ids[idx].clone(),
                        offset_start,
                        offset_end: offset_start + size,
                    });
                }
            }
        }
    }
}

fn trim_overlap(block: Block, cursor: usize) -> Option<Block> {
    let end = block.offset_in_candidate + block.size;
    if end <= cursor {
        return None;
    }
    let skip = cursor.saturating_sub(block.offset_in_candidate);
    Some(Block {
        offset_in_candidate: block.offset_in_candidate + skip,
        size: block.size - skip,
        offset_in_reference: block.offset_in_reference + skip,
    })
}

/// Date-orders a subject's records. Exact duplicates are dropped only when
/// `drop_exact_duplicates` is set.
pub fn prepare_subject(
    documents: Vec<Document>,
    options: &DedupOptions,
) -> Outcome<Vec<Document>, DedupStats> {
    Deduplicator::new(options.clone()).prepare(documents)
}

pub fn deduplicate_subject(documents: Vec<Document>, min_block_len: usize) -> DedupResult {
    let options = DedupOptions {
        min_block_len: min_block_len.max(1),
        ..DedupOptions::default()
    };
    Deduplicator::new(options).run_validated(documents).result
}

pub fn deduplicate_subject_with_stats(
    documents: Vec<Document>,
    options: &DedupOptions,
) -> Result<Outcome<DedupResult, DedupStats>, OptionsError> {
    Deduplicator::new(options.clone()).run(documents)
}
