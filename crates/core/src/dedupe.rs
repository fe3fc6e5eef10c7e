use std::collections::HashMap;

use crate::observe::{MatchEvent, MatchObserver};
use crate::types::Document;
use crate::util::fnv1a64;

#[derive(Debug)]
struct SeenText {
    record_id: String,
    sample: String,
}

/// Remembers record texts by content so byte-identical copies can be
/// recognized.
#[derive(Debug, Default)]
pub(crate) struct ExactDuplicateFilter {
    seen: HashMap<(u64, usize), Vec<SeenText>>,
}

impl ExactDuplicateFilter {
    /// Returns the id of the earlier record with the same text, or
    /// remembers this one and returns `None`.
    pub(crate) fn check(&mut self, document: &Document) -> Option<String> {
        let content_hash = fnv1a64(document.text.as_bytes());
        let key = (content_hash, document.text.len());
        let bucket = self.seen.entry(key).or_default();

        if let Some(existing) = bucket.iter().find(|s| s.sample == document.text) {
            return Some(existing.record_id.clone());
        }

        bucket.push(SeenText {
            record_id: document.record_id.clone(),
            sample: document.text.clone(),
        });
        None
    }
}

/// Drops records whose text repeats an earlier record byte for byte (first
/// in input order wins) and returns the rest in chronological order.
///
/// Sorting is stable: records sharing a date keep their input order.
pub(crate) fn prepare_subject_documents(
    documents: Vec<Document>,
    drop_exact_duplicates: bool,
    observer: &dyn MatchObserver,
) -> (Vec<Document>, u64) {
    let mut dropped = 0u64;
    let mut kept = Vec::with_capacity(documents.len());

    if drop_exact_duplicates {
        let mut filter = ExactDuplicateFilter::default();
        for document in documents {
            if let Some(duplicate_of) = filter.check(&document) {
                dropped += 1;
                observer.on_event(MatchEvent::ExactDuplicateDropped {
                    record_id: document.record_id,
                    duplicate_of,
                });
                continue;
            }
            kept.push(document);
        }
    } else {
        kept = documents;
    }

    kept.sort_by(|a, b| a.date.cmp(&b.date));
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::CollectingObserver;

    fn doc(record_id: &str, date: &str, text: &str) -> Document {
        Document {
            record_id: record_id.to_string(),
            subject_id: "HACK02".to_string(),
            date: date.to_string(),
            kind: "ambulantní zpráva".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn drops_byte_identical_records_and_sorts_by_date() {
        let observer = CollectingObserver::new();
        let documents = vec![
            doc("c", "2023-01-10", "Kontrola."),
            doc("a", "2022-10-05", "Vstupní vyšetření."),
            doc("b", "2022-11-01", "Kontrola."),
        ];

        let (kept, dropped) = prepare_subject_documents(documents, true, &observer);
        let ids: Vec<&str> = kept.iter().map(|d| d.record_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(dropped, 1);
        assert_eq!(
            observer.events(),
            vec![MatchEvent::ExactDuplicateDropped {
                record_id: "b".to_string(),
                duplicate_of: "c".to_string(),
            }]
        );
    }

    #[test]
    fn whitespace_differences_are_not_exact_duplicates() {
        let observer = CollectingObserver::new();
        let documents = vec![
            doc("a", "2022-10-05", "ER 90%"),
            doc("b", "2022-10-05", "ER  90%"),
        ];
        let (kept, dropped) = prepare_subject_documents(documents, true, &observer);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let observer = CollectingObserver::new();
        let documents = vec![
            doc("x", "2022-10-05", "první"),
            doc("y", "2022-10-05", "druhá"),
            doc("w", "2021-01-01", "starší"),
        ];
        let (kept, _) = prepare_subject_documents(documents, false, &observer);
        let ids: Vec<&str> = kept.iter().map(|d| d.record_id.as_str()).collect();
        assert_eq!(ids, vec!["w", "x", "y"]);
    }

    #[test]
    fn keeps_duplicates_when_disabled() {
        let observer = CollectingObserver::new();
        let documents = vec![
            doc("a", "2022-10-05", "same"),
            doc("b", "2022-10-06", "same"),
        ];
        let (kept, dropped) = prepare_subject_documents(documents, false, &observer);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
        assert!(observer.events().is_empty());
    }
}
