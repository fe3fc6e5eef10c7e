use citespan_core::{
    Citation, Confidence, Document, MatchKind, SpanResolver, deduplicate_subject, normalize,
};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 64;

fn word() -> impl Strategy<Value = String> {
    "[a-zA-ZáčéěíňřšťůýžÁČŘŽ0-9%.,:]{1,8}"
}

fn whitespace() -> impl Strategy<Value = String> {
    "[ \t\n]{1,3}"
}

/// Words joined by arbitrary whitespace runs, optionally padded.
fn spaced_words(max_words: usize) -> impl Strategy<Value = (Vec<String>, String)> {
    (
        prop::collection::vec((word(), whitespace()), 1..max_words),
        "[ \n]{0,2}",
    )
        .prop_map(|(parts, pad)| {
            let mut text = pad;
            let mut words = Vec::with_capacity(parts.len());
            for (w, ws) in parts {
                text.push_str(&w);
                text.push_str(&ws);
                words.push(w);
            }
            (words, text)
        })
}

fn cite(quoted_text: String) -> Citation {
    Citation {
        question_id: 1,
        quoted_text,
        confidence: Confidence::Medium,
    }
}

fn doc(record_id: String, date: String, text: String) -> Document {
    Document {
        record_id,
        subject_id: "S1".to_string(),
        date,
        kind: "zpráva".to_string(),
        text,
    }
}

fn folded(text: &str) -> Vec<char> {
    normalize(text).folded()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn index_map_is_monotonic_and_points_at_source_chars(text in "[a-zé \t\n]{0,40}") {
        let normalized = normalize(&text);
        prop_assert_eq!(normalized.index_map.len(), normalized.chars.len() + 1);
        for pair in normalized.index_map.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        prop_assert!(normalized.chars.first() != Some(&' '));
        prop_assert!(normalized.chars.last() != Some(&' '));
        for (i, &ch) in normalized.chars.iter().enumerate() {
            let source = text[normalized.index_map[i]..].chars().next();
            if ch == ' ' {
                prop_assert!(source.is_some_and(char::is_whitespace));
                prop_assert!(normalized.chars[i + 1] != ' ');
            } else {
                prop_assert_eq!(source, Some(ch));
            }
        }
        if let Some(first) = text.find(|c: char| !c.is_whitespace()) {
            prop_assert_eq!(normalized.index_map[0], first);
        }
        prop_assert!(*normalized.index_map.last().unwrap() <= text.len());
    }

    #[test]
    fn quoted_run_of_words_resolves_exactly(
        (words, text) in spaced_words(12),
        range in (0usize..12, 1usize..6),
    ) {
        let start = range.0 % words.len();
        let end = (start + range.1).min(words.len());
        let quoted = words[start..end].join(" ");

        let document = doc("r".to_string(), "2022-01-01".to_string(), text);
        let span = SpanResolver::default()
            .resolve(&cite(quoted.clone()), &document)
            .unwrap();

        prop_assert_eq!(span.kind, MatchKind::Exact);
        prop_assert_eq!(span.confidence, Confidence::Medium);
        let slice = span.slice(&document.text).unwrap();
        prop_assert_eq!(folded(slice), folded(&quoted));
    }

    #[test]
    fn citation_whitespace_does_not_matter(
        (words, text) in spaced_words(8),
        seps in prop::collection::vec(whitespace(), 8),
    ) {
        let mut noisy = String::from("\n ");
        for (w, sep) in words.iter().zip(seps.iter().cycle()) {
            noisy.push_str(&w.to_uppercase());
            noisy.push_str(sep);
        }

        let document = doc("r".to_string(), "2022-01-01".to_string(), text);
        let resolver = SpanResolver::default();
        let plain = resolver.resolve(&cite(words.join(" ")), &document);
        let spaced = resolver.resolve(&cite(noisy), &document);
        prop_assert!(plain.is_some());
        prop_assert_eq!(plain, spaced);
    }

    #[test]
    fn arbitrary_input_yields_valid_spans(
        quoted in "\\PC{0,16}",
        text in "\\PC{0,64}",
    ) {
        let document = doc("r".to_string(), "2022-01-01".to_string(), text);
        let resolver = SpanResolver::default();
        for (i, span) in resolver.resolve_all(&cite(quoted.clone()), &document).iter().enumerate() {
            prop_assert_eq!(span.match_index, i);
            prop_assert!(span.start_char < span.end_char);
            prop_assert!(span.slice(&document.text).is_some());
        }
        if let Some(span) = resolver.resolve(&cite(quoted), &document) {
            prop_assert!(span.slice(&document.text).is_some());
        }
    }

    #[test]
    fn second_dedupe_pass_finds_nothing(
        texts in prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec![
                "Pacientka s karcinomem prsu.",
                " Stav stabilní.",
                " Kontrola za 3 měsíce.",
                " ER 90%, PR 80%, HER2 negativní.",
                " Bez známek progrese.",
                " Anamnéza: hypertenze.",
            ]), 1..5),
            1..5,
        ),
        min_block_len in 5usize..30,
    ) {
        let documents: Vec<Document> = texts
            .into_iter()
            .enumerate()
            .map(|(i, parts)| {
                doc(format!("r{i}"), format!("2022-01-{:02}", i + 1), parts.concat())
            })
            .collect();

        let first = deduplicate_subject(documents, min_block_len);
        for link in &first.links {
            let source = first
                .documents
                .iter()
                .find(|d| d.record_id == link.duplicate_of)
                .unwrap();
            let target = first
                .documents
                .iter()
                .find(|d| d.record_id == link.record_id)
                .unwrap();
            prop_assert!(source.date < target.date);
            prop_assert!(source.text.get(link.offset_start..link.offset_end).is_some());
            prop_assert_eq!(link.offset_end - link.offset_start, link.size);
            prop_assert!(link.was_at <= target.text.len());
        }

        let second = deduplicate_subject(first.documents.clone(), min_block_len);
        prop_assert!(second.links.is_empty());
        prop_assert_eq!(second.documents, first.documents);
    }
}
