mod args;
mod json;
mod text;

use std::env;
use std::fs;
use std::io::{self, Read};

use citespan_core::{
    DedupStats, Deduplicator, Document, MatchObserver, RecordCitations, ResolveStats,
    ResolvedSpan, SpanResolver, TracingObserver,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Command, ParsedArgs, parse_args, print_help};
use crate::json::{
    JsonDedupStats, JsonReport, JsonResolveStats, map_citations, map_documents, map_links,
    map_output_documents, map_spans, read_input, write_json,
};
use crate::text::{format_dedup_stats, format_resolve_stats, format_text_report};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_source(parsed: &ParsedArgs) -> io::Result<String> {
    match &parsed.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display()))),
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn main() {
    let argv: Vec<String> = env::args().skip(1).collect();
    let parsed = match parse_args(&argv) {
        Ok(Command::Run(parsed)) => parsed,
        Ok(Command::Help) => {
            print_help();
            return;
        }
        Ok(Command::Version) => {
            println!("citespan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Err(message) => {
            eprintln!("Error: {message}\n");
            print_help();
            std::process::exit(2);
        }
    };

    init_tracing(parsed.verbose);

    match run(&parsed) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(parsed: &ParsedArgs) -> io::Result<i32> {
    let input = read_input(&read_source(parsed)?)?;
    let requests = map_citations(&input.citations)?;
    let observer = TracingObserver;

    let mut documents = map_documents(&input);
    tracing::debug!(
        documents = documents.len(),
        records_cited = requests.len(),
        dedupe = parsed.dedupe,
        "input loaded"
    );
    let mut links = None;
    let mut dedup_stats: Option<DedupStats> = None;
    if parsed.dedupe {
        let outcome = Deduplicator::with_observer(parsed.dedup.clone(), &observer)
            .run(documents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        documents = outcome.result.documents;
        links = Some(outcome.result.links);
        dedup_stats = Some(outcome.stats);
    }

    parsed
        .resolve
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let (spans, resolve_stats) = resolve(parsed, &documents, &requests, &observer);

    let report = JsonReport {
        subject_id: input.subject_id.clone(),
        spans: map_spans(&spans, &documents),
        documents: parsed.dedupe.then(|| map_output_documents(&documents)),
        duplicate_links: links.as_deref().map(map_links),
    };

    if parsed.json {
        if parsed.stats {
            write_json(&serde_json::json!({
                "report": report,
                "resolveStats": JsonResolveStats::from(resolve_stats.clone()),
                "dedupStats": dedup_stats.clone().map(JsonDedupStats::from),
            }))?;
        } else {
            write_json(&report)?;
        }
    } else {
        print!("{}", format_text_report(&report));
    }

    if parsed.stats && !parsed.json {
        eprint!("{}", format_resolve_stats(&resolve_stats));
        if let Some(stats) = &dedup_stats {
            eprint!("{}", format_dedup_stats(stats));
        }
    }

    if parsed.strict && (resolve_stats.unresolved() > 0 || resolve_stats.records_missing > 0) {
        if !parsed.stats {
            eprint!("{}", format_resolve_stats(&resolve_stats));
        }
        return Ok(1);
    }

    Ok(0)
}

fn resolve<O: MatchObserver>(
    parsed: &ParsedArgs,
    documents: &[Document],
    requests: &[RecordCitations],
    observer: O,
) -> (Vec<ResolvedSpan>, ResolveStats) {
    let resolver = SpanResolver::with_observer(parsed.resolve.clone(), observer);
    let outcome = if parsed.all_occurrences {
        resolver.resolve_batch_all(requests, documents)
    } else {
        resolver.resolve_batch(requests, documents)
    };
    (outcome.result, outcome.stats)
}
