use std::path::PathBuf;

use citespan_core::{DedupOptions, ResolveOptions};

const HELP_TEXT: &str = concat!(
    "citespan (pin quoted citations to byte spans of clinical records)\n",
    "\n",
    "Usage:\n",
    "  citespan [options] <input.json | ->\n",
    "\n",
    "Options:\n",
    "  --dedupe                    Remove text repeated from earlier records before resolving\n",
    "  --min-block-len <n>         Dedupe: minimum repeated block in bytes (default: 20)\n",
    "  --drop-exact-duplicates     Dedupe: drop records whose text is byte-identical to an earlier one\n",
    "  --similarity-threshold <f>  Approximate matching: 0..1 (default: 0.9)\n",
    "  --min-fuzzy-len <n>         Approximate matching: minimum citation length in characters (default: 10)\n",
    "  --all-occurrences           Report every occurrence of a citation, not just the first\n",
    "  --json                      Output JSON\n",
    "  --stats                     Include resolve/dedupe stats (JSON) or print to stderr\n",
    "  --strict                    Exit non-zero when any citation could not be resolved\n",
    "  --verbose                   Log every match event to stderr (RUST_LOG overrides)\n",
    "  -V, --version               Show version\n",
    "  -h, --help                  Show help\n",
    "\n",
    "Input:\n",
    "  { \"subjectId\": \"...\",\n",
    "    \"documents\": [{ \"recordId\", \"date\", \"type\", \"text\" }],\n",
    "    \"citations\": [{ \"recordId\", \"questionId\", \"quotedText\", \"confidence\" }] }\n",
    "\n",
    "Notes:\n",
    "  - Offsets are UTF-8 byte offsets into the record text\n",
    "  - With --dedupe, citations are resolved against the edited records\n",
    "  - In text mode, --stats prints to stderr\n",
    "\n",
    "Examples:\n",
    "  citespan subject.json\n",
    "  citespan --dedupe --json --stats subject.json\n",
    "  cat subject.json | citespan --strict -\n",
    "\n"
);

pub(crate) fn print_help() {
    print!("{HELP_TEXT}");
}

#[derive(Debug, Clone)]
pub(crate) enum Command {
    Help,
    Version,
    Run(ParsedArgs),
}

#[derive(Debug, Clone)]
pub(crate) struct ParsedArgs {
    pub(crate) json: bool,
    pub(crate) stats: bool,
    pub(crate) strict: bool,
    pub(crate) verbose: bool,
    pub(crate) dedupe: bool,
    pub(crate) all_occurrences: bool,
    /// `None` reads standard input.
    pub(crate) input: Option<PathBuf>,
    pub(crate) resolve: ResolveOptions,
    pub(crate) dedup: DedupOptions,
}

fn parse_u32_in_range(name: &str, raw: &str, min: u32, max: u32) -> Result<u32, String> {
    let value = raw
        .parse::<u32>()
        .map_err(|_| format!("{name} must be an integer"))?;
    if !(min..=max).contains(&value) {
        return Err(format!("{name} must be {min}..{max}"));
    }
    Ok(value)
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("{name} must be a number"))
}

fn flag_value<'a>(argv: &'a [String], i: usize, name: &str) -> Result<&'a str, String> {
    argv.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{name} requires a value"))
}

pub(crate) fn parse_args(argv: &[String]) -> Result<Command, String> {
    let mut inputs: Vec<String> = Vec::new();
    let mut json = false;
    let mut stats = false;
    let mut strict = false;
    let mut verbose = false;
    let mut dedupe = false;
    let mut all_occurrences = false;
    let mut drop_exact = false;
    let mut min_block_len: Option<usize> = None;
    let mut similarity_threshold: Option<f64> = None;
    let mut min_fuzzy_len: Option<usize> = None;

    let mut i = 0;
    while i < argv.len() {
        let arg = &argv[i];
        if arg == "--" {
            inputs.extend(argv[(i + 1)..].iter().cloned());
            break;
        }
        if arg == "-h" || arg == "--help" {
            return Ok(Command::Help);
        }
        if arg == "-V" || arg == "--version" {
            return Ok(Command::Version);
        }
        if arg == "--json" {
            json = true;
            i += 1;
            continue;
        }
        if arg == "--stats" {
            stats = true;
            i += 1;
            continue;
        }
        if arg == "--strict" {
            strict = true;
            i += 1;
            continue;
        }
        if arg == "--verbose" {
            verbose = true;
            i += 1;
            continue;
        }
        if arg == "--dedupe" {
            dedupe = true;
            i += 1;
            continue;
        }
        if arg == "--all-occurrences" {
            all_occurrences = true;
            i += 1;
            continue;
        }
        if arg == "--drop-exact-duplicates" {
            drop_exact = true;
            i += 1;
            continue;
        }
        if arg == "--min-block-len" {
            let raw = flag_value(argv, i, "--min-block-len")?;
            let value = parse_u32_in_range("--min-block-len", raw, 1, u32::MAX)?;
            min_block_len = Some(value as usize);
            i += 2;
            continue;
        }
        if arg == "--min-fuzzy-len" {
            let raw = flag_value(argv, i, "--min-fuzzy-len")?;
            let value = parse_u32_in_range("--min-fuzzy-len", raw, 0, u32::MAX)?;
            min_fuzzy_len = Some(value as usize);
            i += 2;
            continue;
        }
        if arg == "--similarity-threshold" {
            let raw = flag_value(argv, i, "--similarity-threshold")?;
            let value = parse_f64("--similarity-threshold", raw)?;
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err("--similarity-threshold must be 0..1".to_string());
            }
            similarity_threshold = Some(value);
            i += 2;
            continue;
        }
        if arg.starts_with('-') && arg != "-" {
            return Err(format!("Unknown option: {arg}"));
        }
        inputs.push(arg.clone());
        i += 1;
    }

    let input = match inputs.as_slice() {
        [] => return Err("missing input file (use - for stdin)".to_string()),
        [one] if one == "-" => None,
        [one] => Some(PathBuf::from(one)),
        _ => return Err("expected exactly one input file".to_string()),
    };

    if !dedupe && (min_block_len.is_some() || drop_exact) {
        return Err("--min-block-len and --drop-exact-duplicates require --dedupe".to_string());
    }

    let mut resolve = ResolveOptions::default();
    if let Some(similarity_threshold) = similarity_threshold {
        resolve.similarity_threshold = similarity_threshold;
    }
    if let Some(min_fuzzy_len) = min_fuzzy_len {
        resolve.min_fuzzy_len = min_fuzzy_len;
    }

    let mut dedup = DedupOptions {
        drop_exact_duplicates: drop_exact,
        ..DedupOptions::default()
    };
    if let Some(min_block_len) = min_block_len {
        dedup.min_block_len = min_block_len;
    }

    Ok(Command::Run(ParsedArgs {
        json,
        stats,
        strict,
        verbose,
        dedupe,
        all_occurrences,
        input,
        resolve,
        dedup,
    }))
}
