mod dedupe;
mod elide;
mod error;
mod normalize;
mod observe;
mod redundancy;
mod resolve;
mod search;
mod sequence;
mod types;
mod util;

pub use elide::{
    Deduplicator, deduplicate_subject, deduplicate_subject_with_stats, prepare_subject,
};

pub use error::{OptionsError, ResolveError};

pub use normalize::{NormalizedText, fold_char, fold_chars, normalize};

pub use observe::{CollectingObserver, MatchEvent, MatchObserver, TracingObserver};

pub use redundancy::{Block, find_blocks};

pub use resolve::{PreparedDocument, SpanResolver, resolve_span};

pub use search::{FuzzyMatch, find_first, find_from, fuzzy_find_first, fuzzy_find_from};

pub use sequence::{Match, SequenceMatcher};

pub use types::{
    Citation, Confidence, DEFAULT_MIN_BLOCK_LEN, DEFAULT_MIN_FUZZY_LEN,
    DEFAULT_SIMILARITY_THRESHOLD, DedupOptions, DedupResult, DedupStats, Document, DuplicateLink,
    MatchKind, Outcome, RecordCitations, ResolveOptions, ResolveStats, ResolvedSpan,
};
