use std::sync::{Arc, Mutex};

/// Structured record of something the matchers want a host to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    EmptyCitation {
        record_id: String,
        question_id: u32,
    },
    NoMatch {
        record_id: String,
        question_id: u32,
        quoted_text: String,
    },
    DegenerateMatch {
        record_id: String,
        question_id: u32,
        quoted_text: String,
    },
    /// A normalized offset ran past the index map and was clamped.
    OffsetClamped {
        requested: usize,
        clamped: usize,
    },
    ApproximateMatch {
        record_id: String,
        question_id: u32,
        similarity: f64,
    },
    RecordMissing {
        record_id: String,
    },
    DuplicateBlock {
        record_id: String,
        duplicate_of: String,
        was_at: usize,
        size: usize,
    },
    ExactDuplicateDropped {
        record_id: String,
        duplicate_of: String,
    },
}

pub trait MatchObserver: Send + Sync {
    fn on_event(&self, event: MatchEvent);
}

impl<O: MatchObserver + ?Sized> MatchObserver for &O {
    fn on_event(&self, event: MatchEvent) {
        (**self).on_event(event);
    }
}

impl<O: MatchObserver + ?Sized> MatchObserver for Arc<O> {
    fn on_event(&self, event: MatchEvent) {
        (**self).on_event(event);
    }
}

/// Forwards events to `tracing`; failures at `warn`, the rest at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn on_event(&self, event: MatchEvent) {
        match event {
            MatchEvent::EmptyCitation {
                record_id,
                question_id,
            } => {
                tracing::warn!(%record_id, question_id, "empty citation");
            }
            MatchEvent::NoMatch {
                record_id,
                question_id,
                quoted_text,
            } => {
                tracing::warn!(%record_id, question_id, quoted_text = %preview(&quoted_text), "no match for citation");
            }
            MatchEvent::DegenerateMatch {
                record_id,
                question_id,
                quoted_text,
            } => {
                tracing::warn!(%record_id, question_id, quoted_text = %preview(&quoted_text), "degenerate span (start=0, end=0)");
            }
            MatchEvent::OffsetClamped { requested, clamped } => {
                tracing::warn!(requested, clamped, "normalized offset out of bounds");
            }
            MatchEvent::ApproximateMatch {
                record_id,
                question_id,
                similarity,
            } => {
                tracing::debug!(%record_id, question_id, similarity, "approximate match");
            }
            MatchEvent::RecordMissing { record_id } => {
                tracing::warn!(%record_id, "record not found");
            }
            MatchEvent::DuplicateBlock {
                record_id,
                duplicate_of,
                was_at,
                size,
            } => {
                tracing::debug!(%record_id, %duplicate_of, was_at, size, "removed duplicate block");
            }
            MatchEvent::ExactDuplicateDropped {
                record_id,
                duplicate_of,
            } => {
                tracing::debug!(%record_id, %duplicate_of, "dropped exact duplicate record");
            }
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<MatchEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MatchEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<MatchEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl MatchObserver for CollectingObserver {
    fn on_event(&self, event: MatchEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 100;
    if text.chars().count() <= MAX {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX).collect();
    out.push_str("...");
    out
}
