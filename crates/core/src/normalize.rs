use crate::observe::{MatchEvent, MatchObserver};

/// Whitespace-collapsed view of a text plus the way back to it.
///
/// `index_map[i]` is the byte offset in the original text of normalized
/// character `i`; the extra trailing entry is the byte offset just past the
/// last non-whitespace character, so `index_map.len() == chars.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub chars: Vec<char>,
    pub index_map: Vec<usize>,
}

impl NormalizedText {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn folded(&self) -> Vec<char> {
        self.chars.iter().map(|&ch| fold_char(ch)).collect()
    }

    /// Maps a normalized `[start, end)` pair to original byte offsets.
    ///
    /// Offsets past the end of the map are clamped to its last entry and
    /// reported as `OffsetClamped`.
    pub fn to_original(
        &self,
        start: usize,
        end: usize,
        observer: &dyn MatchObserver,
    ) -> (usize, usize) {
        (
            self.lookup(start, observer),
            self.lookup(end, observer),
        )
    }

    fn lookup(&self, pos: usize, observer: &dyn MatchObserver) -> usize {
        let last = self.index_map.len().saturating_sub(1);
        if pos > last {
            observer.on_event(MatchEvent::OffsetClamped {
                requested: pos,
                clamped: last,
            });
            return self.index_map.get(last).copied().unwrap_or(0);
        }
        self.index_map[pos]
    }
}

/// Collapses every whitespace run to one ASCII space and trims both ends.
///
/// The first character of an interior run owns the emitted space; the rest
/// of the run has no entry in the index map.
pub fn normalize(text: &str) -> NormalizedText {
    let mut chars = Vec::with_capacity(text.len());
    let mut index_map = Vec::with_capacity(text.len() + 1);
    let mut pending_space: Option<usize> = None;
    let mut end = 0usize;

    for (offset, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if !chars.is_empty() && pending_space.is_none() {
                pending_space = Some(offset);
            }
            continue;
        }
        if let Some(space_at) = pending_space.take() {
            chars.push(' ');
            index_map.push(space_at);
        }
        chars.push(ch);
        index_map.push(offset);
        end = offset + ch.len_utf8();
    }

    index_map.push(end);
    NormalizedText { chars, index_map }
}

/// Simple lowercase that never changes length: characters whose lowercase
/// form is more than one codepoint (e.g. `İ`) are kept as they are.
pub fn fold_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

pub fn fold_chars(chars: &[char]) -> Vec<char> {
    chars.iter().map(|&ch| fold_char(ch)).collect()
}

pub(crate) fn char_byte_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    offsets.push(text.len());
    offsets
}
