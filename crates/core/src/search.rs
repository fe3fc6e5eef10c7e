use crate::sequence::SequenceMatcher;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    pub start: usize,
    pub end: usize,
    pub similarity: f64,
}

/// Leftmost occurrence of `pattern` in `text`. Inputs are expected to be
/// normalized and case-folded already.
pub fn find_first(pattern: &[char], text: &[char]) -> Option<usize> {
    find_from(pattern, text, 0)
}

pub fn find_from(pattern: &[char], text: &[char], from: usize) -> Option<usize> {
    if pattern.is_empty() || from > text.len() || text.len() - from < pattern.len() {
        return None;
    }
    text[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|pos| from + pos)
}

/// First window of `text`, left to right, whose similarity to `pattern`
/// reaches `threshold`. Windows are exactly as long as the pattern.
///
/// Patterns shorter than `min_len` are never fuzzy-matched.
pub fn fuzzy_find_first(
    pattern: &[char],
    text: &[char],
    threshold: f64,
    min_len: usize,
) -> Option<FuzzyMatch> {
    fuzzy_find_from(pattern, text, 0, threshold, min_len)
}

pub fn fuzzy_find_from(
    pattern: &[char],
    text: &[char],
    from: usize,
    threshold: f64,
    min_len: usize,
) -> Option<FuzzyMatch> {
    let width = pattern.len();
    if width == 0 || width < min_len || from > text.len() || text.len() - from < width {
        return None;
    }

    for start in from..=(text.len() - width) {
        let window = &text[start..start + width];
        let matcher = SequenceMatcher::new(pattern, window);
        if matcher.quick_ratio() < threshold {
            continue;
        }
        let similarity = matcher.ratio();
        if similarity >= threshold {
            return Some(FuzzyMatch {
                start,
                end: start + width,
                similarity,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn find_first_returns_leftmost() {
        let text = chars("er 90% a er 90%");
        assert_eq!(find_first(&chars("er 90%"), &text), Some(0));
        assert_eq!(find_from(&chars("er 90%"), &text, 1), Some(9));
        assert_eq!(find_first(&chars("pr 10%"), &text), None);
        assert_eq!(find_first(&[], &text), None);
        assert_eq!(find_from(&chars("er"), &text, 99), None);
    }

    #[test]
    fn similarity_exactly_at_threshold_is_accepted() {
        // Two substitutions in a 20-char pattern: 18 matched, 2*18/40 = 0.9.
        let pattern = chars("abcdefghijklmnopqrst");
        let text = chars("zzzz abcdefghiXklmnoYqrst zzzz");
        let found = fuzzy_find_first(&pattern, &text, 0.9, 10).unwrap();
        assert_eq!(found.start, 5);
        assert_eq!(found.end, 25);
        assert_eq!(found.similarity, 0.9);
    }

    #[test]
    fn similarity_just_below_threshold_is_rejected() {
        // Three substitutions: 17 matched, 0.85.
        let pattern = chars("abcdefghijklmnopqrst");
        let text = chars("zzzz abcdefghiXklmnoYqrsW zzzz");
        assert_eq!(fuzzy_find_first(&pattern, &text, 0.9, 10), None);
        assert!(fuzzy_find_first(&pattern, &text, 0.85, 10).is_some());
    }

    #[test]
    fn first_window_wins_over_better_later_window() {
        let pattern = chars("abcdefghijklmnopqrst");
        let text = chars("abcdefghiXklmnopqrst .. abcdefghijklmnopqrst");
        let found = fuzzy_find_first(&pattern, &text, 0.9, 10).unwrap();
        assert_eq!(found.start, 0);
        assert!(found.similarity < 1.0);
    }

    #[test]
    fn short_patterns_are_not_fuzzy_matched() {
        let pattern = chars("abcdefghi");
        let text = chars("abcdefghX");
        assert_eq!(fuzzy_find_first(&pattern, &text, 0.5, 10), None);
        assert!(fuzzy_find_first(&pattern, &text, 0.5, 5).is_some());
    }

    #[test]
    fn pattern_exactly_min_len_is_fuzzy_matched() {
        let pattern = chars("abcdefghij");
        let text = chars("zz abcdefgXij zz");
        let found = fuzzy_find_first(&pattern, &text, 0.85, 10).unwrap();
        assert_eq!((found.start, found.end), (3, 13));
        assert_eq!(fuzzy_find_first(&pattern, &text, 0.85, 11), None);
    }

    #[test]
    fn pattern_longer_than_text_is_a_miss() {
        let pattern = chars("abcdefghijklmnop");
        assert_eq!(fuzzy_find_first(&pattern, &chars("abc"), 0.1, 1), None);
    }
}
