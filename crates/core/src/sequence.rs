//! Ratcliff/Obershelp matching over slices.
//!
//! `matching_blocks` is the classic greedy decomposition: take the longest
//! common run (earliest in `a`, then earliest in `b` on ties), then recurse
//! into the pieces left and right of it. There is no junk heuristic, so the
//! result depends only on the two inputs.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

#[derive(Debug)]
pub struct SequenceMatcher<'s, T> {
    a: &'s [T],
    b: &'s [T],
    b2j: HashMap<T, Vec<usize>>,
}

impl<'s, T> SequenceMatcher<'s, T>
where
    T: Eq + Hash + Copy,
{
    pub fn new(a: &'s [T], b: &'s [T]) -> Self {
        let mut b2j: HashMap<T, Vec<usize>> = HashMap::new();
        for (j, &item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut best = Match {
            a: alo,
            b: blo,
            size: 0,
        };
        // j2len[j] = length of the common run ending at a[i - 1], b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = match j.checked_sub(1) {
                        Some(prev) => j2len.get(&prev).copied().unwrap_or(0) + 1,
                        None => 1,
                    };
                    next.insert(j, k);
                    if k > best.size {
                        best = Match {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }

        best
    }

    /// Non-overlapping common runs, sorted by position, adjacent runs merged.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            blocks.push(m);
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
        for block in blocks {
            if let Some(last) = merged.last_mut()
                && last.a + last.size == block.a
                && last.b + last.size == block.b
            {
                last.size += block.size;
                continue;
            }
            merged.push(block);
        }
        merged
    }

    /// `2 * M / T`, where `M` is the number of matched elements and `T` the
    /// combined length. Two empty inputs are identical.
    pub fn ratio(&self) -> f64 {
        let matches: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        ratio_of(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio` from element counts alone.
    pub fn quick_ratio(&self) -> f64 {
        let mut available: HashMap<T, isize> = HashMap::with_capacity(self.b2j.len());
        for (item, positions) in &self.b2j {
            available.insert(*item, positions.len() as isize);
        }
        let mut matches = 0usize;
        for item in self.a {
            if let Some(count) = available.get_mut(item)
                && *count > 0
            {
                *count -= 1;
                matches += 1;
            }
        }
        ratio_of(matches, self.a.len() + self.b.len())
    }
}

fn ratio_of(matches: usize, length: usize) -> f64 {
    if length == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / length as f64
}
