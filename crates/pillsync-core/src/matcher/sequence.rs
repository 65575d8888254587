//! Ratcliff/Obershelp sequence similarity.
//!
//! Finds the longest contiguous matching block, then recurses into the pieces to
//! its left and right. The ratio is `2 * M / T` where `M` is the number of matched
//! items and `T` the combined length of both sequences.

use std::collections::HashMap;

/// Second-sequence length from which very frequent items stop seeding matches.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Similarity ratio between two strings, compared by Unicode scalar value.
///
/// Returns a value in `[0.0, 1.0]`; two empty strings are identical (1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

/// Sequence matcher over two borrowed slices.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each item in `b`, ascending, minus popular items.
    b_index: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T> SequenceMatcher<'a, T>
where
    T: Eq + std::hash::Hash,
{
    /// Index `b` and prepare to compare it against `a`.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b_index: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b_index.entry(item).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_index.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b_index }
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let mut best_i = alo;
        let mut best_j = blo;
        let mut best_len = 0;

        // Length of the match ending at (i - 1, j) for the previous row.
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_run_lengths = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_lengths.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_run_lengths.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            run_lengths = next_run_lengths;
        }

        // Popular items never seed a block but may still extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }

        MatchingBlock {
            a_start: best_i,
            b_start: best_j,
            len: best_len,
        }
    }

    /// All non-overlapping matching blocks, ordered by position, adjacent blocks merged.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            if alo < block.a_start && blo < block.b_start {
                pending.push((alo, block.a_start, blo, block.b_start));
            }
            let a_end = block.a_start + block.len;
            let b_end = block.b_start + block.len;
            if a_end < ahi && b_end < bhi {
                pending.push((a_end, ahi, b_end, bhi));
            }
            blocks.push(block);
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.a_start + last.len == block.a_start
                        && last.b_start + last.len == block.b_start =>
                {
                    last.len += block.len;
                }
                _ => merged.push(block),
            }
        }
        merged
    }

    /// Similarity ratio in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|block| block.len).sum();
        2.0 * matched as f64 / total as f64
    }
}
