//! Suffix array construction and the derived rank / LCP tables.
//!
//! Built once per input (or per transformed concatenation) and then
//! shared immutably by every downstream helper. Construction is prefix
//! doubling with two-pass counting sorts, O(n log n); the LCP table
//! comes from Kasai's algorithm in O(n).

/// A suffix array over a byte text, or over a small-integer text where
/// `-1` acts as an unmatchable separator between two glued halves.
pub struct SuffixArray {
    text: Vec<u32>,
    sa: Vec<u32>,
}

impl SuffixArray {
    pub fn new(input: &[u8]) -> Self {
        Self::build(input.iter().map(|&b| u32::from(b)).collect())
    }

    /// Values must lie in `-1..=0xff`; the `-1` separator guarantees
    /// that suffixes of the two halves never share a prefix across the
    /// join.
    pub fn from_i16(input: &[i16]) -> Self {
        Self::build(input.iter().map(|&v| (v + 1) as u32).collect())
    }

    fn build(text: Vec<u32>) -> Self {
        let sa = construct(&text);
        SuffixArray { text, sa }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Starting position of the suffix with lexicographic rank `rank`.
    pub fn position(&self, rank: usize) -> usize {
        self.sa[rank] as usize
    }

    /// Returns `(lcp, rank)`. `rank` is the inverse of the suffix
    /// array; `lcp[j]` is the common-prefix length of the suffixes
    /// ranked `j` and `j + 1` (the final entry is 0). That keying lets
    /// a rank interval `[a, b]` share a prefix of length `L` exactly
    /// when the fold of `lcp[a..b]` is at least `L`.
    pub fn lcp_rank(&self) -> (Vec<u32>, Vec<u32>) {
        let n = self.len();
        let mut rank = vec![0u32; n];
        for (r, &p) in self.sa.iter().enumerate() {
            rank[p as usize] = r as u32;
        }
        let mut lcp = vec![0u32; n];
        let mut h = 0usize;
        for i in 0..n {
            let r = rank[i] as usize;
            if r + 1 < n {
                let j = self.sa[r + 1] as usize;
                while i + h < n && j + h < n && self.text[i + h] == self.text[j + h] {
                    h += 1;
                }
                lcp[r] = h as u32;
                if h > 0 {
                    h -= 1;
                }
            } else {
                lcp[r] = 0;
                h = 0;
            }
        }
        (lcp, rank)
    }
}

fn construct(text: &[u32]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let max_v = *text.iter().max().unwrap() as usize;

    // initial order and ranks from a counting sort on the raw symbols
    let mut sa = vec![0u32; n];
    let mut rank = vec![0u32; n];
    {
        let mut count = vec![0usize; max_v + 2];
        for &v in text {
            count[v as usize + 1] += 1;
        }
        for i in 1..count.len() {
            count[i] += count[i - 1];
        }
        for (i, &v) in text.iter().enumerate() {
            sa[count[v as usize]] = i as u32;
            count[v as usize] += 1;
        }
        for r in 1..n {
            let (a, b) = (sa[r - 1] as usize, sa[r] as usize);
            rank[b] = rank[a] + u32::from(text[b] != text[a]);
        }
    }

    let mut order = vec![0u32; n];
    let mut new_rank = vec![0u32; n];
    let mut k = 1;
    while k < n && (rank[sa[n - 1] as usize] as usize) < n - 1 {
        let second = |i: usize| -> usize {
            if i + k < n {
                rank[i + k] as usize + 1
            } else {
                0
            }
        };
        // two-pass LSD radix: by the rank k positions ahead, then
        // stably by the current rank
        let mut count = vec![0usize; n + 2];
        for i in 0..n {
            count[second(i) + 1] += 1;
        }
        for i in 1..count.len() {
            count[i] += count[i - 1];
        }
        for i in 0..n {
            order[count[second(i)]] = i as u32;
            count[second(i)] += 1;
        }
        let mut count = vec![0usize; n + 1];
        for i in 0..n {
            count[rank[i] as usize + 1] += 1;
        }
        for i in 1..count.len() {
            count[i] += count[i - 1];
        }
        for &i in order.iter() {
            let r = rank[i as usize] as usize;
            sa[count[r]] = i;
            count[r] += 1;
        }

        new_rank[sa[0] as usize] = 0;
        for r in 1..n {
            let (a, b) = (sa[r - 1] as usize, sa[r] as usize);
            let key_a = (rank[a], second(a));
            let key_b = (rank[b], second(b));
            new_rank[b] = new_rank[a] + u32::from(key_a != key_b);
        }
        std::mem::swap(&mut rank, &mut new_rank);
        k <<= 1;
    }
    sa
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive_sa(text: &[u32]) -> Vec<u32> {
        let mut sa: Vec<u32> = (0..text.len() as u32).collect();
        sa.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        sa
    }

    fn naive_lcp(a: &[u32], b: &[u32]) -> u32 {
        a.iter().zip(b).take_while(|(x, y)| x == y).count() as u32
    }

    #[test]
    fn agrees_with_naive_sort() {
        let mut rng = StdRng::seed_from_u64(7);
        for &(n, sigma) in &[(0usize, 2u32), (1, 2), (2, 2), (17, 2), (64, 4), (257, 3), (300, 256)] {
            let bytes: Vec<u8> = (0..n).map(|_| rng.gen_range(0..sigma) as u8).collect();
            let sa = SuffixArray::new(&bytes);
            let text: Vec<u32> = bytes.iter().map(|&b| u32::from(b)).collect();
            assert_eq!(sa.sa, naive_sa(&text), "n={} sigma={}", n, sigma);
        }
    }

    #[test]
    fn rank_inverts_and_lcp_links_neighbours() {
        let mut rng = StdRng::seed_from_u64(8);
        let bytes: Vec<u8> = (0..200).map(|_| rng.gen_range(0..3u8)).collect();
        let sa = SuffixArray::new(&bytes);
        let (lcp, rank) = sa.lcp_rank();
        for r in 0..sa.len() {
            assert_eq!(rank[sa.position(r)] as usize, r);
        }
        let text: Vec<u32> = bytes.iter().map(|&b| u32::from(b)).collect();
        for r in 0..sa.len() {
            let want = if r + 1 < sa.len() {
                naive_lcp(&text[sa.position(r)..], &text[sa.position(r + 1)..])
            } else {
                0
            };
            assert_eq!(lcp[r], want, "lcp at rank {}", r);
        }
    }

    #[test]
    fn separator_splits_glued_halves() {
        // "ab" ++ -1 ++ "ab": equal halves, but no suffix crosses the join
        let text: Vec<i16> = vec![97, 98, -1, 97, 98];
        let sa = SuffixArray::from_i16(&text);
        let (lcp, rank) = sa.lcp_rank();
        // suffixes "ab…" of both halves are rank neighbours
        let (ra, rb) = (rank[0] as usize, rank[3] as usize);
        assert_eq!(ra.max(rb) - ra.min(rb), 1);
        assert_eq!(lcp[ra.min(rb)], 2);
    }
}
